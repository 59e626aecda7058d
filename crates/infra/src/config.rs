use crate::services::DeliveryChannel;
use std::path::PathBuf;
use tracing::{info, warn};

/// Key the whole reminder collection is stored under
pub const DEFAULT_STORE_KEY: &str = "medReminders";
/// A snooze never outlasts a day
pub const MAX_SNOOZE_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where the key value blobs are written to
    pub data_dir: PathBuf,
    /// Key under which the reminder collection is persisted
    pub store_key: String,
    /// Notification permission the delivery sink starts out with
    pub delivery_channel: DeliveryChannel,
    /// How long a postponed reminder waits before it is delivered again
    pub snooze_minutes: i64,
    /// Seconds between two refreshes of the countdowns in the reminders list
    pub refresh_interval_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        let data_dir = match std::env::var("MEDREMIND_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => {
                let dir = dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("MedRemind");
                info!(
                    "Did not find MEDREMIND_DATA_DIR environment variable. Using: {}",
                    dir.display()
                );
                dir
            }
        };

        let store_key =
            std::env::var("MEDREMIND_STORE_KEY").unwrap_or_else(|_| DEFAULT_STORE_KEY.into());

        let default_channel = DeliveryChannel::Granted;
        let delivery_channel = match std::env::var("MEDREMIND_NOTIFICATIONS") {
            Ok(channel) => match channel.parse::<DeliveryChannel>() {
                Ok(channel) => channel,
                Err(_) => {
                    warn!(
                        "The given MEDREMIND_NOTIFICATIONS: {} is not valid, falling back to: {:?}.",
                        channel, default_channel
                    );
                    default_channel
                }
            },
            Err(_) => default_channel,
        };

        let default_snooze = 10;
        let snooze_minutes = match std::env::var("MEDREMIND_SNOOZE_MINUTES") {
            Ok(minutes) => match minutes.parse::<i64>() {
                Ok(minutes) if minutes > MAX_SNOOZE_MINUTES => {
                    warn!(
                        "The given MEDREMIND_SNOOZE_MINUTES: {} is more than a day, using: {}.",
                        minutes, MAX_SNOOZE_MINUTES
                    );
                    MAX_SNOOZE_MINUTES
                }
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    warn!(
                        "The given MEDREMIND_SNOOZE_MINUTES: {} is not valid, falling back to: {}.",
                        minutes, default_snooze
                    );
                    default_snooze
                }
            },
            Err(_) => default_snooze,
        };

        Self {
            data_dir,
            store_key,
            delivery_channel,
            snooze_minutes,
            refresh_interval_secs: 60,
        }
    }

    pub fn snooze_delay(&self) -> std::time::Duration {
        let minutes = self.snooze_minutes.clamp(0, MAX_SNOOZE_MINUTES) as u64;
        std::time::Duration::from_secs(minutes * 60)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
