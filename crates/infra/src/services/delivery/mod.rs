mod desktop;
mod recording;

use medremind_domain::{Reminder, ID};
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

pub use desktop::DesktopSink;
pub use recording::{RecordingSink, SinkCall};

pub const NOTIFICATION_TITLE: &str = "MedRemind";
/// On / off / on, in millis
pub const VIBRATION_PATTERN: [u64; 3] = [200, 100, 200];

/// What the user has allowed the app to use for reaching them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChannel {
    Granted,
    Undetermined,
    Denied,
}

#[derive(Error, Debug)]
#[error("Invalid delivery channel: {0}")]
pub struct InvalidDeliveryChannelError(String);

impl FromStr for DeliveryChannel {
    type Err = InvalidDeliveryChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "granted" => Ok(Self::Granted),
            "prompt" | "default" | "undetermined" => Ok(Self::Undetermined),
            "denied" => Ok(Self::Denied),
            _ => Err(InvalidDeliveryChannelError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserActionKind {
    /// "Take Now"
    Acknowledge,
    /// "Snooze"
    Postpone,
}

impl UserActionKind {
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Acknowledge => "take",
            Self::Postpone => "snooze",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Acknowledge => "Take Now",
            Self::Postpone => "Snooze",
        }
    }
}

/// A response to a delivered reminder, clicked on the notification or typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAction {
    pub reminder_id: ID,
    pub kind: UserActionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Notifications with the same tag replace each other
    pub tag: String,
    pub reminder_id: ID,
    pub actions: Vec<UserActionKind>,
}

impl Notification {
    pub fn for_reminder(reminder: &Reminder) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body: format!("Time to take {} - {}", reminder.name, reminder.dosage),
            tag: format!("med-reminder-{}", reminder.id),
            reminder_id: reminder.id,
            actions: vec![UserActionKind::Acknowledge, UserActionKind::Postpone],
        }
    }

    /// Text used when the system notification can not be shown
    pub fn alert_text(&self) -> String {
        format!("Reminder: {}", self.body)
    }
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Channel unavailable: {0}")]
    Unavailable(String),
    #[error("Delivery failed: {0}")]
    Failed(String),
}

/// The ways of getting a reminder in front of the user
pub trait DeliverySink: Send + Sync {
    fn channel(&self) -> DeliveryChannel;
    /// Asks the user for notification permission and returns the resulting channel
    fn request_permission(&self) -> DeliveryChannel;
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError>;
    fn play_tone(&self) -> Result<(), DeliveryError>;
    fn vibrate(&self, pattern: &[u64]) -> Result<(), DeliveryError>;
    fn alert(&self, message: &str) -> Result<(), DeliveryError>;
    /// The actions the user takes on delivered notifications, as they happen.
    /// Only the first call gets the receiver.
    fn take_actions(&self) -> Option<UnboundedReceiver<UserAction>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Notified,
    Alerted,
    Undelivered,
}

fn log_failure(what: &str, e: &DeliveryError) {
    match e {
        DeliveryError::Unavailable(_) => debug!("Skipping {}: {}", what, e),
        DeliveryError::Failed(_) => warn!("Unable to {}: {}", what, e),
    }
}

fn show_alert(sink: &dyn DeliverySink, notification: &Notification) -> DeliveryOutcome {
    match sink.alert(&notification.alert_text()) {
        Ok(()) => DeliveryOutcome::Alerted,
        Err(e) => {
            log_failure("show alert", &e);
            DeliveryOutcome::Undelivered
        }
    }
}

fn play_tone(sink: &dyn DeliverySink) {
    if let Err(e) = sink.play_tone() {
        log_failure("play tone", &e);
    }
}

/// Delivers the notification on the best channel the sink currently allows.
/// Never fails, failures are logged and fall back to the alert channel.
pub fn deliver(sink: &dyn DeliverySink, notification: &Notification) -> DeliveryOutcome {
    match sink.channel() {
        DeliveryChannel::Granted => {
            play_tone(sink);
            if let Err(e) = sink.vibrate(&VIBRATION_PATTERN) {
                log_failure("vibrate", &e);
            }
            match sink.notify(notification) {
                Ok(()) => DeliveryOutcome::Notified,
                Err(e) => {
                    log_failure("show notification", &e);
                    show_alert(sink, notification)
                }
            }
        }
        DeliveryChannel::Undetermined => {
            let channel = sink.request_permission();
            debug!("Notification permission is now {:?}", channel);
            let outcome = show_alert(sink, notification);
            play_tone(sink);
            outcome
        }
        DeliveryChannel::Denied => {
            let outcome = show_alert(sink, notification);
            play_tone(sink);
            outcome
        }
    }
}
