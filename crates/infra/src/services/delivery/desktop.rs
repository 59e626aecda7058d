use super::{
    DeliveryChannel, DeliveryError, DeliverySink, Notification, UserAction, UserActionKind,
};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const SOUND_FILES: [(&str, &str); 2] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
];

/// Delivers through the desktop notification daemon and the terminal
pub struct DesktopSink {
    channel: Mutex<DeliveryChannel>,
    actions_tx: UnboundedSender<UserAction>,
    actions_rx: Mutex<Option<UnboundedReceiver<UserAction>>>,
}

impl DesktopSink {
    pub fn new(channel: DeliveryChannel) -> Self {
        let (actions_tx, actions_rx) = unbounded_channel();
        Self {
            channel: Mutex::new(channel),
            actions_tx,
            actions_rx: Mutex::new(Some(actions_rx)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DeliveryChannel> {
        self.channel.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Maps the identifier the notification daemon reports back to an action.
/// Closing or dismissing the notification is no action.
fn parse_action(identifier: &str) -> Option<UserActionKind> {
    [UserActionKind::Acknowledge, UserActionKind::Postpone]
        .iter()
        .copied()
        .find(|kind| kind.identifier() == identifier)
}

/// Plays `sound_file` with `player` and reaps the player once it exits
fn spawn_player(player: &str, sound_file: &Path) -> std::io::Result<JoinHandle<bool>> {
    let mut child = tokio::process::Command::new(player)
        .arg(sound_file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let player = player.to_string();
    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => status.success(),
            Err(e) => {
                warn!("Unable to wait for {}: {:?}", player, e);
                false
            }
        }
    }))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn forward_actions(
    handle: notify_rust::NotificationHandle,
    notification: &Notification,
    actions: UnboundedSender<UserAction>,
) {
    let reminder_id = notification.reminder_id;
    // A plain thread, as the blocking pool would hold up runtime shutdown while
    // the notification stays open
    let spawned = std::thread::Builder::new()
        .name(format!("notification-{}", reminder_id))
        .spawn(move || {
            handle.wait_for_action(|identifier| match parse_action(identifier) {
                Some(kind) => {
                    debug!("Notification of reminder {} answered with {:?}", reminder_id, kind);
                    let _ = actions.send(UserAction { reminder_id, kind });
                }
                None => debug!("Notification of reminder {} closed", reminder_id),
            })
        });
    if let Err(e) = spawned {
        warn!("Unable to listen for notification actions: {:?}", e);
    }
}

impl DeliverySink for DesktopSink {
    fn channel(&self) -> DeliveryChannel {
        *self.lock()
    }

    fn request_permission(&self) -> DeliveryChannel {
        // Desktop notification daemons do not ask, so an open question becomes a yes
        let mut channel = self.lock();
        if *channel == DeliveryChannel::Undetermined {
            *channel = DeliveryChannel::Granted;
        }
        *channel
    }

    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .summary(&notification.title)
            .body(&notification.body)
            .appname("medremind")
            .icon("appointment-soon")
            .timeout(notify_rust::Timeout::Never);
        for action in &notification.actions {
            desktop.action(action.identifier(), action.title());
        }
        let handle = desktop
            .show()
            .map_err(|e| DeliveryError::Failed(e.to_string()))?;

        #[cfg(all(unix, not(target_os = "macos")))]
        forward_actions(handle, notification, self.actions_tx.clone());
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        let _ = handle;

        Ok(())
    }

    fn play_tone(&self) -> Result<(), DeliveryError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            for (player, sound_file) in SOUND_FILES.iter() {
                let sound_file = Path::new(sound_file);
                if sound_file.exists() {
                    return spawn_player(player, sound_file)
                        .map(|_| ())
                        .map_err(|e| DeliveryError::Failed(e.to_string()));
                }
            }
        }

        // Terminal bell
        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| DeliveryError::Unavailable(e.to_string()))
    }

    fn vibrate(&self, _pattern: &[u64]) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unavailable(
            "vibration is not supported on desktop".into(),
        ))
    }

    fn alert(&self, message: &str) -> Result<(), DeliveryError> {
        let mut stdout = std::io::stdout();
        writeln!(stdout, "{}", message)
            .and_then(|_| stdout.flush())
            .map_err(|e| DeliveryError::Failed(e.to_string()))
    }

    fn take_actions(&self) -> Option<UnboundedReceiver<UserAction>> {
        self.actions_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_request_grants_undetermined() {
        let sink = DesktopSink::new(DeliveryChannel::Undetermined);
        assert_eq!(sink.request_permission(), DeliveryChannel::Granted);
        assert_eq!(sink.channel(), DeliveryChannel::Granted);

        let sink = DesktopSink::new(DeliveryChannel::Denied);
        assert_eq!(sink.request_permission(), DeliveryChannel::Denied);
    }

    #[test]
    fn vibration_is_unavailable() {
        let sink = DesktopSink::new(DeliveryChannel::Granted);
        assert!(matches!(
            sink.vibrate(&[200]),
            Err(DeliveryError::Unavailable(_))
        ));
    }

    #[test]
    fn maps_notification_answers_to_actions() {
        assert_eq!(parse_action("take"), Some(UserActionKind::Acknowledge));
        assert_eq!(parse_action("snooze"), Some(UserActionKind::Postpone));
        assert_eq!(parse_action("__closed"), None);
        assert_eq!(parse_action("default"), None);
    }

    #[test]
    fn actions_are_handed_out_once() {
        let sink = DesktopSink::new(DeliveryChannel::Granted);
        assert!(sink.take_actions().is_some());
        assert!(sink.take_actions().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sound_player_is_reaped_after_it_exits() {
        let sound = tempfile::NamedTempFile::new().unwrap();
        let reaped = spawn_player("true", sound.path()).unwrap();
        assert!(reaped.await.unwrap());
    }
}
