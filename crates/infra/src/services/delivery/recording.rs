use super::{
    DeliveryChannel, DeliveryError, DeliverySink, Notification, UserAction, UserActionKind,
};
use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    RequestPermission,
    Notify(Notification),
    Tone,
    Vibrate(Vec<u64>),
    Alert(String),
}

/// Sink that remembers every call made to it
pub struct RecordingSink {
    channel: DeliveryChannel,
    fail_notify: bool,
    answer: Option<UserActionKind>,
    calls: Mutex<Vec<SinkCall>>,
    actions_tx: UnboundedSender<UserAction>,
    actions_rx: Mutex<Option<UnboundedReceiver<UserAction>>>,
}

impl RecordingSink {
    pub fn new(channel: DeliveryChannel) -> Self {
        let (actions_tx, actions_rx) = unbounded_channel();
        Self {
            channel,
            fail_notify: false,
            answer: None,
            calls: Mutex::new(Vec::new()),
            actions_tx,
            actions_rx: Mutex::new(Some(actions_rx)),
        }
    }

    /// Every shown notification is answered with `kind` right away
    pub fn answering(mut self, kind: UserActionKind) -> Self {
        self.answer = Some(kind);
        self
    }

    /// Acts as if the user clicked an action on a notification
    pub fn click(&self, action: UserAction) {
        // Nobody listening is the same as nobody clicking
        let _ = self.actions_tx.send(action);
    }

    pub fn with_failing_notify(mut self) -> Self {
        self.fail_notify = true;
        self
    }

    fn record(&self, call: SinkCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl DeliverySink for RecordingSink {
    fn channel(&self) -> DeliveryChannel {
        self.channel
    }

    fn request_permission(&self) -> DeliveryChannel {
        self.record(SinkCall::RequestPermission);
        self.channel
    }

    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if self.fail_notify {
            return Err(DeliveryError::Failed("notification daemon is gone".into()));
        }
        self.record(SinkCall::Notify(notification.clone()));
        if let Some(kind) = self.answer {
            self.click(UserAction {
                reminder_id: notification.reminder_id,
                kind,
            });
        }
        Ok(())
    }

    fn play_tone(&self) -> Result<(), DeliveryError> {
        self.record(SinkCall::Tone);
        Ok(())
    }

    fn vibrate(&self, pattern: &[u64]) -> Result<(), DeliveryError> {
        self.record(SinkCall::Vibrate(pattern.to_vec()));
        Ok(())
    }

    fn alert(&self, message: &str) -> Result<(), DeliveryError> {
        self.record(SinkCall::Alert(message.to_string()));
        Ok(())
    }

    fn take_actions(&self) -> Option<UnboundedReceiver<UserAction>> {
        self.actions_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}
