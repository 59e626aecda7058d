mod store;

use medremind_domain::{Reminder, ReminderValidationError, ID};
use thiserror::Error;

pub use store::ReminderStore;

#[derive(Error, Debug)]
pub enum PersistenceReadError {
    #[error("Stored reminders are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Stored reminder {0} is invalid: {1}")]
    InvalidReminder(ID, ReminderValidationError),
}

/// Decodes a serialized reminder collection. Any bad entry rejects the whole blob.
pub fn decode_reminders(blob: &str) -> Result<Vec<Reminder>, PersistenceReadError> {
    let reminders: Vec<Reminder> = serde_json::from_str(blob)?;
    for reminder in &reminders {
        reminder
            .validate()
            .map_err(|e| PersistenceReadError::InvalidReminder(reminder.id, e))?;
    }
    Ok(reminders)
}

pub fn encode_reminders(reminders: &[Reminder]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(reminders)?)
}

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    /// Reads the stored collection, replacing whatever is held in memory.
    /// A missing or malformed blob loads as an empty collection.
    async fn load(&self) -> Vec<Reminder>;
    /// Picks up changes written to the store by another process. Returns the
    /// collection held before when it differed from the stored one.
    async fn reload(&self) -> Option<Vec<Reminder>>;
    /// Fails when a reminder with the same id is already stored
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    /// Every reminder ordered by time of day
    async fn find_all(&self) -> Vec<Reminder>;
    async fn delete(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>>;
    /// Swaps in a whole new collection and returns the previous one
    async fn replace_all(&self, reminders: Vec<Reminder>) -> anyhow::Result<Vec<Reminder>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_blob() {
        let blob = r#"[{"id":1,"name":"A","dosage":"1","time":"08:00","frequency":"daily","notes":"","created":"2024-03-01T08:00:00Z","lastTaken":null}]"#;
        let reminders = decode_reminders(blob).unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].name, "A");
    }

    #[test]
    fn rejects_malformed_blobs() {
        assert!(matches!(
            decode_reminders("{not json"),
            Err(PersistenceReadError::Malformed(_))
        ));
        assert!(matches!(
            decode_reminders(r#"{"id":1}"#),
            Err(PersistenceReadError::Malformed(_))
        ));
        let missing_name = r#"[{"id":1,"name":" ","dosage":"1","time":"08:00","created":"2024-03-01T08:00:00Z"}]"#;
        assert!(matches!(
            decode_reminders(missing_name),
            Err(PersistenceReadError::InvalidReminder(_, ReminderValidationError::MissingName))
        ));
    }
}
