use super::{decode_reminders, encode_reminders, IReminderRepo};
use crate::repos::kv::{IKVRepo, KeyValue};
use crate::repos::shared::inmemory_repo::*;
use medremind_domain::{Reminder, ID};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The reminder collection, held in memory and written back as a single
/// blob under `key` after every change.
pub struct ReminderStore {
    kv: Arc<dyn IKVRepo>,
    key: String,
    reminders: Mutex<Vec<Reminder>>,
}

impl ReminderStore {
    pub fn new(kv: Arc<dyn IKVRepo>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            reminders: Mutex::new(Vec::new()),
        }
    }

    async fn persist(&self, reminders: &[Reminder]) -> anyhow::Result<()> {
        let blob = encode_reminders(reminders)?;
        self.kv.set(&KeyValue::new(self.key.clone(), blob)).await
    }

    /// The collection as currently stored, which other processes may have
    /// changed since it was loaded. `None` when absent or unreadable.
    async fn read_stored(&self) -> Option<Vec<Reminder>> {
        let kv = self.kv.get(&self.key).await?;
        match decode_reminders(&kv.value) {
            Ok(reminders) => {
                reminders.iter().for_each(|r| r.id.mark_issued());
                Some(reminders)
            }
            Err(e) => {
                warn!("Ignoring stored reminders under {}: {}", self.key, e);
                None
            }
        }
    }

    /// Applies `change` to the latest stored collection and only keeps the
    /// result once it has been written, so a failed write leaves memory and
    /// disk in agreement.
    async fn update<R>(
        &self,
        change: impl FnOnce(&mut Vec<Reminder>) -> R,
    ) -> anyhow::Result<R> {
        let mut reminders = self.reminders.lock().await;
        let mut updated = match self.read_stored().await {
            Some(stored) => stored,
            None => reminders.clone(),
        };
        let res = change(&mut updated);
        updated.iter().for_each(|r| r.id.mark_issued());
        self.persist(&updated).await?;
        *reminders = updated;
        Ok(res)
    }
}

#[async_trait::async_trait]
impl IReminderRepo for ReminderStore {
    async fn load(&self) -> Vec<Reminder> {
        let loaded = self.read_stored().await.unwrap_or_default();
        info!("Loaded {} reminders from {}", loaded.len(), self.key);
        *self.reminders.lock().await = loaded.clone();
        loaded
    }

    async fn reload(&self) -> Option<Vec<Reminder>> {
        let mut reminders = self.reminders.lock().await;
        let stored = self.read_stored().await?;
        if stored == *reminders {
            return None;
        }
        info!("Reminders under {} were changed elsewhere", self.key);
        Some(std::mem::replace(&mut *reminders, stored))
    }

    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        let inserted = self
            .update(|reminders| {
                if find(&reminder.id, reminders).is_some() {
                    return false;
                }
                insert(reminder, reminders);
                true
            })
            .await?;
        if !inserted {
            anyhow::bail!("Reminder {} already exists", reminder.id);
        }
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        let found = self.update(|reminders| save(reminder, reminders)).await?;
        if !found {
            anyhow::bail!("Reminder {} does not exist", reminder.id);
        }
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders.lock().await)
    }

    async fn find_all(&self) -> Vec<Reminder> {
        let mut reminders = find_by(&self.reminders.lock().await, |_| true);
        reminders.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        reminders
    }

    async fn delete(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        self.update(|reminders| delete(reminder_id, reminders)).await
    }

    async fn replace_all(&self, reminders: Vec<Reminder>) -> anyhow::Result<Vec<Reminder>> {
        self.update(|current| std::mem::replace(current, reminders))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::kv::{FileKVRepo, InMemoryKVRepo};
    use chrono::{DateTime, Utc};
    use medremind_domain::Frequency;

    fn reminder(name: &str, time: &str) -> Reminder {
        let now: DateTime<Utc> = "2024-03-01T08:00:00Z".parse().unwrap();
        Reminder::new(name, "1 pill", time.parse().unwrap(), Frequency::Daily, None, now)
            .unwrap()
    }

    fn store() -> (Arc<InMemoryKVRepo>, ReminderStore) {
        let kv = Arc::new(InMemoryKVRepo::new());
        let store = ReminderStore::new(kv.clone(), "medReminders");
        (kv, store)
    }

    #[tokio::test]
    async fn loads_empty_when_absent() {
        let (_, store) = store();
        assert!(store.load().await.is_empty());
        assert!(store.find_all().await.is_empty());
    }

    #[tokio::test]
    async fn loads_empty_when_malformed() {
        let (kv, store) = store();
        kv.set(&KeyValue::new("medReminders", "{\"oops\": true}"))
            .await
            .unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn every_change_is_written_back() {
        let (kv, store) = store();
        let evening = reminder("Evening", "20:00");
        let morning = reminder("Morning", "08:00");
        store.insert(&evening).await.unwrap();
        store.insert(&morning).await.unwrap();

        // A fresh store over the same kv sees both, ordered by time
        let reopened = ReminderStore::new(kv.clone(), "medReminders");
        let loaded = reopened.load().await;
        assert_eq!(loaded.len(), 2);
        let names: Vec<_> = reopened
            .find_all()
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Morning", "Evening"]);

        let mut updated = morning.clone();
        updated.dosage = "2 pills".into();
        store.save(&updated).await.unwrap();
        assert_eq!(store.find(&morning.id).await.unwrap().dosage, "2 pills");

        assert_eq!(store.delete(&evening.id).await.unwrap(), Some(evening.clone()));
        assert_eq!(store.delete(&evening.id).await.unwrap(), None);

        let reopened = ReminderStore::new(kv, "medReminders");
        assert_eq!(reopened.load().await, vec![updated]);
    }

    #[tokio::test]
    async fn writes_keep_changes_made_by_other_stores() {
        let dir = tempfile::tempdir().unwrap();
        let kv = Arc::new(FileKVRepo::new(dir.path()));
        let running = ReminderStore::new(kv.clone(), "medReminders");
        let other = ReminderStore::new(kv.clone(), "medReminders");
        running.load().await;
        other.load().await;

        let mut a = reminder("A", "08:00");
        running.insert(&a).await.unwrap();
        other.insert(&reminder("B", "09:00")).await.unwrap();
        a.mark_taken("2024-03-01T08:01:00Z".parse().unwrap());
        running.save(&a).await.unwrap();

        let names: Vec<_> = ReminderStore::new(kv, "medReminders")
            .load()
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn reload_picks_up_changes_made_elsewhere() {
        let (kv, store) = store();
        let a = reminder("A", "08:00");
        store.insert(&a).await.unwrap();
        assert!(store.reload().await.is_none());

        let other = ReminderStore::new(kv.clone(), "medReminders");
        other.load().await;
        let b = reminder("B", "09:00");
        other.insert(&b).await.unwrap();

        assert_eq!(store.reload().await, Some(vec![a.clone()]));
        assert_eq!(store.find_all().await, vec![a, b]);
        assert!(store.reload().await.is_none());
    }

    #[tokio::test]
    async fn reload_keeps_memory_when_store_is_malformed() {
        let (kv, store) = store();
        let a = reminder("A", "08:00");
        store.insert(&a).await.unwrap();
        kv.set(&KeyValue::new("medReminders", "oops")).await.unwrap();

        assert!(store.reload().await.is_none());
        assert_eq!(store.find_all().await, vec![a]);
    }

    #[tokio::test]
    async fn imported_ids_are_never_issued_again() {
        let (_, store) = store();
        let mut imported = reminder("Imported", "08:00");
        imported.id = ID::from(4_102_444_800_000);
        store.replace_all(vec![imported.clone()]).await.unwrap();

        let created = reminder("Created", "09:00");
        assert!(created.id > imported.id);
        store.insert(&created).await.unwrap();
        assert_eq!(store.find_all().await.len(), 2);
    }

    #[tokio::test]
    async fn inserting_an_existing_id_fails() {
        let (_, store) = store();
        let a = reminder("A", "08:00");
        store.insert(&a).await.unwrap();
        assert!(store.insert(&a).await.is_err());
        assert_eq!(store.find_all().await.len(), 1);
    }

    #[tokio::test]
    async fn saving_unknown_reminder_fails() {
        let (_, store) = store();
        assert!(store.save(&reminder("Ghost", "08:00")).await.is_err());
    }

    #[tokio::test]
    async fn replace_all_returns_previous_collection() {
        let (_, store) = store();
        let old = reminder("Old", "08:00");
        store.insert(&old).await.unwrap();

        let new = reminder("New", "09:00");
        let previous = store.replace_all(vec![new.clone()]).await.unwrap();
        assert_eq!(previous, vec![old]);
        assert_eq!(store.find_all().await, vec![new]);
    }
}
