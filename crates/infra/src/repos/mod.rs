mod kv;
mod reminder;
mod shared;

pub use kv::{FileKVRepo, IKVRepo, InMemoryKVRepo, KeyValue};
pub use reminder::{
    decode_reminders, encode_reminders, IReminderRepo, PersistenceReadError, ReminderStore,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub kv_repo: Arc<dyn IKVRepo>,
    pub reminder_repo: Arc<dyn IReminderRepo>,
}

impl Repos {
    /// Repos writing every key as a json file inside `data_dir`
    pub fn create_file(data_dir: &Path, store_key: &str) -> Self {
        info!("Persisting reminders in {}", data_dir.display());
        let kv_repo: Arc<dyn IKVRepo> = Arc::new(FileKVRepo::new(data_dir));
        Self::create_with_kv(kv_repo, store_key)
    }

    pub fn create_inmemory() -> Self {
        Self::create_with_kv(
            Arc::new(InMemoryKVRepo::new()),
            crate::config::DEFAULT_STORE_KEY,
        )
    }

    pub fn create_with_kv(kv_repo: Arc<dyn IKVRepo>, store_key: &str) -> Self {
        Self {
            reminder_repo: Arc::new(ReminderStore::new(kv_repo.clone(), store_key)),
            kv_repo,
        }
    }
}
