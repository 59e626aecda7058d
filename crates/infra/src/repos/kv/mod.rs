mod file;
mod inmemory;

pub use file::FileKVRepo;
pub use inmemory::InMemoryKVRepo;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Flat string blob storage keyed by a namespace string
#[async_trait::async_trait]
pub trait IKVRepo: Send + Sync {
    async fn set(&self, kv: &KeyValue) -> anyhow::Result<()>;
    /// Unreadable entries are reported as absent
    async fn get(&self, key: &str) -> Option<KeyValue>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// One in memory repo and one file repo backed by a fresh temp dir
    fn create_repos(dir: &tempfile::TempDir) -> Vec<Arc<dyn IKVRepo>> {
        vec![
            Arc::new(InMemoryKVRepo::new()),
            Arc::new(FileKVRepo::new(dir.path())),
        ]
    }

    #[tokio::test]
    async fn test_kv_queries() {
        let dir = tempfile::tempdir().unwrap();

        for repo in create_repos(&dir) {
            let kv1 = KeyValue::new("1", "1");
            let kv2 = KeyValue::new("2", "2");
            let kv3 = KeyValue::new(kv1.key.clone(), "3");

            for kv in vec![&kv1, &kv2] {
                assert!(repo.set(kv).await.is_ok());
                let res = repo
                    .get(&kv.key)
                    .await
                    .expect("To find key value just inserted");
                assert_eq!(res.key, kv.key);
                assert_eq!(res.value, kv.value);
            }

            // Overwrite kv1
            assert!(repo.set(&kv3).await.is_ok());
            assert_eq!(repo.get(&kv1.key).await.unwrap().value, "3");

            // Delete kv2 key and query on that should return None
            assert!(repo.delete(&kv2.key).await.is_ok());
            assert!(repo.get(&kv2.key).await.is_none());

            // Deleting a missing key is fine
            assert!(repo.delete(&kv2.key).await.is_ok());
        }
    }
}
