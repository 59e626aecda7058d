use super::{IKVRepo, KeyValue};
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Stores every key as `<dir>/<key>.json`
pub struct FileKVRepo {
    dir: PathBuf,
}

impl FileKVRepo {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

#[async_trait::async_trait]
impl IKVRepo for FileKVRepo {
    async fn set(&self, kv: &KeyValue) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create data dir {}", self.dir.display()))?;

        // Write to a sibling file first so a crash never leaves a half written blob
        let path = self.path_for(&kv.key);
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, kv.value.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<KeyValue> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Some(KeyValue::new(key, value)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Unable to read {}: {:?}", path.display(), e);
                None
            }
        }
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}
