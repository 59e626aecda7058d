use super::{IKVRepo, KeyValue};
use std::collections::HashMap;

pub struct InMemoryKVRepo {
    values: std::sync::Mutex<HashMap<String, String>>,
}

impl InMemoryKVRepo {
    pub fn new() -> Self {
        Self {
            values: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryKVRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IKVRepo for InMemoryKVRepo {
    async fn set(&self, kv: &KeyValue) -> anyhow::Result<()> {
        self.lock().insert(kv.key.clone(), kv.value.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<KeyValue> {
        self.lock()
            .get(key)
            .map(|value| KeyValue::new(key, value.clone()))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
