use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::{DatabaseError, OptionStore};

/// Options kept in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    options: DashMap<String, Value>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[async_trait]
impl OptionStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<Value>, DatabaseError> {
        Ok(self.options.get(name).map(|v| v.value().clone()))
    }

    async fn set(&self, name: &str, value: Value) -> Result<(), DatabaseError> {
        self.options.insert(name.to_string(), value);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), DatabaseError> {
        self.options.remove(name);
        Ok(())
    }
}
