use std::collections::HashMap;
use std::sync::RwLock;

use agrimarket_application::KeyValueStore;
use agrimarket_core::{AppError, AppResult};

/// In-memory key-value store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|error| AppError::Internal(format!("failed to read store state: {error}")))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.values
            .write()
            .map_err(|error| AppError::Internal(format!("failed to write store state: {error}")))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.values
            .write()
            .map_err(|error| AppError::Internal(format!("failed to write store state: {error}")))?
            .remove(key);
        Ok(())
    }
}
