use std::collections::HashMap;
use std::sync::Mutex;

use agrimarket_core::{AppError, AppResult};

use crate::KeyValueStore;

#[derive(Default)]
pub(crate) struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub(crate) fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: Mutex::new(
                pairs
                    .iter()
                    .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .lock()
            .map(|values| values.clone())
            .unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .values
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock store: {error}")))?
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.values
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock store: {error}")))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.values
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock store: {error}")))?
            .remove(key);
        Ok(())
    }
}

pub(crate) struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::Storage("storage unavailable".to_owned()))
    }

    fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
        Err(AppError::Storage("storage unavailable".to_owned()))
    }

    fn remove(&self, _key: &str) -> AppResult<()> {
        Err(AppError::Storage("storage unavailable".to_owned()))
    }
}
