use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};

use agrimarket_application::KeyValueStore;
use agrimarket_core::{AppError, AppResult};
use tracing::debug;

/// Key-value store persisted as one JSON object on disk.
///
/// The whole map is loaded on open and rewritten after every change. A
/// missing file is an empty store. Changes reach memory only once the file
/// has been replaced, and the file is replaced by renaming a fully written
/// sibling so readers never observe a partial write.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonFileKeyValueStore {
    /// Opens the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|error| {
                AppError::Storage(format!(
                    "storage file '{}' is not a JSON object of strings: {error}",
                    path.display()
                ))
            })?,
            Err(error) if error.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => {
                return Err(AppError::Storage(format!(
                    "failed to read storage file '{}': {error}",
                    path.display()
                )));
            }
        };

        debug!(path = %path.display(), keys = values.len(), "opened storage file");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn write_values(&self) -> AppResult<RwLockWriteGuard<'_, BTreeMap<String, String>>> {
        self.values
            .write()
            .map_err(|error| AppError::Internal(format!("failed to write store state: {error}")))
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|error| {
                AppError::Storage(format!(
                    "failed to create storage directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|error| AppError::Internal(format!("failed to encode storage: {error}")))?;
        let staging_path = self.staging_path();
        fs::write(&staging_path, bytes).map_err(|error| {
            AppError::Storage(format!(
                "failed to write storage file '{}': {error}",
                staging_path.display()
            ))
        })?;

        fs::rename(&staging_path, &self.path).map_err(|error| {
            let _ = fs::remove_file(&staging_path);
            AppError::Storage(format!(
                "failed to replace storage file '{}': {error}",
                self.path.display()
            ))
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|error| AppError::Internal(format!("failed to read store state: {error}")))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut values = self.write_values()?;
        let mut next = values.clone();
        next.insert(key.to_owned(), value.to_owned());
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut values = self.write_values()?;
        if !values.contains_key(key) {
            return Ok(());
        }

        let mut next = values.clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| panic!("test"));
        let store = JsonFileKeyValueStore::open(dir.path().join("absent.json"))
            .unwrap_or_else(|_| panic!("test"));
        assert_eq!(store.get("token").ok().flatten(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| panic!("test"));
        let path = dir.path().join("nested").join("storage.json");

        let store = JsonFileKeyValueStore::open(&path).unwrap_or_else(|_| panic!("test"));
        assert!(store.set("adminDashboardToken", "jwt").is_ok());
        assert!(store.set("user", "{}").is_ok());
        assert!(store.remove("user").is_ok());

        let reopened = JsonFileKeyValueStore::open(&path).unwrap_or_else(|_| panic!("test"));
        assert_eq!(
            reopened.get("adminDashboardToken").ok().flatten().as_deref(),
            Some("jwt")
        );
        assert_eq!(reopened.get("user").ok().flatten(), None);
    }

    #[test]
    fn failed_write_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| panic!("test"));
        let path = dir.path().join("storage.json");
        let store = JsonFileKeyValueStore::open(&path).unwrap_or_else(|_| panic!("test"));
        assert!(store.set("user", "{}").is_ok());

        fs::remove_file(&path).unwrap_or_else(|_| panic!("test"));
        fs::create_dir(&path).unwrap_or_else(|_| panic!("test"));

        assert!(matches!(
            store.set("adminDashboardToken", "jwt"),
            Err(AppError::Storage(_))
        ));
        assert!(matches!(store.remove("user"), Err(AppError::Storage(_))));
        assert_eq!(store.get("adminDashboardToken").ok().flatten(), None);
        assert_eq!(store.get("user").ok().flatten().as_deref(), Some("{}"));
        assert!(!store.staging_path().exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| panic!("test"));
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2]").unwrap_or_else(|_| panic!("test"));

        assert!(matches!(
            JsonFileKeyValueStore::open(&path),
            Err(AppError::Storage(_))
        ));
    }
}
