use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;

/// A single typed cell in the preference namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefValue {
    /// 64-bit integer cell (timestamps and counters).
    Int(i64),
    /// Boolean cell.
    Bool(bool),
    /// String cell (encoded structures such as the rolling show history).
    Text(String),
}

/// Flat string-keyed durable store backing the usage ledger.
///
/// Missing keys read as `None`. Every mutation is applied as one atomic commit, so a
/// concurrent reader never observes a partially written update; near-simultaneous
/// writes to the same key are last-writer-wins.
pub trait PreferenceStore {
    /// Read a cell, `None` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<PrefValue>, StorageError>;

    /// Apply several writes as one atomic commit.
    fn put_all(&mut self, entries: Vec<(String, PrefValue)>) -> Result<(), StorageError>;

    /// Remove a single key.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Remove every key in the namespace.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Write a single cell.
    fn put(&mut self, key: &str, value: PrefValue) -> Result<(), StorageError> {
        self.put_all(vec![(key.to_owned(), value)])
    }

    /// Read an integer cell, defaulting to 0 when absent.
    fn get_i64(&self, key: &str) -> Result<i64, StorageError> {
        match self.get(key)? {
            None => Ok(0),
            Some(PrefValue::Int(value)) => Ok(value),
            Some(_) => Err(StorageError::UnexpectedType {
                key: key.to_owned(),
                expected: "int",
            }),
        }
    }

    /// Read a non-negative counter cell, defaulting to 0 when absent.
    fn get_count(&self, key: &str) -> Result<u32, StorageError> {
        let value = self.get_i64(key)?;
        u32::try_from(value).map_err(|_| StorageError::UnexpectedType {
            key: key.to_owned(),
            expected: "non-negative counter",
        })
    }

    /// Read a boolean cell, defaulting to `false` when absent.
    fn get_bool(&self, key: &str) -> Result<bool, StorageError> {
        match self.get(key)? {
            None => Ok(false),
            Some(PrefValue::Bool(value)) => Ok(value),
            Some(_) => Err(StorageError::UnexpectedType {
                key: key.to_owned(),
                expected: "bool",
            }),
        }
    }

    /// Read a string cell, `None` when absent.
    fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.get(key)? {
            None => Ok(None),
            Some(PrefValue::Text(value)) => Ok(Some(value)),
            Some(_) => Err(StorageError::UnexpectedType {
                key: key.to_owned(),
                expected: "string",
            }),
        }
    }
}

/// In-memory store for tests and for hosts that bridge platform preferences
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cells: BTreeMap<String, PrefValue>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<PrefValue>, StorageError> {
        Ok(self.cells.get(key).cloned())
    }

    fn put_all(&mut self, entries: Vec<(String, PrefValue)>) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.cells.insert(key, value);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.cells.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.cells.clear();
        Ok(())
    }
}

/// Durable store persisting the whole namespace as one JSON document.
///
/// Every mutation rewrites the snapshot through a temp file followed by a rename, so
/// the on-disk document is always one complete commit.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cells: BTreeMap<String, PrefValue>,
}

impl JsonFileStore {
    /// Open the store at the default location inside the user's data directory.
    pub fn open_default(app_name: &str) -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("", "", app_name)
            .ok_or(StorageError::DataDirectoryUnavailable)?;
        fs::create_dir_all(dirs.data_dir())?;
        Self::open(dirs.data_dir().join("rate_prompt.json"))
    }

    /// Open the store at an explicit path. Used in tests and by hosts with their own
    /// filesystem layout.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let cells = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, cells })
    }

    fn commit(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.cells)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<PrefValue>, StorageError> {
        Ok(self.cells.get(key).cloned())
    }

    fn put_all(&mut self, entries: Vec<(String, PrefValue)>) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.cells.insert(key, value);
        }
        self.commit()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.cells.remove(key).is_some() {
            self.commit()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.cells.clear();
        self.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_keys_read_as_defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.get_i64("install_timestamp").unwrap(), 0);
        assert_eq!(store.get_count("launch_count").unwrap(), 0);
        assert!(!store.get_bool("agreed_or_declined").unwrap());
        assert_eq!(store.get_string("rolling_show_history").unwrap(), None);
    }

    #[test]
    fn typed_read_of_wrong_cell_fails() {
        let mut store = MemoryStore::new();
        store.put("flag", PrefValue::Bool(true)).unwrap();
        assert!(matches!(
            store.get_i64("flag"),
            Err(StorageError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn negative_counter_is_rejected() {
        let mut store = MemoryStore::new();
        store.put("launch_count", PrefValue::Int(-3)).unwrap();
        assert!(matches!(
            store.get_count("launch_count"),
            Err(StorageError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn file_store_round_trips_across_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .put_all(vec![
                ("install_timestamp".into(), PrefValue::Int(1_234)),
                ("agreed_or_declined".into(), PrefValue::Bool(true)),
                ("rolling_show_history".into(), PrefValue::Text("[]".into())),
            ])
            .unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_i64("install_timestamp").unwrap(), 1_234);
        assert!(store.get_bool("agreed_or_declined").unwrap());
        assert_eq!(
            store.get_string("rolling_show_history").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn clear_empties_the_namespace() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("prefs.json")).unwrap();
        store.put("launch_count", PrefValue::Int(7)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.get_i64("launch_count").unwrap(), 0);
    }
}
