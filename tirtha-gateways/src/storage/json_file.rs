use std::{
    io,
    path::{Path, PathBuf},
};

use jfs::Store;
use tirtha_core::gateways::storage::{KeyValueStorage, StorageError};

/// Client storage backed by a single JSON file.
pub struct JsonFileStorage {
    json_store: Store,
}

impl std::fmt::Debug for JsonFileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("JsonFileStorage")
            .field("path", &self.path())
            .finish()
    }
}

impl JsonFileStorage {
    /// Open or create the storage file.
    ///
    /// A path without the `.json` extension gets it appended.
    pub fn try_new<P: AsRef<Path>>(file: P) -> io::Result<Self> {
        let cfg = jfs::Config {
            single: true,
            pretty: true,
            ..Default::default()
        };
        let json_store = Store::new_with_cfg(file, cfg)?;
        Ok(Self { json_store })
    }

    pub fn path(&self) -> PathBuf {
        self.json_store.path().to_path_buf()
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.json_store.get::<String>(key) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.json_store.save_with_id(&value.to_owned(), key)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.json_store.delete(key) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tirtha_core::gateways::storage::keys;

    #[test]
    fn persist_values_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        let storage = JsonFileStorage::try_new(&file).unwrap();
        assert_eq!(storage.get(keys::LANGUAGE).unwrap(), None);
        storage.set(keys::LANGUAGE, "ru").unwrap();
        storage.set(keys::MAP_TOKEN, "pk.123").unwrap();
        drop(storage);

        let storage = JsonFileStorage::try_new(&file).unwrap();
        assert_eq!(storage.get(keys::LANGUAGE).unwrap().as_deref(), Some("ru"));
        storage.remove(keys::MAP_TOKEN).unwrap();
        assert_eq!(storage.get(keys::MAP_TOKEN).unwrap(), None);
    }

    #[test]
    fn remove_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::try_new(dir.path().join("settings.json")).unwrap();
        assert!(storage.remove(keys::AUTH_SESSION).is_ok());
    }
}
