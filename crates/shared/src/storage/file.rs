use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use super::{KeyValueStore, StorageError};

/// File-backed store: every key of one origin lives in a single JSON object
/// document. Each operation is a whole-document read-modify-write, replaced
/// atomically through a sibling temp file.
///
/// The mutex serializes writers inside one process only. Two processes
/// sharing a file can still overwrite each other's writes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        f(&mut entries);

        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;

        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.modify(BTreeMap::clear)
    }
}

#[cfg(test)]
mod tests {
    use temp_dir::TempDir;

    use super::*;

    #[test]
    fn values_survive_a_new_handle() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.child("origin/store.json");

        let store = FileStore::new(&path);
        store.write("users", "[]")?;
        store.write("session", r#"{"userId":"u1","timestamp":1}"#)?;
        store.delete("users")?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.read("users")?, None);
        assert_eq!(
            reopened.read("session")?.as_deref(),
            Some(r#"{"userId":"u1","timestamp":1}"#)
        );

        Ok(())
    }

    #[test]
    fn missing_file_reads_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = FileStore::new(dir.child("nothing.json"));

        assert_eq!(store.read("users")?, None);

        store.clear()?;
        assert!(store.path().exists());

        Ok(())
    }

    #[test]
    fn corrupt_document_is_an_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.child("store.json");
        fs::write(&path, "not json")?;

        let store = FileStore::new(&path);
        assert!(matches!(store.read("users"), Err(StorageError::Json(_))));

        Ok(())
    }
}
