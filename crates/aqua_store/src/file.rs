use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::keys::validate_key;
use crate::store::KeyValueStore;

/// One file per key under a root directory.
///
/// Writes land in a temporary sibling that is fsynced and renamed over the
/// target, so a crash leaves either the old or the new value on disk.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root)
            .map_err(|source| StoreError::io("creating store directory", root, source))?;
        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(".{key}.tmp"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
                StoreError::InvalidUtf8 {
                    key: key.to_owned(),
                    path,
                }
            }),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::io("reading stored value", path, source)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let temp_path = self.temp_path_for(key);
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut file = File::create(&temp_path)
            .map_err(|source| StoreError::io("creating temporary value file", &temp_path, source))?;
        file.write_all(value.as_bytes())
            .map_err(|source| StoreError::io("writing temporary value file", &temp_path, source))?;
        file.sync_all()
            .map_err(|source| StoreError::io("syncing temporary value file", &temp_path, source))?;
        drop(file);

        fs::rename(&temp_path, &path)
            .map_err(|source| StoreError::io("replacing stored value", &path, source))?;
        tracing::trace!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::trace!(key, "removed stored value");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::io("removing stored value", path, source)),
        }
    }
}
