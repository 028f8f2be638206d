use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use strongbox_core::storage::{KeyValueStore, StoreError};
use tempfile::NamedTempFile;
use tracing::instrument;

/// File-backed raw text store: one file per key under `root`.
/// Writes go through a temp file and an atomic rename.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    #[instrument(skip_all, fields(key))]
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        read_text(&self.path_for(key))
    }

    #[instrument(skip_all, fields(key))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(storage_err)?;
        write_text(&self.path_for(key), value)
    }

    #[instrument(skip_all, fields(key))]
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

fn write_text(path: &Path, value: &str) -> Result<(), StoreError> {
    let parent = path.parent().ok_or_else(|| StoreError::Unavailable {
        reason: "invalid storage path".to_string(),
    })?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(value.as_bytes()).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

fn read_text(path: &Path) -> Result<Option<String>, StoreError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(storage_err(err)),
    };

    let mut buf = String::new();
    file.read_to_string(&mut buf).map_err(storage_err)?;
    Ok(Some(buf))
}

fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

fn storage_err<E: ToString>(err: E) -> StoreError {
    StoreError::Unavailable {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use strongbox_core::config::{EncryptionSettings, StaticResolver};

    use super::*;
    use crate::encrypted_store::{EncryptedStore, Lookup};

    #[tokio::test]
    async fn round_trip_persists_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());

        store.set("workspace/session", "hello").await.expect("set");
        let value = store.get("workspace/session").await.expect("get");
        assert_eq!(value.as_deref(), Some("hello"));

        // key is encoded into a flat filename
        let entries: Vec<_> = fs::read_dir(dir.path()).expect("read_dir").collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path().join("not-created-yet"));
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());
        store.set("k", "v").await.expect("set");
        store.remove("k").await.expect("remove");
        store.remove("k").await.expect("remove again");

        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn encrypted_records_do_not_leak_plaintext_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = EncryptedStore::new(
            FileKeyValueStore::new(dir.path()),
            StaticResolver::new(EncryptionSettings::new(true, "s3cr3t")),
        );

        store.set("note", "hello-strongbox").await.expect("set");
        let on_disk =
            fs::read_to_string(store.backend().path_for("note")).expect("read ciphertext");
        assert!(!on_disk.contains("hello-strongbox"), "plaintext must not be stored");

        let found = store.get("note").await;
        assert!(matches!(found, Lookup::Found(ref v) if v.to_string() == "hello-strongbox"));
    }
}
