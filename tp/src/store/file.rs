//! File-backed result store: one `<key>.json` file per key

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{ResultStore, StoreError};

pub struct FileStore {
    store_path: PathBuf,
}

impl FileStore {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        let path = store_path.into();
        debug!(?path, "FileStore::new: called");
        Self { store_path: path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.store_path
    }

    fn key_file(&self, key: &str) -> PathBuf {
        self.store_path.join(format!("{}.json", key))
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        debug!(path = ?self.store_path, "FileStore::ensure_dir: called");
        fs::create_dir_all(&self.store_path).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let file = self.key_file(key);
        debug!(?file, "FileStore::get: called");
        match fs::read(&file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?file, "FileStore::get: no such file");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.ensure_dir().await?;

        // Write to a temp file and rename so a crash never leaves half a value
        let file = self.key_file(key);
        let tmp = self.store_path.join(format!("{}.json.tmp", key));
        debug!(?file, len = value.len(), "FileStore::put: writing");

        let mut out = fs::File::create(&tmp).await?;
        out.write_all(&value).await?;
        out.flush().await?;
        drop(out);
        fs::rename(&tmp, &file).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let file = self.key_file(key);
        debug!(?file, "FileStore::remove: called");
        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
