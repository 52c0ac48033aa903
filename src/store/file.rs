// src/store/file.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::RawSettingsFile;
use crate::errors::Result;
use crate::types::BoxFuture;

use super::{RunRecord, RunStore};

/// Run store backed by the `[current_run]` table of the settings file.
///
/// Every `set` re-reads the document so edits made to `[research]` while a
/// run is in flight are kept, then replaces the file atomically: write a
/// sibling temp file, fsync it, rename it over the original.
#[derive(Debug)]
pub struct FileRunStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRunStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Option<RawSettingsFile>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(toml::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, doc: &RawSettingsFile) -> Result<()> {
        let contents = toml::to_string_pretty(doc)?;
        let tmp = temp_sibling(&self.path);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl RunStore for FileRunStore {
    fn get(&self) -> BoxFuture<'_, Result<Option<RunRecord>>> {
        Box::pin(async move {
            let doc = self.read_document().await?;
            Ok(doc.and_then(|d| d.current_run))
        })
    }

    fn set(&self, record: Option<RunRecord>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            let mut doc = self.read_document().await?.unwrap_or_default();
            doc.current_run = record;
            self.write_document(&doc).await?;

            debug!(
                path = %self.path.display(),
                present = doc.current_run.is_some(),
                "persisted run record"
            );
            Ok(())
        })
    }
}
