// src/vault.rs

//! Read access to the note vault.
//!
//! Paths handed to the vault are vault-relative (`Notes/noteA.md`); absolute
//! paths are honoured as-is.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::fs::FileSystem;

/// The note a run is launched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    path: String,
    name: String,
}

impl Subject {
    /// Derive the subject from a vault path; the display name is the file
    /// stem (`Notes/noteA.md` -> `noteA`).
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = Path::new(&path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        Self { path, name }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct Vault {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl Vault {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Read a note (or the prompt file) as text.
    pub fn read_note(&self, path: impl AsRef<Path>) -> Result<String> {
        let full = self.resolve(path);
        if !self.fs.is_file(&full) {
            anyhow::bail!("note not found: {}", full.display());
        }
        self.fs.read_to_string(&full)
    }
}
