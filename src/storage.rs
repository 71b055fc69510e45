//! Directory-backed artifact storage.
//!
//! [`FileStorage`] reads whole artifacts and publishes new ones with
//! write-to-temp, fsync, rename. A reader therefore sees either the previous
//! file or the complete new one, never a torn write.
//!
//! Publishing can be split in two: [`FileStorage::stage`] writes and syncs
//! the bytes under a hidden temporary name, [`FileStorage::commit`] renames
//! them into place. A staged artifact that is dropped uncommitted is deleted.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use crate::error::{RagdexError, Result};

/// Bytes written and synced under a temporary name, not yet visible.
#[derive(Debug)]
pub struct StagedArtifact {
    name: String,
    file: NamedTempFile,
}

impl StagedArtifact {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A directory holding index artifacts.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Read an artifact fully. A missing file maps to [`RagdexError::NotFound`].
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name);
        fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => {
                RagdexError::not_found(format!("{} does not exist", path.display()))
            }
            _ => RagdexError::Io(err),
        })
    }

    /// Atomically replace `name` with `bytes`.
    pub fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let staged = self.stage(name, bytes)?;
        self.commit(staged)
    }

    /// Write `bytes` next to `name` without replacing it yet.
    pub fn stage(&self, name: &str, bytes: &[u8]) -> Result<StagedArtifact> {
        let mut file = Builder::new()
            .prefix(&format!(".{name}."))
            .suffix(".tmp")
            .tempfile_in(&self.root)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        Ok(StagedArtifact {
            name: name.to_string(),
            file,
        })
    }

    /// Rename a staged artifact over its target name.
    pub fn commit(&self, staged: StagedArtifact) -> Result<()> {
        let target = self.path(&staged.name);
        staged.file.persist(target).map_err(|err| err.error)?;
        self.sync_dir()?;
        Ok(())
    }

    /// Remove an artifact. Returns whether a file was removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => {
                self.sync_dir()?;
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    #[cfg(unix)]
    fn sync_dir(&self) -> Result<()> {
        fs::File::open(&self.root)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> Result<()> {
        Ok(())
    }
}
