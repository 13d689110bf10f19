//! Pushes identical changes to a primary tree and its optional mirror
//!
//! The mirror is the unpacked working copy of a bundle. When it does not exist
//! on disk every operation applies to the primary tree only.

use std::path::{Path, PathBuf};
use tracing::trace;

use super::error::{Result, VfsError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredTree {
    primary: PathBuf,
    mirror: Option<PathBuf>,
}

impl MirroredTree {
    pub fn new(primary: impl Into<PathBuf>, mirror: Option<PathBuf>) -> Self {
        let primary = primary.into();
        let mirror = mirror.filter(|mirror| *mirror != primary);
        Self { primary, mirror }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn mirror(&self) -> Option<&Path> {
        self.mirror.as_deref()
    }

    /// Trees that currently exist and receive writes
    fn targets(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path())
            .chain(self.mirror.as_deref())
            .filter(|target| target.exists())
    }

    pub fn can_read(&self) -> bool {
        super::can_read(&self.primary)
            && self
                .mirror
                .as_deref()
                .map_or(true, |mirror| !mirror.exists() || super::can_read(mirror))
    }

    pub fn can_write(&self) -> bool {
        super::can_write(&self.primary)
            && self
                .mirror
                .as_deref()
                .map_or(true, |mirror| !mirror.exists() || super::can_write(mirror))
    }

    /// Immediate children of a folder in the primary tree, sorted by name
    pub fn list(&self, relative: &Path) -> Result<Vec<PathBuf>> {
        let dir = self.primary.join(relative);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = std::fs::read_dir(&dir)
            .map_err(VfsError::io(&dir))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(VfsError::io(&dir))?;
        entries.sort();
        Ok(entries)
    }

    pub fn read(&self, relative: &Path) -> Result<Option<Vec<u8>>> {
        let path = self.primary.join(relative);
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read(&path).map(Some).map_err(VfsError::io(&path))
    }

    /// Copies `source` into `relative_dir` of every tree, keeping its file name
    pub fn copy_file(&self, source: &Path, relative_dir: &Path) -> Result<()> {
        let file_name = source
            .file_name()
            .ok_or_else(|| VfsError::Path(format!("No file name: {}", source.display())))?;

        for target in self.targets() {
            let dir = target.join(relative_dir);
            let destination = dir.join(file_name);
            if destination == source {
                continue;
            }
            std::fs::create_dir_all(&dir).map_err(VfsError::io(&dir))?;
            std::fs::copy(source, &destination).map_err(VfsError::io(&destination))?;
            trace!("copied {} -> {}", source.display(), destination.display());
        }
        Ok(())
    }

    /// Recursively deletes `relative` from every tree
    pub fn remove(&self, relative: &Path) -> Result<()> {
        for target in self.targets() {
            let path = target.join(relative);
            if path.is_dir() {
                std::fs::remove_dir_all(&path).map_err(VfsError::io(&path))?;
            } else if path.exists() {
                std::fs::remove_file(&path).map_err(VfsError::io(&path))?;
            } else {
                continue;
            }
            trace!("removed {}", path.display());
        }
        Ok(())
    }

    /// Writes `bytes` to `relative` in every tree, creating parent folders.
    ///
    /// Files that already hold exactly `bytes` are left untouched.
    pub fn write(&self, relative: &Path, bytes: &[u8]) -> Result<()> {
        for target in self.targets() {
            let path = target.join(relative);
            if path.is_file() && std::fs::read(&path).is_ok_and(|existing| existing == bytes) {
                trace!("unchanged {}", path.display());
                continue;
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(VfsError::io(parent))?;
            }
            std::fs::write(&path, bytes).map_err(VfsError::io(&path))?;
        }
        Ok(())
    }
}
