use thiserror::Error;

use super::manifest::ManifestError;
use crate::vfs::VfsError;

/// Errors that can occur while building or mutating application modules
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Module path does not exist: {path}")]
    NotFound { path: String },

    #[error("Module specified is not a known and/or valid application module: {name}")]
    Unclassifiable { name: String },

    #[error("Unable to read module: {name}")]
    NotReadable { name: String },

    #[error("Unable to write module: {name}")]
    NotWritable { name: String },

    #[error("Ear module should contain at least one application module: {path}")]
    EmptyEar { path: String },

    #[error("IO error in module {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest in module {name}: {source}")]
    Manifest {
        name: String,
        #[source]
        source: ManifestError,
    },

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl ModuleError {
    /// Conditions that mean the ear cannot be processed at all
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ModuleError::NotFound { .. }
                | ModuleError::NotReadable { .. }
                | ModuleError::NotWritable { .. }
                | ModuleError::EmptyEar { .. }
        )
    }

    /// Conditions under which a child entry is skipped rather than failing the scan
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ModuleError::Unclassifiable { .. }
                | ModuleError::NotReadable { .. }
                | ModuleError::NotWritable { .. }
                | ModuleError::Vfs(VfsError::NotAnArchive { .. })
                | ModuleError::Vfs(VfsError::Zip { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, ModuleError>;
