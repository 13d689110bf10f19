use std::path::Path;
use thiserror::Error;

/// Errors raised by the archive filesystem
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP error on {path}: {source}")]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Walk error on {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("{path} is neither a directory nor a supported archive")]
    NotAnArchive { path: String },

    #[error("{path} is not inside {root}")]
    OutsideTree { path: String, root: String },

    #[error("Path error: {0}")]
    Path(String),
}

impl VfsError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> VfsError + '_ {
        move |source| VfsError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn zip(path: &Path) -> impl FnOnce(zip::result::ZipError) -> VfsError + '_ {
        move |source| VfsError::Zip {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VfsError>;
