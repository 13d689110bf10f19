//! Archive-aware filesystem used during a layout run
//!
//! Packed archives are mounted into a private staging area so every module can
//! be treated as a plain directory tree. All changes are written back in one
//! step by [`ArchiveVfs::sync`] at the end of the run.

pub mod archive;
pub mod error;
pub mod mirror;

pub use archive::{is_archive_name, ArchiveVfs};
pub use error::{Result, VfsError};
pub use mirror::MirroredTree;

use std::path::Path;

/// True when the path exists and can be listed or opened
pub fn can_read(path: &Path) -> bool {
    if path.is_dir() {
        std::fs::read_dir(path).is_ok()
    } else {
        std::fs::File::open(path).is_ok()
    }
}

/// True when the path exists and is not marked read-only
pub fn can_write(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|metadata| !metadata.permissions().readonly())
        .unwrap_or(false)
}
