//! Temporary workspace for layout tests

use skinny_ear::module::{EarModule, ScanOptions};
use skinny_ear::vfs::ArchiveVfs;
use skinny_ear::{LayoutConfig, LibraryDirs};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::builders::EarBuilder;

/// A scanned ear together with the mount table that backs it
pub struct OpenEar {
    pub ear: EarModule,
    pub vfs: ArchiveVfs,
}

impl OpenEar {
    pub fn sync(self) -> usize {
        self.vfs.sync().unwrap()
    }
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub library_dirs: LibraryDirs,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            library_dirs: LibraryDirs::default(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn build(&self, builder: &EarBuilder) -> PathBuf {
        builder.build(self.path())
    }

    /// Configuration targeting `ear` with every other field at its default
    pub fn config(&self, ear: &Path) -> LayoutConfig {
        LayoutConfig {
            ear: Some(ear.to_path_buf()),
            ..Default::default()
        }
    }

    pub fn open(&self, ear: &Path) -> OpenEar {
        self.open_with_mirror(ear, None)
    }

    pub fn open_with_mirror(&self, ear: &Path, mirror: Option<&Path>) -> OpenEar {
        let mut vfs = ArchiveVfs::new().unwrap();
        let ear = EarModule::scan(
            &mut vfs,
            &ScanOptions {
                ear,
                mirror,
                library_dirs: &self.library_dirs,
            },
        )
        .unwrap();
        OpenEar { ear, vfs }
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
