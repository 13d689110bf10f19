//! Module kind detection by path inspection

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use super::application::ApplicationModule;
use super::error::{ModuleError, Result};
use super::kind::ModuleKind;
use crate::config::LibraryDirs;
use crate::vfs::{is_archive_name, ArchiveVfs, MirroredTree};

const WEB_METADATA: &str = "WEB-INF";

/// Builds typed application modules from entries of an ear
#[derive(Debug, Clone, Default)]
pub struct ModuleProvider {
    library_dirs: LibraryDirs,
}

impl ModuleProvider {
    pub fn new(library_dirs: LibraryDirs) -> Self {
        Self { library_dirs }
    }

    pub fn library_dirs(&self) -> &LibraryDirs {
        &self.library_dirs
    }

    /// Classifies `path`: a `WEB-INF` folder marks a web module, otherwise the
    /// extension decides
    pub fn detect(&self, path: &Path) -> Result<ModuleKind> {
        if has_web_metadata(path) {
            debug!("Web module detected: {}", display_name(path));
            return Ok(ModuleKind::Web);
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("rar") => {
                debug!("Rar module detected: {}", display_name(path));
                Ok(ModuleKind::ResourceAdapter)
            }
            Some("jar") => {
                debug!("Ejb module detected: {}", display_name(path));
                Ok(ModuleKind::Ejb)
            }
            _ => Err(ModuleError::Unclassifiable {
                name: display_name(path),
            }),
        }
    }

    /// Builds the module for one ear entry, mounting it when packed.
    ///
    /// `mirror` is the matching entry of the ear's unpacked mirror, if any.
    pub fn build(
        &self,
        vfs: &mut ArchiveVfs,
        entry: &Path,
        mirror: Option<&Path>,
    ) -> Result<ApplicationModule> {
        let name = display_name(entry);
        if !entry.exists() {
            return Err(ModuleError::NotFound {
                path: entry.display().to_string(),
            });
        }

        let kind = self.detect(entry)?;
        let root = vfs.resolve(entry)?;
        let mirror = match mirror {
            Some(path) if path.exists() => Some(vfs.resolve(path)?),
            _ => None,
        };

        let module = ApplicationModule::new(
            name.clone(),
            kind,
            MirroredTree::new(root, mirror),
            self.library_dirs.for_kind(kind),
            PathBuf::from(&name),
        );

        if !module.can_read() {
            return Err(ModuleError::NotReadable { name });
        }
        if !module.can_write() {
            return Err(ModuleError::NotWritable { name });
        }
        Ok(module)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Looks for `WEB-INF` without mounting packed archives
fn has_web_metadata(path: &Path) -> bool {
    if path.is_dir() {
        return path.join(WEB_METADATA).is_dir();
    }
    if !path.is_file() || !is_archive_name(path) {
        return false;
    }

    let Ok(file) = File::open(path) else {
        return false;
    };
    let Ok(archive) = ZipArchive::new(BufReader::new(file)) else {
        return false;
    };
    let prefix = format!("{WEB_METADATA}/");
    let found = archive.file_names().any(|name| name.starts_with(&prefix));
    found
}
