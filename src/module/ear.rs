use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::application::ApplicationModule;
use super::error::{ModuleError, Result};
use super::kind::ModuleKind;
use super::provider::ModuleProvider;
use crate::config::LibraryDirs;
use crate::vfs::{ArchiveVfs, MirroredTree};

const EAR_METADATA: [&str; 2] = ["app-inf", "meta-inf"];
const UNPACKED: &str = " <unpacked>";

/// Inputs to an ear scan
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    pub ear: &'a Path,
    pub mirror: Option<&'a Path>,
    pub library_dirs: &'a LibraryDirs,
}

/// The aggregate module and every application module found inside it
#[derive(Debug, Clone)]
pub struct EarModule {
    module: ApplicationModule,
    modules: BTreeMap<String, ApplicationModule>,
}

impl EarModule {
    /// Scans the immediate children of the ear once and builds the module map.
    ///
    /// Packed files are visited before unpacked folders. Entries that cannot
    /// be classified are skipped with a warning.
    pub fn scan(vfs: &mut ArchiveVfs, options: &ScanOptions<'_>) -> Result<Self> {
        if !options.ear.exists() {
            return Err(ModuleError::NotFound {
                path: options.ear.display().to_string(),
            });
        }

        let name = options
            .ear
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| options.ear.display().to_string());
        let root = vfs.resolve(options.ear)?;
        let mirror = match options.mirror {
            Some(path) if path.exists() => Some(vfs.resolve(path)?),
            Some(path) => {
                debug!("Mirror {} does not exist, ignoring", path.display());
                None
            }
            None => None,
        };

        let module = ApplicationModule::new(
            name.clone(),
            ModuleKind::Ear,
            MirroredTree::new(root, mirror),
            options.library_dirs.ear.as_str(),
            PathBuf::new(),
        );
        if !module.can_read() {
            return Err(ModuleError::NotReadable { name });
        }
        if !module.can_write() {
            return Err(ModuleError::NotWritable { name });
        }

        let library_folder = Path::new(&options.library_dirs.ear)
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase());
        let (files, folders): (Vec<PathBuf>, Vec<PathBuf>) = module
            .tree()
            .list(Path::new(""))?
            .into_iter()
            .filter(|entry| !is_ear_metadata(entry, library_folder.as_deref()))
            .partition(|entry| !entry.is_dir());

        if files.is_empty() && folders.is_empty() {
            return Err(ModuleError::EmptyEar {
                path: options.ear.display().to_string(),
            });
        }

        let provider = ModuleProvider::new(options.library_dirs.clone());
        let mut modules = BTreeMap::new();
        for (entries, unpacked) in [(files, false), (folders, true)] {
            for entry in entries {
                let mirror_entry = module
                    .tree()
                    .mirror()
                    .zip(entry.file_name())
                    .map(|(mirror, file_name)| mirror.join(file_name));

                match provider.build(vfs, &entry, mirror_entry.as_deref()) {
                    Ok(child) => {
                        info!(
                            "Found module: {}{}",
                            child.name(),
                            if unpacked { UNPACKED } else { "" }
                        );
                        modules.insert(child.name().to_string(), child);
                    }
                    Err(err) if err.is_skippable() => {
                        debug!("{err}");
                        warn!(
                            "Skipping ear entry: {}",
                            entry
                                .file_name()
                                .map(|name| name.to_string_lossy().to_string())
                                .unwrap_or_default()
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        if modules.is_empty() {
            return Err(ModuleError::EmptyEar {
                path: options.ear.display().to_string(),
            });
        }

        Ok(Self { module, modules })
    }

    /// The ear acting as a module in its own right
    pub fn module(&self) -> &ApplicationModule {
        &self.module
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    pub fn modules(&self) -> &BTreeMap<String, ApplicationModule> {
        &self.modules
    }

    pub fn module_named(&self, name: &str) -> Option<&ApplicationModule> {
        self.modules.get(name)
    }

    /// The ear followed by its modules in name order
    pub fn all_modules(&self) -> impl Iterator<Item = &ApplicationModule> {
        std::iter::once(&self.module).chain(self.modules.values())
    }
}

/// Metadata folders and the ear's own library folder are never modules
fn is_ear_metadata(entry: &Path, library_folder: Option<&str>) -> bool {
    let Some(file_name) = entry.file_name() else {
        return true;
    };
    let file_name = file_name.to_string_lossy().to_lowercase();
    EAR_METADATA
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
        || library_folder.is_some_and(|lib| !lib.is_empty() && file_name.ends_with(lib))
}
