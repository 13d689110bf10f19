use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::{ModuleError, Result};
use super::kind::ModuleKind;
use super::manifest::{Manifest, MANIFEST_PATH};
use crate::vfs::MirroredTree;

const LIBRARY_EXTENSION: &str = "jar";

/// One deployable unit: a web, EJB or resource-adapter module, or the ear itself
#[derive(Debug, Clone)]
pub struct ApplicationModule {
    name: String,
    kind: ModuleKind,
    tree: MirroredTree,
    library_dir: PathBuf,
    /// Location relative to the ear root, empty for the ear
    location: PathBuf,
}

impl ApplicationModule {
    pub fn new(
        name: impl Into<String>,
        kind: ModuleKind,
        tree: MirroredTree,
        library_dir: impl Into<PathBuf>,
        location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            tree,
            library_dir: library_dir.into(),
            location: location.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn tree(&self) -> &MirroredTree {
        &self.tree
    }

    pub fn root(&self) -> &Path {
        self.tree.primary()
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    pub fn library_path(&self) -> PathBuf {
        self.root().join(&self.library_dir)
    }

    pub fn can_read(&self) -> bool {
        self.tree.can_read()
    }

    pub fn can_write(&self) -> bool {
        self.tree.can_write()
    }

    /// Library archives currently in the library folder, sorted by name.
    ///
    /// Always reads the underlying tree, so the result reflects every earlier
    /// add or remove.
    pub fn library_files(&self) -> Result<Vec<PathBuf>> {
        let entries = self.tree.list(&self.library_dir)?;
        Ok(entries
            .into_iter()
            .filter(|path| path.is_file() && is_library(path))
            .collect())
    }

    pub fn library_names(&self) -> Result<Vec<String>> {
        Ok(self
            .library_files()?
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect())
    }

    pub fn library_file(&self, library: &str) -> PathBuf {
        self.library_path().join(library)
    }

    pub fn has_library(&self, library: &str) -> bool {
        self.library_file(library).is_file()
    }

    /// Copies a library archive into this module's library folder
    pub fn add_library(&self, source: &Path) -> Result<()> {
        debug!("{}: adding {}", self.name, source.display());
        self.tree.copy_file(source, &self.library_dir)?;
        Ok(())
    }

    pub fn remove_library(&self, library: &str) -> Result<()> {
        debug!("{}: removing {}", self.name, library);
        self.tree.remove(&self.library_dir.join(library))?;
        Ok(())
    }

    /// Path of a library relative to the ear root, `/` separated
    pub fn relative_library_path(&self, library: &str) -> String {
        self.location
            .join(&self.library_dir)
            .join(library)
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Current manifest, or a fresh one when the module has none
    pub fn manifest(&self) -> Result<Manifest> {
        match self.tree.read(Path::new(MANIFEST_PATH))? {
            Some(bytes) => Manifest::parse(&bytes).map_err(|source| ModuleError::Manifest {
                name: self.name.clone(),
                source,
            }),
            None => Ok(Manifest::new()),
        }
    }

    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        self.tree
            .write(Path::new(MANIFEST_PATH), &manifest.to_bytes())?;
        Ok(())
    }
}

impl PartialEq for ApplicationModule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for ApplicationModule {}

fn is_library(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LIBRARY_EXTENSION))
}
