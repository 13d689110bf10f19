//! Layout configuration
//!
//! Configuration is read from an optional YAML file and then overridden by
//! command line flags. Every field has a default so partial files are valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::library::LibraryFilter;
use crate::module::ModuleKind;

/// Library prefixes that must load from the ear classloader for load-time weaving
pub const ASPECTJ_LIBRARIES: [&str; 3] = ["aopalliance", "aspectjweaver", "aspectjrt"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Library folder of each module kind, relative to the module root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryDirs {
    pub ear: String,
    pub web: String,
    pub ejb: String,
    pub rar: String,
}

impl Default for LibraryDirs {
    fn default() -> Self {
        Self {
            ear: ModuleKind::Ear.default_library_dir().to_string(),
            web: ModuleKind::Web.default_library_dir().to_string(),
            ejb: ModuleKind::Ejb.default_library_dir().to_string(),
            rar: ModuleKind::ResourceAdapter.default_library_dir().to_string(),
        }
    }
}

impl LibraryDirs {
    pub fn for_kind(&self, kind: ModuleKind) -> &str {
        match kind {
            ModuleKind::Ear => &self.ear,
            ModuleKind::Web => &self.web,
            ModuleKind::Ejb => &self.ejb,
            ModuleKind::ResourceAdapter => &self.rar,
        }
    }
}

/// Full configuration surface of a layout run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Packed `.ear` file or exploded ear directory
    pub ear: Option<PathBuf>,
    /// Unpacked working copy of the ear kept in step with `ear`
    pub mirror: Option<PathBuf>,
    /// Module that receives the shared libraries; the ear itself when empty
    pub communal_module: Option<String>,
    pub pinned_libraries: Vec<LibraryFilter>,
    pub ear_libraries: Vec<LibraryFilter>,
    pub force_aspectj_to_ear: bool,
    pub add_to_manifest_classpath: bool,
    pub generate_classloader_structure: bool,
    /// Warning-class failures break the run instead of skipping it, and a
    /// manifest that cannot be written aborts the run
    pub strict: bool,
    pub dry_run: bool,
    pub library_dirs: LibraryDirs,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ear: None,
            mirror: None,
            communal_module: None,
            pinned_libraries: Vec::new(),
            ear_libraries: Vec::new(),
            force_aspectj_to_ear: true,
            add_to_manifest_classpath: false,
            generate_classloader_structure: true,
            strict: true,
            dry_run: false,
            library_dirs: LibraryDirs::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ear.is_none() {
            return Err(ConfigError::Invalid(
                "no ear path configured (pass EAR or set `ear`)".to_string(),
            ));
        }
        if let Some(name) = &self.communal_module {
            if name.contains('/') || name.contains('\\') {
                return Err(ConfigError::Invalid(format!(
                    "communal module must be a module name, not a path: {name}"
                )));
            }
        }
        Ok(())
    }

    /// Communal module name with blank values treated as absent
    pub fn communal_module(&self) -> Option<&str> {
        self.communal_module
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Configured ear libraries followed by the AspectJ prefixes when enabled
    pub fn forced_libraries(&self) -> Vec<LibraryFilter> {
        let mut filters = self.ear_libraries.clone();
        if self.force_aspectj_to_ear {
            filters.extend(ASPECTJ_LIBRARIES.iter().map(|p| LibraryFilter::prefix(*p)));
        }
        filters
    }
}
