use thiserror::Error;

use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::module::ModuleError;
use crate::vfs::VfsError;

/// How the caller should treat a failed run.
///
/// Warning-class failures are precondition violations detected before the
/// bundle is touched; the caller decides whether they break the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

/// Errors that can occur while enhancing an enterprise archive
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("No target module bound to the enhancer")]
    NoTarget,

    #[error("Ear not found: {path}")]
    EarNotFound { path: String },

    #[error("Missing read / write permissions to ear target: {path}")]
    Permissions { path: String },

    #[error("Shared module not found: {name}")]
    SharedModuleNotFound { name: String },

    #[error("Library {library} has no copy in module {module}")]
    MissingLibrary { library: String, module: String },

    #[error("Failed to write manifest for {module}: {source}")]
    ManifestPersist {
        module: String,
        #[source]
        source: ModuleError,
    },

    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Filesystem error: {0}")]
    Vfs(#[from] VfsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Archive filesystem failed to sync cleanly: {source}")]
    SyncFailed {
        #[source]
        source: VfsError,
    },
}

impl LayoutError {
    pub fn severity(&self) -> Severity {
        match self {
            LayoutError::NoTarget
            | LayoutError::EarNotFound { .. }
            | LayoutError::Permissions { .. }
            | LayoutError::SharedModuleNotFound { .. } => Severity::Warning,
            LayoutError::Module(err) if err.is_precondition() => Severity::Warning,
            _ => Severity::Fatal,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
