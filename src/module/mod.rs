//! Application module model
//!
//! An [`EarModule`] is scanned once at the start of a run and owns the map of
//! the web, EJB and resource-adapter modules it contains.

pub mod application;
pub mod ear;
pub mod error;
pub mod kind;
pub mod manifest;
pub mod provider;

pub use application::ApplicationModule;
pub use ear::{EarModule, ScanOptions};
pub use error::{ModuleError, Result};
pub use kind::ModuleKind;
pub use manifest::{Manifest, ManifestError};
pub use provider::ModuleProvider;
