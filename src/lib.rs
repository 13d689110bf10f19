//! Skinny EAR - enterprise archive layout enhancer
//!
//! This crate rewrites the internal packaging of an enterprise archive so that
//! library files duplicated across its web, EJB and resource-adapter modules are
//! consolidated into one shared location, and optionally regenerates the
//! WebLogic classloader structure so the relocated libraries load in the right
//! parent/child order.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod enhancer;
pub mod error;
pub mod library;
pub mod module;
pub mod vfs;

pub use config::{LayoutConfig, LibraryDirs};
pub use enhancer::{EarLayoutEnhancer, EnhancerChain, LayoutOutcome, LayoutReport, RunStatus};
pub use error::{LayoutError, Result, Severity};
pub use library::LibraryFilter;
pub use module::{ApplicationModule, EarModule, ModuleKind};
