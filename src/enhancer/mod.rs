//! Enhancer steps and the runner that drives them over one ear

pub mod chain;
pub mod classloader;
pub mod report;
pub mod runner;
pub mod skinny;

pub use chain::EnhancerChain;
pub use classloader::ClassloaderStructureEnhancer;
pub use report::{LayoutReport, ModuleSummary};
pub use runner::{EarLayoutEnhancer, RunStatus};
pub use skinny::SkinnyWarEnhancer;

use serde::Serialize;

use crate::error::{LayoutError, Result};
use crate::module::EarModule;

/// Which layout a relocation step produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum LayoutOutcome {
    /// Shared libraries went into the ear's own library folder
    Standard,
    /// Shared libraries went into an explicitly named module
    Communal { shared_module: String },
}

impl LayoutOutcome {
    pub fn shared_module(&self) -> Option<&str> {
        match self {
            LayoutOutcome::Standard => None,
            LayoutOutcome::Communal { shared_module } => Some(shared_module),
        }
    }
}

/// State shared by the steps of one run
pub struct EnhanceContext<'a> {
    target: Option<&'a EarModule>,
    pub report: &'a mut LayoutReport,
    pub dry_run: bool,
}

impl<'a> EnhanceContext<'a> {
    pub fn new(target: Option<&'a EarModule>, report: &'a mut LayoutReport, dry_run: bool) -> Self {
        Self {
            target,
            report,
            dry_run,
        }
    }

    /// The ear being enhanced
    pub fn target(&self) -> Result<&'a EarModule> {
        self.target.ok_or(LayoutError::NoTarget)
    }
}

/// One step of an enhancement run
pub trait ModuleEnhancer {
    /// Step name used in logs
    fn name(&self) -> &'static str;

    fn enhance(&self, ctx: &mut EnhanceContext<'_>) -> Result<LayoutOutcome>;
}
