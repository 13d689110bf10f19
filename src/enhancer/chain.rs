use tracing::debug;

use super::classloader::ClassloaderStructureEnhancer;
use super::skinny::SkinnyWarEnhancer;
use super::{EnhanceContext, LayoutOutcome, ModuleEnhancer};
use crate::config::LayoutConfig;
use crate::error::Result;

/// Ordered enhancer steps run against one ear
#[derive(Default)]
pub struct EnhancerChain {
    steps: Vec<Box<dyn ModuleEnhancer>>,
}

impl EnhancerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relocation, wrapped by classloader-structure generation when enabled
    pub fn from_config(config: &LayoutConfig) -> Self {
        let skinny = match config.communal_module() {
            Some(module) => SkinnyWarEnhancer::communal(module),
            None => SkinnyWarEnhancer::standard(),
        }
        .with_pinned(config.pinned_libraries.clone())
        .with_forced(config.forced_libraries())
        .with_manifest_classpath(config.add_to_manifest_classpath)
        .with_strict(config.strict);

        let step: Box<dyn ModuleEnhancer> = if config.generate_classloader_structure {
            Box::new(ClassloaderStructureEnhancer::new(Box::new(skinny)))
        } else {
            Box::new(skinny)
        };
        Self::new().with(step)
    }

    pub fn with(mut self, step: Box<dyn ModuleEnhancer>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order and returns the outcome of the last one
    pub fn enhance(&self, ctx: &mut EnhanceContext<'_>) -> Result<LayoutOutcome> {
        ctx.target()?;
        let mut outcome = LayoutOutcome::Standard;
        for step in &self.steps {
            debug!("Running enhancer step: {}", step.name());
            outcome = step.enhance(ctx)?;
        }
        Ok(outcome)
    }
}
