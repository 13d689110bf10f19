use tracing::{debug, info};

use super::{EnhanceContext, LayoutOutcome, ModuleEnhancer};
use crate::error::Result;
use crate::library::{LibraryFilter, RelocationEngine};

pub const MSG_STANDARD_LAYOUT: &str = "Enhancing EAR with Standard Skinny WAR layout";
pub const MSG_COMMUNAL_LAYOUT: &str = "Enhancing EAR with Communal Skinny WAR layout";
pub const MSG_FINISHED: &str = "Finished Layout";

/// Consolidates duplicated libraries into the ear or a communal module
#[derive(Debug, Clone, Default)]
pub struct SkinnyWarEnhancer {
    communal: Option<String>,
    pinned: Vec<LibraryFilter>,
    forced: Vec<LibraryFilter>,
    add_to_manifest_classpath: bool,
    strict: bool,
}

impl SkinnyWarEnhancer {
    /// Shared libraries go into the ear's own library folder
    pub fn standard() -> Self {
        Self::default()
    }

    /// Shared libraries go into the named module
    pub fn communal(module: impl Into<String>) -> Self {
        Self {
            communal: Some(module.into()),
            ..Self::default()
        }
    }

    pub fn with_pinned(mut self, filters: Vec<LibraryFilter>) -> Self {
        self.pinned = filters;
        self
    }

    pub fn with_forced(mut self, filters: Vec<LibraryFilter>) -> Self {
        self.forced = filters;
        self
    }

    pub fn with_manifest_classpath(mut self, enabled: bool) -> Self {
        self.add_to_manifest_classpath = enabled;
        self
    }

    /// A manifest that cannot be written fails the step
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn communal_module(&self) -> Option<&str> {
        self.communal.as_deref()
    }
}

impl ModuleEnhancer for SkinnyWarEnhancer {
    fn name(&self) -> &'static str {
        "skinny-war"
    }

    fn enhance(&self, ctx: &mut EnhanceContext<'_>) -> Result<LayoutOutcome> {
        let ear = ctx.target()?;
        info!(
            "{}",
            if self.communal.is_some() {
                MSG_COMMUNAL_LAYOUT
            } else {
                MSG_STANDARD_LAYOUT
            }
        );

        let engine = RelocationEngine::new(ear, &self.pinned, &self.forced);
        let shared = engine.resolve_shared(self.communal.as_deref())?;
        let plan = engine.plan(shared)?;

        let operations = if ctx.dry_run {
            info!("Dry run: {} file operations planned", plan.operations());
            plan.operations()
        } else {
            engine.apply(&plan)?
        };
        ctx.report.record_plan(plan, operations);

        if self.add_to_manifest_classpath {
            if ctx.dry_run {
                debug!("Dry run: manifests left unchanged");
            } else {
                ctx.report.manifests = engine.rewrite_manifests(shared, self.strict)?;
            }
        }

        info!("{MSG_FINISHED}");
        Ok(match &self.communal {
            Some(module) => LayoutOutcome::Communal {
                shared_module: module.clone(),
            },
            None => LayoutOutcome::Standard,
        })
    }
}
