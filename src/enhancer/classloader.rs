use tracing::info;

use super::{EnhanceContext, LayoutOutcome, ModuleEnhancer};
use crate::descriptor::WeblogicApplicationXml;
use crate::error::Result;

/// Runs a relocation step, then rewrites the WebLogic classloader structure
/// when that step used a communal module
pub struct ClassloaderStructureEnhancer {
    inner: Box<dyn ModuleEnhancer>,
}

impl ClassloaderStructureEnhancer {
    pub fn new(inner: Box<dyn ModuleEnhancer>) -> Self {
        Self { inner }
    }
}

impl ModuleEnhancer for ClassloaderStructureEnhancer {
    fn name(&self) -> &'static str {
        "classloader-structure"
    }

    fn enhance(&self, ctx: &mut EnhanceContext<'_>) -> Result<LayoutOutcome> {
        let outcome = self.inner.enhance(ctx)?;

        let LayoutOutcome::Communal { shared_module } = &outcome else {
            info!("Ignored classloader-structure generation -- keeping standard (non-communal) WAR layout");
            return Ok(outcome);
        };

        let ear = ctx.target()?;
        info!("Enhancing EAR with modified Weblogic classloader-structure...");
        let mut descriptor = WeblogicApplicationXml::load(ear.module())?;
        let summary = descriptor.setup_communal(shared_module, ear)?;
        if ctx.dry_run {
            info!("Dry run: weblogic-application.xml not written");
        } else {
            descriptor.persist(ear.module())?;
        }
        ctx.report.classloader_structure = Some(summary);
        info!("Finished classloader-structure generation.");

        Ok(outcome)
    }
}
