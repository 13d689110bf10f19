use serde::Serialize;

use super::LayoutOutcome;
use crate::descriptor::ReconcileSummary;
use crate::library::{LibraryAction, LibraryDecision, ManifestUpdate, RelocationPlan};
use crate::module::{EarModule, ModuleKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub kind: ModuleKind,
}

/// Summary of one layout run
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutReport {
    pub ear: String,
    #[serde(flatten)]
    pub layout: Option<LayoutOutcome>,
    pub modules: Vec<ModuleSummary>,
    pub libraries: Vec<LibraryAction>,
    /// File copies and deletions made, or planned on a dry run
    pub operations: usize,
    pub manifests: Vec<ManifestUpdate>,
    pub classloader_structure: Option<ReconcileSummary>,
    /// Archives written back at the end of the run
    pub repacked: usize,
    pub dry_run: bool,
}

impl LayoutReport {
    pub fn new(ear: &EarModule, dry_run: bool) -> Self {
        Self {
            ear: ear.name().to_string(),
            modules: ear
                .modules()
                .values()
                .map(|module| ModuleSummary {
                    name: module.name().to_string(),
                    kind: module.kind(),
                })
                .collect(),
            dry_run,
            ..Default::default()
        }
    }

    pub fn record_plan(&mut self, plan: RelocationPlan, operations: usize) {
        self.libraries = plan.actions;
        self.operations = operations;
    }

    pub fn shared_module(&self) -> Option<&str> {
        self.layout.as_ref().and_then(LayoutOutcome::shared_module)
    }

    pub fn pinned(&self) -> usize {
        self.count(|d| matches!(d, LibraryDecision::Pinned { .. }))
    }

    pub fn forced(&self) -> usize {
        self.count(|d| matches!(d, LibraryDecision::Forced { .. }))
    }

    pub fn shared(&self) -> usize {
        self.count(|d| matches!(d, LibraryDecision::Shared { .. }))
    }

    pub fn individual(&self) -> usize {
        self.count(|d| matches!(d, LibraryDecision::Individual { .. }))
    }

    pub fn divergent(&self) -> impl Iterator<Item = &LibraryAction> {
        self.libraries.iter().filter(|action| action.divergent)
    }

    fn count(&self, matches: impl Fn(&LibraryDecision) -> bool) -> usize {
        self.libraries
            .iter()
            .filter(|action| matches(&action.decision))
            .count()
    }
}
