use serde::Serialize;

/// Where one library ends up after relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum LibraryDecision {
    /// Matches a pinned filter; every copy stays where it is
    Pinned { holders: Vec<String> },
    /// Matches a forced filter; one copy in the ear library folder, none elsewhere
    Forced {
        source: String,
        remove_from: Vec<String>,
        already_in_ear: bool,
    },
    /// Duplicated; consolidated into the shared module
    Shared {
        target: String,
        /// Module the copy is taken from, absent when the target already holds one
        source: Option<String>,
        remove_from: Vec<String>,
    },
    /// Held by a single module and left in place
    Individual { holder: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryAction {
    pub library: String,
    #[serde(flatten)]
    pub decision: LibraryDecision,
    /// Duplicate copies did not all have the same content
    pub divergent: bool,
}

impl LibraryAction {
    /// Number of file copies and deletions needed to apply this action
    pub fn operations(&self) -> usize {
        match &self.decision {
            LibraryDecision::Pinned { .. } | LibraryDecision::Individual { .. } => 0,
            LibraryDecision::Forced {
                remove_from,
                already_in_ear,
                ..
            } => remove_from.len() + usize::from(!already_in_ear),
            LibraryDecision::Shared {
                source,
                remove_from,
                ..
            } => remove_from.len() + usize::from(source.is_some()),
        }
    }
}

/// Decisions for every library in the ear, in library name order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationPlan {
    pub shared_module: String,
    pub actions: Vec<LibraryAction>,
}

impl RelocationPlan {
    pub fn operations(&self) -> usize {
        self.actions.iter().map(LibraryAction::operations).sum()
    }

    /// True when applying the plan would not touch the filesystem
    pub fn is_noop(&self) -> bool {
        self.operations() == 0
    }

    pub fn action(&self, library: &str) -> Option<&LibraryAction> {
        self.actions.iter().find(|action| action.library == library)
    }
}
