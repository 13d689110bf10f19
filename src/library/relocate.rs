//! Moves duplicated libraries to their shared location

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::digest;
use super::filter::{any_match, LibraryFilter};
use super::index::LibraryIndex;
use super::plan::{LibraryAction, LibraryDecision, RelocationPlan};
use crate::error::{LayoutError, Result};
use crate::module::manifest::CLASS_PATH;
use crate::module::{ApplicationModule, EarModule, ModuleError};

pub const MSG_PINNED: &str = "pinned: ";
pub const MSG_EAR_LIBRARY: &str = "ear library: ";
pub const MSG_SKINNY: &str = " * skinny: ";
pub const MSG_INDIVIDUAL: &str = "individual: ";

/// Result of rewriting one module's manifest class path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestUpdate {
    pub module: String,
    pub class_path: Vec<String>,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct RelocationEngine<'a> {
    ear: &'a EarModule,
    pinned: &'a [LibraryFilter],
    forced: &'a [LibraryFilter],
}

impl<'a> RelocationEngine<'a> {
    pub fn new(ear: &'a EarModule, pinned: &'a [LibraryFilter], forced: &'a [LibraryFilter]) -> Self {
        Self { ear, pinned, forced }
    }

    /// The named module, or the ear itself when no name is given
    pub fn resolve_shared(&self, name: Option<&str>) -> Result<&'a ApplicationModule> {
        match name {
            None => Ok(self.ear.module()),
            Some(name) => self
                .ear
                .module_named(name)
                .ok_or_else(|| LayoutError::SharedModuleNotFound {
                    name: name.to_string(),
                }),
        }
    }

    /// Classifies every library without touching the filesystem.
    ///
    /// Pinned filters are checked before forced filters, and both before the
    /// copy count.
    pub fn plan(&self, shared: &ApplicationModule) -> Result<RelocationPlan> {
        let index = LibraryIndex::build(self.ear)?;
        let ear_name = self.ear.name();
        let mut actions = Vec::with_capacity(index.len());

        for (library, holders) in index.iter() {
            let names: Vec<String> = holders.iter().map(|m| m.name().to_string()).collect();

            let decision = if any_match(self.pinned, library) {
                for holder in &names {
                    debug!("{MSG_PINNED}{library} [{holder}]");
                }
                LibraryDecision::Pinned { holders: names }
            } else if any_match(self.forced, library) {
                debug!("{MSG_EAR_LIBRARY}{library}");
                let already_in_ear = holders.iter().any(|m| m.name() == ear_name);
                LibraryDecision::Forced {
                    source: names[0].clone(),
                    remove_from: names.iter().filter(|n| *n != ear_name).cloned().collect(),
                    already_in_ear,
                }
            } else if holders.len() > 1 {
                debug!("{MSG_SKINNY}{library}");
                let in_shared = holders.iter().any(|m| *m == shared);
                LibraryDecision::Shared {
                    target: shared.name().to_string(),
                    source: (!in_shared).then(|| names[0].clone()),
                    remove_from: names.iter().filter(|n| *n != shared.name()).cloned().collect(),
                }
            } else {
                debug!("{MSG_INDIVIDUAL}{library} [{}]", names[0]);
                LibraryDecision::Individual {
                    holder: names[0].clone(),
                }
            };

            let divergent = holders.len() > 1 && self.divergent(library, holders)?;
            actions.push(LibraryAction {
                library: library.to_string(),
                decision,
                divergent,
            });
        }

        Ok(RelocationPlan {
            shared_module: shared.name().to_string(),
            actions,
        })
    }

    fn divergent(&self, library: &str, holders: &[&ApplicationModule]) -> Result<bool> {
        let paths: Vec<PathBuf> = holders.iter().map(|m| m.library_file(library)).collect();
        let differ = digest::differ(paths.iter().map(PathBuf::as_path)).map_err(|source| {
            ModuleError::Io {
                name: library.to_string(),
                source,
            }
        })?;
        if differ {
            let names: Vec<&str> = holders.iter().map(|m| m.name()).collect();
            warn!("Copies of {library} differ in content across {}", names.join(", "));
        }
        Ok(differ)
    }

    /// Performs the copies and deletions of a plan, returning how many were made
    pub fn apply(&self, plan: &RelocationPlan) -> Result<usize> {
        let mut operations = 0;
        for action in &plan.actions {
            let library = action.library.as_str();
            match &action.decision {
                LibraryDecision::Pinned { .. } | LibraryDecision::Individual { .. } => {}
                LibraryDecision::Forced {
                    source,
                    remove_from,
                    already_in_ear,
                } => {
                    if !already_in_ear {
                        let file = self.library_source(source, library)?;
                        self.ear.module().add_library(&file)?;
                        operations += 1;
                    }
                    operations += self.remove_all(library, remove_from)?;
                }
                LibraryDecision::Shared {
                    target,
                    source,
                    remove_from,
                } => {
                    if let Some(source) = source {
                        let file = self.library_source(source, library)?;
                        self.module(target)?.add_library(&file)?;
                        operations += 1;
                    }
                    operations += self.remove_all(library, remove_from)?;
                }
            }
        }
        Ok(operations)
    }

    fn module(&self, name: &str) -> Result<&'a ApplicationModule> {
        if name == self.ear.name() {
            return Ok(self.ear.module());
        }
        self.resolve_shared(Some(name))
    }

    fn library_source(&self, module: &str, library: &str) -> Result<PathBuf> {
        let file = self.module(module)?.library_file(library);
        if !file.is_file() {
            return Err(LayoutError::MissingLibrary {
                library: library.to_string(),
                module: module.to_string(),
            });
        }
        Ok(file)
    }

    fn remove_all(&self, library: &str, modules: &[String]) -> Result<usize> {
        for name in modules {
            self.module(name)?.remove_library(library)?;
        }
        Ok(modules.len())
    }

    /// Prepends the shared module's libraries to every module's `Class-Path`.
    ///
    /// Tokens already present are moved rather than duplicated, so a second
    /// pass leaves every manifest unchanged. A manifest that fails to persist
    /// is logged and skipped unless `strict` is set.
    pub fn rewrite_manifests(
        &self,
        shared: &ApplicationModule,
        strict: bool,
    ) -> Result<Vec<ManifestUpdate>> {
        let shared_paths: Vec<String> = shared
            .library_names()?
            .iter()
            .map(|library| shared.relative_library_path(library))
            .collect();

        let mut updates = Vec::new();
        for module in self.ear.modules().values() {
            info!("Updating module manifest: {}", module.name());
            match rewrite_manifest(module, &shared_paths) {
                Ok(update) => updates.push(update),
                Err(source) if strict => {
                    return Err(LayoutError::ManifestPersist {
                        module: module.name().to_string(),
                        source,
                    })
                }
                Err(err) => {
                    warn!("Failed to write manifest for {}: {err}", module.name());
                    updates.push(ManifestUpdate {
                        module: module.name().to_string(),
                        class_path: Vec::new(),
                        persisted: false,
                        error: Some(err.to_string()),
                    });
                }
            }
        }
        Ok(updates)
    }
}

fn rewrite_manifest(
    module: &ApplicationModule,
    shared_paths: &[String],
) -> std::result::Result<ManifestUpdate, ModuleError> {
    let mut manifest = module.manifest()?;
    let existing = manifest.class_path();

    let mut class_path = shared_paths.to_vec();
    class_path.extend(
        existing
            .iter()
            .filter(|token| !shared_paths.contains(token))
            .cloned(),
    );

    let untouched = class_path == existing
        && (manifest.get(CLASS_PATH).is_some() || class_path.is_empty());
    if !untouched {
        manifest.set_class_path(&class_path);
        module.save_manifest(&manifest)?;
    }

    Ok(ManifestUpdate {
        module: module.name().to_string(),
        class_path,
        persisted: !untouched,
        error: None,
    })
}
