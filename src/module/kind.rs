use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of deployable unit inside an enterprise archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Ear,
    Web,
    Ejb,
    ResourceAdapter,
}

impl ModuleKind {
    /// Library folder used when the build configuration does not override it
    pub fn default_library_dir(self) -> &'static str {
        match self {
            ModuleKind::Ear => "lib",
            ModuleKind::Web => "WEB-INF/lib",
            ModuleKind::Ejb | ModuleKind::ResourceAdapter => "",
        }
    }

    pub fn is_ejb(self) -> bool {
        self == ModuleKind::Ejb
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModuleKind::Ear => "ear",
            ModuleKind::Web => "web",
            ModuleKind::Ejb => "ejb",
            ModuleKind::ResourceAdapter => "rar",
        };
        f.write_str(label)
    }
}
