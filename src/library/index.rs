use std::collections::BTreeMap;

use crate::module::{ApplicationModule, EarModule, Result};

/// Library file name to every module currently holding a copy.
///
/// Holders are listed with the ear first and then the modules in name order.
/// The index is rebuilt for every run and never persisted.
#[derive(Debug, Default)]
pub struct LibraryIndex<'a> {
    entries: BTreeMap<String, Vec<&'a ApplicationModule>>,
}

impl<'a> LibraryIndex<'a> {
    pub fn build(ear: &'a EarModule) -> Result<Self> {
        let mut index = Self::default();
        for module in ear.all_modules() {
            index.merge(module)?;
        }
        Ok(index)
    }

    fn merge(&mut self, module: &'a ApplicationModule) -> Result<()> {
        for library in module.library_names()? {
            self.entries.entry(library).or_default().push(module);
        }
        Ok(())
    }

    pub fn holders(&self, library: &str) -> &[&'a ApplicationModule] {
        self.entries
            .get(library)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a ApplicationModule])> {
        self.entries
            .iter()
            .map(|(library, holders)| (library.as_str(), holders.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Libraries held by more than one module
    pub fn duplicates(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, holders)| holders.len() > 1)
            .map(|(library, _)| library.as_str())
    }
}
