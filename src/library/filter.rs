//! Library name filters used to pin libraries in place or force them into the ear

use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicate over a library file name
///
/// Deserializes from `{ prefix: "..." }`, `{ exact: "..." }`, or a bare string
/// which is treated as a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FilterRepr", into = "FilterRepr")]
pub enum LibraryFilter {
    Prefix(String),
    Exact(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FilterRepr {
    Bare(String),
    Prefix { prefix: String },
    Exact { exact: String },
}

impl From<FilterRepr> for LibraryFilter {
    fn from(repr: FilterRepr) -> Self {
        match repr {
            FilterRepr::Bare(prefix) | FilterRepr::Prefix { prefix } => LibraryFilter::Prefix(prefix),
            FilterRepr::Exact { exact } => LibraryFilter::Exact(exact),
        }
    }
}

impl From<LibraryFilter> for FilterRepr {
    fn from(filter: LibraryFilter) -> Self {
        match filter {
            LibraryFilter::Prefix(prefix) => FilterRepr::Prefix { prefix },
            LibraryFilter::Exact(exact) => FilterRepr::Exact { exact },
        }
    }
}

impl LibraryFilter {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        LibraryFilter::Prefix(prefix.into())
    }

    pub fn exact(name: impl Into<String>) -> Self {
        LibraryFilter::Exact(name.into())
    }

    pub fn matches(&self, library_name: &str) -> bool {
        match self {
            LibraryFilter::Prefix(prefix) => library_name.starts_with(prefix.as_str()),
            LibraryFilter::Exact(name) => library_name == name,
        }
    }
}

impl fmt::Display for LibraryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryFilter::Prefix(prefix) => write!(f, "{prefix}*"),
            LibraryFilter::Exact(name) => write!(f, "{name}"),
        }
    }
}

/// True when any filter in the list matches
pub fn any_match(filters: &[LibraryFilter], library_name: &str) -> bool {
    !library_name.is_empty() && filters.iter().any(|filter| filter.matches(library_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY_NAME: &str = "testprefix-4.0.jar";

    #[test]
    fn test_prefix_match() {
        assert!(LibraryFilter::prefix("testprefix").matches(LIBRARY_NAME));
        assert!(!LibraryFilter::prefix("testprefix2").matches(LIBRARY_NAME));
    }

    #[test]
    fn test_exact_match() {
        assert!(LibraryFilter::exact(LIBRARY_NAME).matches(LIBRARY_NAME));
        assert!(!LibraryFilter::exact("testprefix").matches(LIBRARY_NAME));
    }

    #[test]
    fn test_any_match() {
        let filters = vec![LibraryFilter::prefix("spring-"), LibraryFilter::exact("a.jar")];
        assert!(any_match(&filters, "spring-core-5.3.jar"));
        assert!(any_match(&filters, "a.jar"));
        assert!(!any_match(&filters, "b.jar"));
        assert!(!any_match(&[], "a.jar"));
    }

    #[test]
    fn test_deserialize_forms() {
        let filters: Vec<LibraryFilter> =
            serde_yaml::from_str("- spring-\n- prefix: log4j\n- exact: a.jar\n").unwrap();
        assert_eq!(
            filters,
            vec![
                LibraryFilter::prefix("spring-"),
                LibraryFilter::prefix("log4j"),
                LibraryFilter::exact("a.jar"),
            ]
        );
    }
}
