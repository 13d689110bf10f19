//! Library classification and relocation
//!
//! Every library file name found in the ear is classified once per run into a
//! [`LibraryDecision`], and the resulting [`RelocationPlan`] is applied to the
//! module trees in a separate step.

pub mod digest;
pub mod filter;
pub mod index;
pub mod plan;
pub mod relocate;

pub use filter::{any_match, LibraryFilter};
pub use index::LibraryIndex;
pub use plan::{LibraryAction, LibraryDecision, RelocationPlan};
pub use relocate::{ManifestUpdate, RelocationEngine};
