//! WebLogic deployment descriptor handling
//!
//! `META-INF/weblogic-application.xml` is parsed into an index-addressed
//! [`XmlDocument`], its `classloader-structure` is reconciled so the shared
//! module becomes the top-level parent, and the result is written back to the
//! ear and its mirror.

pub mod application_xml;
pub mod classloader;
pub mod error;
pub mod xml;

pub use application_xml::{WeblogicApplicationXml, DESCRIPTOR_PATH};
pub use classloader::{reconcile, ClassloaderStructure, ReconcileSummary};
pub use error::{DescriptorError, Result};
pub use xml::{NodeId, XmlDocument};
