use std::path::Path;
use tracing::info;

use super::classloader::{reconcile, same_module, ReconcileSummary};
use super::error::{DescriptorError, Result};
use super::xml::{NodeId, XmlDocument};
use crate::module::{ApplicationModule, EarModule};

pub const DESCRIPTOR_PATH: &str = "META-INF/weblogic-application.xml";
pub const TAG_WEBLOGIC_APPLICATION: &str = "weblogic-application";

const NAMESPACE: &str = "http://xmlns.oracle.com/weblogic/weblogic-application";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://xmlns.oracle.com/weblogic/weblogic-application http://xmlns.oracle.com/weblogic/weblogic-application/1.4/weblogic-application.xsd";

/// `META-INF/weblogic-application.xml` of one ear, read once and written once
#[derive(Debug, Clone)]
pub struct WeblogicApplicationXml {
    document: XmlDocument,
    existing: bool,
}

impl WeblogicApplicationXml {
    /// Reads the descriptor of `ear`, generating an empty one when absent
    pub fn load(ear: &ApplicationModule) -> Result<Self> {
        match ear.tree().read(Path::new(DESCRIPTOR_PATH)).map_err(|err| {
            DescriptorError::Module(err.into())
        })? {
            Some(bytes) => {
                info!("Found existing weblogic-application.xml, modifying in-place");
                let xml = String::from_utf8(bytes)?;
                Self::parse(&xml)
            }
            None => {
                info!("No existing weblogic-application.xml -- Generating");
                Ok(Self::generate())
            }
        }
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let descriptor = Self {
            document: XmlDocument::parse(xml)?,
            existing: true,
        };
        descriptor.root()?;
        Ok(descriptor)
    }

    pub fn generate() -> Self {
        let mut document = XmlDocument::new();
        let root = document.create_element(TAG_WEBLOGIC_APPLICATION);
        document.set_attribute(root, "xmlns", NAMESPACE);
        document.set_attribute(root, "xmlns:xsi", XSI_NAMESPACE);
        document.set_attribute(root, "xsi:schemaLocation", SCHEMA_LOCATION);
        let parent = document.document();
        document.append_child(parent, root);
        Self {
            document,
            existing: false,
        }
    }

    pub fn is_existing(&self) -> bool {
        self.existing
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// The single `weblogic-application` element, which must be the document root
    pub fn root(&self) -> Result<NodeId> {
        let matches = self.document.elements_named(TAG_WEBLOGIC_APPLICATION);
        let roots = self.document.root_elements();
        match (matches.as_slice(), roots.as_slice()) {
            ([found], [root]) if found == root => Ok(*found),
            _ => Err(DescriptorError::InvalidRoot {
                found: matches.len(),
            }),
        }
    }

    /// Makes `shared` the parent classloader of every other module in `ear`.
    ///
    /// EJB modules form the intermediate tier; every other module except the
    /// shared one hangs below it.
    pub fn setup_communal(&mut self, shared: &str, ear: &EarModule) -> Result<ReconcileSummary> {
        let root = self.root()?;

        let others = ear
            .modules()
            .values()
            .filter(|module| !same_module(module.name(), shared));
        let (dependent, standard): (Vec<&ApplicationModule>, Vec<&ApplicationModule>) =
            others.partition(|module| module.kind().is_ejb());
        let names = |modules: Vec<&ApplicationModule>| -> Vec<String> {
            modules.iter().map(|m| m.name().to_string()).collect()
        };

        Ok(reconcile(
            &mut self.document,
            root,
            shared,
            &names(dependent),
            &names(standard),
        ))
    }

    pub fn to_xml(&self) -> Result<String> {
        self.document.to_xml()
    }

    /// Writes the descriptor into the ear and its mirror
    pub fn persist(&self, ear: &ApplicationModule) -> Result<()> {
        let xml = self.to_xml()?;
        ear.tree()
            .write(Path::new(DESCRIPTOR_PATH), xml.as_bytes())
            .map_err(|err| DescriptorError::Module(err.into()))?;
        Ok(())
    }
}
