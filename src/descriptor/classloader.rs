//! Conservative merge of a parent/child module hierarchy into `classloader-structure`
//!
//! Hand-authored structure always wins. The only node that is moved is the
//! shared module, which becomes the single top-level parent. Everything else
//! is appended only when no reference to it exists anywhere in the document.

use serde::Serialize;
use tracing::debug;

use super::xml::{local_name, NodeId, XmlDocument};

pub const TAG_CLASSLOADER_STRUCTURE: &str = "classloader-structure";
pub const TAG_MODULE_REF: &str = "module-ref";
pub const TAG_MODULE_URI: &str = "module-uri";

/// Module names compare equal under full Unicode case folding
pub fn same_module(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// What a reconciliation changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub shared_module: String,
    /// References to the shared module removed from their old position
    pub removed_references: usize,
    /// The previous top-level structure was nested under the shared module
    pub nested_previous: bool,
    pub dependent_added: Vec<String>,
    pub standard_added: Vec<String>,
}

/// Edits the `classloader-structure` tree below one root element
pub struct ClassloaderStructure<'d> {
    doc: &'d mut XmlDocument,
    root: NodeId,
    prefix: Option<String>,
}

impl<'d> ClassloaderStructure<'d> {
    /// New elements take the namespace prefix of `root`
    pub fn new(doc: &'d mut XmlDocument, root: NodeId) -> Self {
        let prefix = doc
            .name(root)
            .and_then(super::xml::prefix)
            .map(str::to_string);
        Self { doc, root, prefix }
    }

    fn qualified(&self, local: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        }
    }

    /// Every `module-ref` whose `module-uri` names `module`, ignoring case
    pub fn find_module_refs(&self, module: &str) -> Vec<NodeId> {
        self.doc
            .elements_named(TAG_MODULE_URI)
            .into_iter()
            .filter(|uri| same_module(self.doc.text(*uri).trim(), module))
            .filter_map(|uri| self.doc.parent(uri))
            .collect()
    }

    pub fn is_referenced(&self, module: &str) -> bool {
        !self.find_module_refs(module).is_empty()
    }

    /// First `classloader-structure` directly under the root
    pub fn top_level(&self) -> Option<NodeId> {
        self.doc
            .element_children(self.root)
            .into_iter()
            .find(|child| self.doc.local_name(*child) == Some(TAG_CLASSLOADER_STRUCTURE))
    }

    /// The top-level structure when `shared` already heads it alone.
    ///
    /// `shared` must be its first child and referenced nowhere else, and every
    /// following child must be a nested structure. A sibling `module-ref`
    /// would share the tier with `shared` instead of hanging below it.
    pub fn shared_parent(&self, shared: &str) -> Option<NodeId> {
        let top = self.top_level()?;
        let children = self.doc.element_children(top);
        let (first, rest) = children.split_first()?;
        let refs = self.find_module_refs(shared);
        let heads = refs.len() == 1 && refs[0] == *first;
        let nested_only = rest
            .iter()
            .all(|child| self.doc.local_name(*child) == Some(TAG_CLASSLOADER_STRUCTURE));
        (heads && nested_only).then_some(top)
    }

    /// Removes every reference to `module`, then any structure node left empty
    pub fn remove_module(&mut self, module: &str) -> usize {
        let refs = self.find_module_refs(module);
        for module_ref in &refs {
            let parent = self.doc.parent(*module_ref);
            self.doc.remove(*module_ref);

            if let Some(parent) = parent {
                if parent != self.root
                    && self.doc.is_element(parent)
                    && !self.doc.has_element_children(parent)
                {
                    debug!("Removing emptied {}", self.doc.name(parent).unwrap_or_default());
                    self.doc.remove(parent);
                }
            }
        }
        refs.len()
    }

    /// A `classloader-structure` holding one `module-ref` per name, detached
    pub fn generate(&mut self, modules: &[String]) -> NodeId {
        let structure = self.doc.create_element(&self.qualified(TAG_CLASSLOADER_STRUCTURE));
        for module in modules {
            let module_ref = self.doc.create_element(&self.qualified(TAG_MODULE_REF));
            let uri = self.qualified(TAG_MODULE_URI);
            self.doc.append_text_element(module_ref, &uri, module);
            self.doc.append_child(structure, module_ref);
        }
        structure
    }

    /// Puts `shared` at the top of the hierarchy.
    ///
    /// The new node takes the place of the existing top-level structure, which
    /// is nested inside it when it still has children and dropped otherwise.
    /// Returns the new node and whether the old one was nested.
    pub fn make_parent(&mut self, shared: &str) -> (NodeId, bool) {
        let parent = self.generate(&[shared.to_string()]);
        match self.top_level() {
            Some(previous) => {
                let position = self.doc.position(previous).unwrap_or_default();
                self.doc.insert_child(self.root, position, parent);
                if self.doc.has_element_children(previous) {
                    self.doc.append_child(parent, previous);
                    (parent, true)
                } else {
                    self.doc.remove(previous);
                    (parent, false)
                }
            }
            None => {
                self.doc.append_child(self.root, parent);
                (parent, false)
            }
        }
    }

    /// Adds one intermediate tier holding every unreferenced dependent module.
    ///
    /// Returns the node later modules should hang under, which is `parent`
    /// itself when nothing was missing.
    pub fn append_dependent_not_present(
        &mut self,
        parent: NodeId,
        modules: &[String],
    ) -> (NodeId, Vec<String>) {
        let missing: Vec<String> = modules
            .iter()
            .filter(|module| !self.is_referenced(module))
            .cloned()
            .collect();
        if missing.is_empty() {
            return (parent, missing);
        }
        let tier = self.generate(&missing);
        self.doc.append_child(parent, tier);
        (tier, missing)
    }

    /// Adds a structure node under `parent` for each unreferenced module
    pub fn append_not_present(&mut self, parent: NodeId, modules: &[String]) -> Vec<String> {
        let mut added = Vec::new();
        for module in modules {
            if self.is_referenced(module) {
                debug!("Keeping explicit classloader placement of {module}");
                continue;
            }
            let structure = self.generate(std::slice::from_ref(module));
            self.doc.append_child(parent, structure);
            added.push(module.clone());
        }
        added
    }
}

/// Makes `shared` the top-level parent and fills in missing modules.
///
/// Dependent modules form an intermediate tier between the shared module and
/// the standard modules. A structure already headed by `shared` is reused.
pub fn reconcile(
    doc: &mut XmlDocument,
    root: NodeId,
    shared: &str,
    dependent: &[String],
    standard: &[String],
) -> ReconcileSummary {
    let mut structure = ClassloaderStructure::new(doc, root);

    let (parent, removed_references, nested_previous) = match structure.shared_parent(shared) {
        Some(top) => {
            debug!("{shared} already heads the classloader structure");
            (top, 0, false)
        }
        None => {
            let removed = structure.remove_module(shared);
            let (parent, nested) = structure.make_parent(shared);
            (parent, removed, nested)
        }
    };
    let (parent, dependent_added) = structure.append_dependent_not_present(parent, dependent);
    let standard_added = structure.append_not_present(parent, standard);

    ReconcileSummary {
        shared_module: shared.to_string(),
        removed_references,
        nested_previous,
        dependent_added,
        standard_added,
    }
}

/// Module names referenced under `node`, in document order
pub fn referenced_modules(doc: &XmlDocument, node: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    collect_references(doc, node, &mut names);
    names
}

fn collect_references(doc: &XmlDocument, node: NodeId, names: &mut Vec<String>) {
    for child in doc.element_children(node) {
        if doc.name(child).map(local_name) == Some(TAG_MODULE_URI) {
            names.push(doc.text(child).trim().to_string());
        } else {
            collect_references(doc, child, names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn document(body: &str) -> (XmlDocument, NodeId) {
        let xml = format!("<weblogic-application>{body}</weblogic-application>");
        let doc = XmlDocument::parse(&xml).unwrap();
        let root = doc.root_elements()[0];
        (doc, root)
    }

    fn count_refs(doc: &XmlDocument, module: &str) -> usize {
        referenced_modules(doc, doc.document())
            .iter()
            .filter(|name| same_module(name, module))
            .count()
    }

    #[test]
    fn test_existing_reference_is_not_duplicated() {
        let (mut doc, root) = document(
            "<classloader-structure><module-ref><module-uri>auth-war</module-uri></module-ref></classloader-structure>",
        );
        let summary = reconcile(&mut doc, root, "shared-war", &[], &names(&["auth-war", "ui-war"]));

        assert_eq!(count_refs(&doc, "auth-war"), 1);
        assert_eq!(count_refs(&doc, "ui-war"), 1);
        assert_eq!(summary.standard_added, vec!["ui-war"]);
    }

    #[test]
    fn test_previous_top_level_is_nested_under_shared() {
        let (mut doc, root) = document(
            "<classloader-structure>\
               <module-ref><module-uri>a.war</module-uri></module-ref>\
               <module-ref><module-uri>b.war</module-uri></module-ref>\
             </classloader-structure>",
        );
        let summary = reconcile(&mut doc, root, "shared-war", &[], &[]);
        assert!(summary.nested_previous);

        let top = doc.element_children(root);
        assert_eq!(top.len(), 1);
        let children = doc.element_children(top[0]);
        assert_eq!(children.len(), 2);
        assert_eq!(doc.local_name(children[0]), Some(TAG_MODULE_REF));
        assert_eq!(doc.text(children[0]), "shared-war");
        assert_eq!(referenced_modules(&doc, children[1]), vec!["a.war", "b.war"]);
    }

    #[test]
    fn test_shared_reference_moves_and_empty_parent_is_dropped() {
        let (mut doc, root) = document(
            "<classloader-structure>\
               <classloader-structure><module-ref><module-uri>SHARED.war</module-uri></module-ref></classloader-structure>\
               <classloader-structure><module-ref><module-uri>a.war</module-uri></module-ref></classloader-structure>\
             </classloader-structure>",
        );
        let summary = reconcile(&mut doc, root, "shared.war", &[], &names(&["a.war"]));

        assert_eq!(summary.removed_references, 1);
        assert_eq!(count_refs(&doc, "shared.war"), 1);
        assert_eq!(doc.elements_named(TAG_CLASSLOADER_STRUCTURE).len(), 3);
        assert!(summary.standard_added.is_empty());
    }

    #[test]
    fn test_shared_peer_refs_are_pushed_below_shared() {
        let (mut doc, root) = document(
            "<classloader-structure>\
               <module-ref><module-uri>shared.war</module-uri></module-ref>\
               <module-ref><module-uri>a.war</module-uri></module-ref>\
             </classloader-structure>",
        );
        let summary = reconcile(&mut doc, root, "shared.war", &[], &[]);

        assert_eq!(summary.removed_references, 1);
        assert!(summary.nested_previous);
        let top = doc.element_children(root);
        assert_eq!(top.len(), 1);
        let children = doc.element_children(top[0]);
        assert_eq!(children.len(), 2);
        assert_eq!(doc.text(children[0]), "shared.war");
        assert_eq!(doc.local_name(children[1]), Some(TAG_CLASSLOADER_STRUCTURE));
        assert_eq!(referenced_modules(&doc, children[1]), vec!["a.war"]);
    }

    #[test]
    fn test_empty_top_level_is_replaced() {
        let (mut doc, root) = document("<classloader-structure/>");
        let summary = reconcile(&mut doc, root, "shared.war", &[], &[]);

        assert!(!summary.nested_previous);
        assert_eq!(summary.removed_references, 0);
        let top = doc.element_children(root);
        assert_eq!(top.len(), 1);
        assert_eq!(referenced_modules(&doc, top[0]), vec!["shared.war"]);
        assert_eq!(doc.element_children(top[0]).len(), 1);
    }

    #[test]
    fn test_module_names_fold_unicode_case() {
        assert!(same_module("Ümlaut.war", "ümlaut.WAR"));
        assert!(!same_module("a.war", "b.war"));

        let (mut doc, root) = document(
            "<classloader-structure><module-ref><module-uri>ÄPFEL.war</module-uri></module-ref></classloader-structure>",
        );
        let summary = reconcile(&mut doc, root, "shared.war", &[], &names(&["äpfel.war"]));
        assert!(summary.standard_added.is_empty());
        assert_eq!(count_refs(&doc, "äpfel.war"), 1);
    }

    #[test]
    fn test_fresh_document_with_dependent_tier() {
        let (mut doc, root) = document("");
        let summary = reconcile(
            &mut doc,
            root,
            "communal.war",
            &names(&["services.jar", "batch.jar"]),
            &names(&["orders.war", "billing.war"]),
        );

        assert!(!summary.nested_previous);
        assert_eq!(summary.dependent_added, vec!["services.jar", "batch.jar"]);

        let top = doc.element_children(root)[0];
        assert_eq!(referenced_modules(&doc, top)[0], "communal.war");
        let tier = doc.element_children(top)[1];
        assert_eq!(
            referenced_modules(&doc, tier),
            vec!["services.jar", "batch.jar", "orders.war", "billing.war"]
        );
        assert_eq!(doc.element_children(tier).len(), 4);
    }

    #[test]
    fn test_reconcile_twice_is_stable() {
        let (mut doc, root) = document("");
        let standard = names(&["orders.war", "billing.war"]);
        reconcile(&mut doc, root, "communal.war", &[], &standard);
        let first = doc.to_xml().unwrap();

        let summary = reconcile(&mut doc, root, "communal.war", &[], &standard);
        assert!(summary.standard_added.is_empty());
        assert_eq!(doc.to_xml().unwrap(), first);
    }

    #[test]
    fn test_new_elements_reuse_root_prefix() {
        let mut doc = XmlDocument::parse(
            r#"<wls:weblogic-application xmlns:wls="urn:wls"></wls:weblogic-application>"#,
        )
        .unwrap();
        let root = doc.root_elements()[0];
        reconcile(&mut doc, root, "communal.war", &[], &[]);
        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("<wls:classloader-structure>"));
        assert!(xml.contains("<wls:module-uri>communal.war</wls:module-uri>"));
    }
}
