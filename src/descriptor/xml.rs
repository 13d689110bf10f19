//! Minimal mutable XML tree
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removing a node
//! only detaches it, so ids handed out earlier never dangle. Callers look
//! nodes up again after each mutation instead of caching positions.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::error::{DescriptorError, Result};

pub type NodeId = usize;

const DOCUMENT: NodeId = 0;
const INDENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    DocType(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Node>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parses a document, dropping whitespace-only text and processing instructions
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut doc = Self::new();
        let mut stack = vec![DOCUMENT];

        loop {
            let position = reader.buffer_position() as u64;
            let parse_error = |message: String| DescriptorError::Parse { position, message };
            let event = reader
                .read_event()
                .map_err(|err| parse_error(err.to_string()))?;
            let current = stack.last().copied().unwrap_or(DOCUMENT);

            match event {
                Event::Start(start) => {
                    let element = doc.element_from(&start).map_err(parse_error)?;
                    doc.append_child(current, element);
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = doc.element_from(&start).map_err(parse_error)?;
                    doc.append_child(current, element);
                }
                Event::End(_) => {
                    if stack.len() <= 1 {
                        return Err(parse_error("unexpected closing tag".to_string()));
                    }
                    stack.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|err| parse_error(err.to_string()))?;
                    let node = doc.create_text(text.as_ref());
                    doc.append_child(current, node);
                }
                Event::CData(data) => {
                    let node = doc.create_text(String::from_utf8_lossy(&data).as_ref());
                    doc.append_child(current, node);
                }
                Event::Comment(comment) => {
                    let node = doc.push(NodeKind::Comment(
                        String::from_utf8_lossy(&comment).to_string(),
                    ));
                    doc.append_child(current, node);
                }
                Event::DocType(doctype) => {
                    let node = doc.push(NodeKind::DocType(
                        String::from_utf8_lossy(&doctype).trim().to_string(),
                    ));
                    doc.append_child(DOCUMENT, node);
                }
                Event::Decl(_) | Event::PI(_) => {}
                Event::Eof => break,
            }
        }

        if stack.len() > 1 {
            return Err(DescriptorError::Parse {
                position: reader.buffer_position() as u64,
                message: "unclosed element at end of document".to_string(),
            });
        }
        Ok(doc)
    }

    fn element_from(&mut self, start: &BytesStart<'_>) -> std::result::Result<NodeId, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let element = self.create_element(&name);
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|err| err.to_string())?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
            let value = attribute.unescape_value().map_err(|err| err.to_string())?;
            self.set_attribute(element, &key, value.as_ref());
        }
        Ok(element)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn document(&self) -> NodeId {
        DOCUMENT
    }

    /// Element children of the document node
    pub fn root_elements(&self) -> Vec<NodeId> {
        self.element_children(DOCUMENT)
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Inserts `child` at `index` among the children of `parent`, clamped to the end
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let index = index.min(self.nodes[parent].children.len());
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.insert(index, child);
    }

    /// Detaches `node` and its subtree from the document
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node].parent.take() {
            self.nodes[parent].children.retain(|child| *child != node);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn position(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|child| *child == node)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.nodes.get(node).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub fn has_element_children(&self, node: NodeId) -> bool {
        self.children(node).iter().any(|child| self.is_element(*child))
    }

    /// Qualified name, including any namespace prefix
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        self.name(node).map(local_name)
    }

    pub fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node)
        {
            match attributes.iter_mut().find(|(name, _)| name == key) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((key.to_string(), value.to_string())),
            }
        }
    }

    /// Concatenated text of every descendant text node
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        for child in self.children(node) {
            if let NodeKind::Text(text) = &self.nodes[*child].kind {
                out.push_str(text);
            } else {
                self.collect_text(*child, out);
            }
        }
    }

    /// Appends `<name>text</name>` under `parent`
    pub fn append_text_element(&mut self, parent: NodeId, name: &str, text: &str) -> NodeId {
        let element = self.create_element(name);
        let content = self.create_text(text);
        self.append_child(element, content);
        self.append_child(parent, element);
        element
    }

    /// Attached elements with the given local name, in document order
    pub fn elements_named(&self, local: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_elements(DOCUMENT, local, &mut found);
        found
    }

    fn collect_elements(&self, node: NodeId, local: &str, found: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if self.local_name(*child) == Some(local) {
                found.push(*child);
            }
            self.collect_elements(*child, local, found);
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(serialize_error)?;
        for child in self.children(DOCUMENT) {
            self.write_node(&mut writer, *child)?;
        }
        let mut xml = String::from_utf8(writer.into_inner())?;
        xml.push('\n');
        Ok(xml)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, node: NodeId) -> Result<()> {
        match &self.nodes[node].kind {
            NodeKind::Document => {}
            NodeKind::Element { name, attributes } => {
                let mut start = BytesStart::new(name.as_str());
                for (key, value) in attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                let children = self.children(node);
                if children.is_empty() {
                    writer.write_event(Event::Empty(start)).map_err(serialize_error)?;
                } else {
                    writer.write_event(Event::Start(start)).map_err(serialize_error)?;
                    for child in children {
                        self.write_node(writer, *child)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(serialize_error)?;
                }
            }
            NodeKind::Text(text) => {
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(serialize_error)?;
            }
            NodeKind::Comment(comment) => {
                writer
                    .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
                    .map_err(serialize_error)?;
            }
            NodeKind::DocType(doctype) => {
                writer
                    .write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))
                    .map_err(serialize_error)?;
            }
        }
        Ok(())
    }
}

fn serialize_error(err: impl std::fmt::Display) -> DescriptorError {
    DescriptorError::Serialize(err.to_string())
}

/// Name without its namespace prefix
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Namespace prefix of a qualified name, if any
pub fn prefix(name: &str) -> Option<&str> {
    name.split_once(':').map(|(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- hand written -->
<wls:weblogic-application xmlns:wls="http://xmlns.oracle.com/weblogic/weblogic-application">
    <wls:classloader-structure>
        <wls:module-ref>
            <wls:module-uri>auth.war</wls:module-uri>
        </wls:module-ref>
    </wls:classloader-structure>
    <wls:application-param>
        <wls:param-name>webapp.encoding.default</wls:param-name>
        <wls:param-value>UTF-8 &amp; more</wls:param-value>
    </wls:application-param>
</wls:weblogic-application>
"#;

    #[test]
    fn test_parse_and_navigate() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let roots = doc.root_elements();
        assert_eq!(roots.len(), 1);
        assert_eq!(doc.name(roots[0]), Some("wls:weblogic-application"));
        assert_eq!(doc.local_name(roots[0]), Some("weblogic-application"));

        let uris = doc.elements_named("module-uri");
        assert_eq!(uris.len(), 1);
        assert_eq!(doc.text(uris[0]), "auth.war");

        let values = doc.elements_named("param-value");
        assert_eq!(doc.text(values[0]), "UTF-8 & more");
    }

    #[test]
    fn test_remove_and_insert() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        let root = doc.root_elements()[0];
        let structure = doc.elements_named("classloader-structure")[0];
        assert_eq!(doc.position(structure), Some(0));

        doc.remove(structure);
        assert!(doc.elements_named("module-uri").is_empty());
        assert_eq!(doc.parent(structure), None);

        let replacement = doc.create_element("wls:classloader-structure");
        doc.insert_child(root, 0, replacement);
        doc.append_child(replacement, structure);
        assert_eq!(doc.parent(structure), Some(replacement));
        assert_eq!(doc.elements_named("module-uri").len(), 1);
    }

    #[test]
    fn test_serialize_round_trip() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let xml = doc.to_xml().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<!-- hand written -->"));
        assert!(xml.contains("<wls:module-uri>auth.war</wls:module-uri>"));
        assert!(xml.contains("UTF-8 &amp; more"));

        let reparsed = XmlDocument::parse(&xml).unwrap();
        assert_eq!(reparsed.to_xml().unwrap(), xml);
    }

    #[test]
    fn test_attributes() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("weblogic-application");
        doc.append_child(doc.document(), root);
        doc.set_attribute(root, "xmlns", "urn:a");
        doc.set_attribute(root, "xmlns", "urn:b");
        assert_eq!(doc.attribute(root, "xmlns"), Some("urn:b"));
        assert!(doc.to_xml().unwrap().contains(r#"<weblogic-application xmlns="urn:b"/>"#));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("<a>").is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(local_name("wls:module-ref"), "module-ref");
        assert_eq!(local_name("module-ref"), "module-ref");
        assert_eq!(prefix("wls:module-ref"), Some("wls"));
        assert_eq!(prefix("module-ref"), None);
    }
}
