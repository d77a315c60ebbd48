//! Namespace-aware XML facade (L3).
//!
//! A small in-memory DOM over `quick-xml`, generalized from a single-string
//! text-content element model into a mixed-content tree (`Node::Text` interleaved with `Node::Element`) so
//! ODF's `text:p` / `text:span` nesting and OOXML's `w:p` / `w:r` nesting can
//! both be visited without losing sibling order - which back-translation and
//! the table dimension estimator both depend on.

pub mod namespace;

pub use namespace::{NamespaceContext, QualifiedName};

use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One child of an [`Element`]: either further markup or a run of character
/// data between tags.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t.as_str()),
            Node::Element(_) => None,
        }
    }
}

/// A parsed XML element: tag name, attributes (insertion order preserved),
/// and mixed-content children.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    qualified_name: QualifiedName,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    namespaces: NamespaceContext,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let qualified_name = QualifiedName::from_string(&tag);
        Self {
            tag,
            qualified_name,
            attributes: Vec::new(),
            children: Vec::new(),
            namespaces: NamespaceContext::default(),
        }
    }

    /// Parse a full XML document, returning its root element. Fails with
    /// [`Error::NotXml`] if the byte buffer does not parse as well-formed
    /// XML at all; malformed XML in a single archive entry fails that
    /// operation without corrupting the rest of the document's state.
    pub fn parse(bytes: &[u8]) -> Result<Element> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(false);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(ref e)) => {
                    let element = Self::start_element(e, stack.last().map(|p| &p.namespaces))?;
                    stack.push(element);
                },
                Ok(Event::Empty(ref e)) => {
                    let element = Self::start_element(e, stack.last().map(|p| &p.namespaces))?;
                    Self::attach(&mut stack, &mut root, Node::Element(element));
                },
                Ok(Event::End(_)) => {
                    let finished = stack
                        .pop()
                        .ok_or_else(|| Error::NotXml("unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, Node::Element(finished));
                },
                Ok(Event::Text(t)) | Ok(Event::CData(t)) => {
                    let text = String::from_utf8_lossy(&t.to_vec()).into_owned();
                    if let Some(top) = stack.last_mut() {
                        top.children.push(Node::Text(text));
                    }
                },
                Ok(_) => {},
                Err(e) => return Err(Error::NotXml(e.to_string())),
            }
            buf.clear();
        }

        root.ok_or_else(|| Error::NotXml("no root element".to_string()))
    }

    fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                if let Node::Element(e) = node {
                    *root = Some(e);
                }
            },
        }
    }

    fn start_element(
        e: &quick_xml::events::BytesStart<'_>,
        parent_ns: Option<&NamespaceContext>,
    ) -> Result<Element> {
        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut namespaces = parent_ns.cloned().unwrap_or_default();
        let mut attributes = Vec::new();

        for attr in e.attributes() {
            let attr = attr.map_err(|err| Error::NotXml(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = String::from_utf8_lossy(attr.value.as_ref()).into_owned();
            if key == "xmlns" || key.starts_with("xmlns:") {
                namespaces.add_namespace(&key, &value);
            } else {
                attributes.push((key, value));
            }
        }

        let qualified_name = namespaces.parse_qualified_name(&tag);
        Ok(Element {
            tag,
            qualified_name,
            attributes,
            children: Vec::new(),
            namespaces,
        })
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.qualified_name
    }

    pub fn local_name(&self) -> &str {
        &self.qualified_name.local_name
    }

    /// Literal tag-name match (e.g. `"text:p"`); prefixes must match
    /// exactly, not merely resolve to the same namespace URI.
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if let Some(existing) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            existing.1 = value.into();
        } else {
            self.attributes.push((name, value.into()));
        }
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn first_child_element(&self, tag: &str) -> Option<&Element> {
        self.element_children().find(|c| c.is(tag))
    }

    /// `f` is invoked once per descendant element in document order,
    /// depth-first. Used by the dimension estimator and meta parser, which
    /// both need a flat descendant walk without building a full
    /// element-graph arena.
    pub fn visit_descendants<'a>(&'a self, f: &mut dyn FnMut(&'a Element)) {
        for child in self.element_children() {
            f(child);
            child.visit_descendants(f);
        }
    }

    /// All text recursively concatenated, ignoring element boundaries.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    /// Re-serializes this element and its descendants. Text content and
    /// attribute values are written verbatim: both are already
    /// XML-escaped, whether they came unmodified from [`Element::parse`]
    /// or were produced by [`crate::document`]'s back-translation (which
    /// escapes new text before constructing replacement nodes).
    ///
    /// Does not reproduce this element's own `xmlns*` declarations, which
    /// [`Element::parse`] folds into [`NamespaceContext`] rather than
    /// keeping as ordinary attributes; callers serializing a document root
    /// should preserve its opening tag's original bytes instead of calling
    /// this on the root itself.
    pub fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.write_xml(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_mixed_content() {
        let xml = br#"<text:p xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">hello <text:span>world</text:span>!</text:p>"#;
        let root = Element::parse(xml).unwrap();
        assert_eq!(root.local_name(), "p");
        assert_eq!(root.text_content(), "hello world!");
        assert_eq!(root.element_children().count(), 1);
    }

    #[test]
    fn empty_body_produces_no_descendants() {
        let xml = br#"<office:body xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"/>"#;
        let root = Element::parse(xml).unwrap();
        let mut count = 0;
        root.visit_descendants(&mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn malformed_xml_is_not_xml_error() {
        let xml = b"<unterminated>";
        let err = Element::parse(xml).unwrap_err();
        assert!(matches!(err, Error::NotXml(_)));
    }

    #[test]
    fn write_xml_round_trips_mixed_content() {
        let xml = br#"<text:span xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">hello <text:span>world</text:span></text:span>"#;
        let root = Element::parse(xml).unwrap();
        let mut out = String::new();
        root.write_xml(&mut out);
        assert_eq!(out, "<text:span>hello <text:span>world</text:span></text:span>");
    }

    #[test]
    fn attribute_lookup() {
        let xml = br#"<table:table-cell table:number-columns-spanned="2"/>"#;
        let root = Element::parse(xml).unwrap();
        assert_eq!(root.attr("table:number-columns-spanned"), Some("2"));
        assert_eq!(root.attr("missing"), None);
    }
}
