//! Minimal mutable XML tree over `quick-xml` events.
//!
//! WordprocessingML parts are small enough to hold in memory. Start tags keep
//! their original bytes (prefixes, namespaces, attributes), so a part that is
//! parsed and written back without edits round-trips to equivalent XML.

use crate::error::{RedactorError, RedactorResult};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node in a parsed XML part.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Unescaped character data
    Text(String),
    /// Declarations, comments, CDATA and processing instructions, kept verbatim
    Raw(Event<'static>),
}

/// An element with its original start tag.
#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    name: String,
    pub children: Vec<Node>,
    empty: bool,
}

impl Element {
    fn from_start(start: BytesStart<'static>, empty: bool) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        Self {
            start,
            name,
            children: Vec::new(),
            empty,
        }
    }

    /// Creates an element from a qualified name and attributes. It is
    /// written self-closing while it has no children.
    pub fn new(name: &str, attributes: &[(&str, &str)]) -> Self {
        let mut start = BytesStart::new(name.to_string());
        for attr in attributes {
            start.push_attribute(*attr);
        }
        Self::from_start(start, true)
    }

    /// Appends a child element and returns it for chaining.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends character data.
    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    /// Qualified name, e.g. `w:p`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Value of the attribute whose local name is `local`.
    pub fn attribute(&self, local: &str) -> Option<String> {
        self.start.attributes().flatten().find_map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let key_local = key.rsplit(':').next().unwrap_or(&key).to_string();
            (key_local == local).then(|| String::from_utf8_lossy(&attr.value).into_owned())
        })
    }

    /// Concatenated character data directly inside this element.
    pub fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replaces all character data with `text`.
    pub fn set_own_text(&mut self, text: &str) {
        self.children.retain(|n| !matches!(n, Node::Text(_)));
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Child elements in order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Mutable child elements in order.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Removes descendant elements matching `pred`, at any depth, and
    /// returns how many subtrees were dropped.
    pub fn remove_descendants<F>(&mut self, pred: &F) -> usize
    where
        F: Fn(&Element) -> bool,
    {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if pred(e)));
        let mut removed = before - self.children.len();
        for child in self.elements_mut() {
            removed += child.remove_descendants(pred);
        }
        removed
    }

    /// Visits this element and every descendant element, depth first.
    pub fn walk_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        f(self);
        for child in self.elements_mut() {
            child.walk_mut(f);
        }
    }

    /// Immutable depth-first visit.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&Element),
    {
        f(self);
        for child in self.elements() {
            child.walk(f);
        }
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    pub nodes: Vec<Node>,
}

fn attach(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

impl XmlDocument {
    /// Parses a part. `part` names it in error messages.
    pub fn parse(part: &str, xml: &[u8]) -> RedactorResult<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut roots = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| RedactorError::docx(part, e))?;
            match event {
                Event::Start(start) => stack.push(Element::from_start(start.into_owned(), false)),
                Event::Empty(start) => {
                    let element = Element::from_start(start.into_owned(), true);
                    attach(&mut stack, &mut roots, Node::Element(element));
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| RedactorError::docx(part, "unbalanced end tag"))?;
                    attach(&mut stack, &mut roots, Node::Element(element));
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| RedactorError::docx(part, e))?
                        .into_owned();
                    attach(&mut stack, &mut roots, Node::Text(text));
                }
                Event::Eof => break,
                other => attach(&mut stack, &mut roots, Node::Raw(other.into_owned())),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(RedactorError::docx(part, "unclosed element at end of part"));
        }
        Ok(Self { nodes: roots })
    }

    /// Serializes the tree back to bytes.
    pub fn to_bytes(&self, part: &str) -> RedactorResult<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node).map_err(|e| RedactorError::docx(part, e))?;
        }
        Ok(writer.into_inner())
    }

    /// First element at the top level (the part's root element).
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> quick_xml::Result<()> {
    match node {
        Node::Element(element) => {
            if element.children.is_empty() && element.empty {
                writer.write_event(Event::Empty(element.start.borrow()))?;
            } else {
                writer.write_event(Event::Start(element.start.borrow()))?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(element.start.to_end()))?;
            }
        }
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::Raw(event) => writer.write_event(event.clone())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_structure() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t xml:space="preserve">A &amp; B</w:t></w:r><w:r><w:tab/></w:r></w:p></w:body></w:document>"#;
        let doc = XmlDocument::parse("test", xml).unwrap();
        let out = doc.to_bytes("test").unwrap();
        let reparsed = XmlDocument::parse("test", &out).unwrap();
        let mut texts = Vec::new();
        reparsed.root().unwrap().walk(&mut |e| {
            if e.is("t") {
                texts.push(e.own_text());
            }
        });
        assert_eq!(texts, vec!["A & B"]);
        assert!(String::from_utf8(out).unwrap().contains("<w:tab/>"));
    }

    #[test]
    fn test_remove_descendants_counts_subtrees() {
        let xml = br#"<p><r><drawing><x/></drawing></r><drawing/><r><t>keep</t></r></p>"#;
        let mut doc = XmlDocument::parse("test", xml).unwrap();
        let root = doc.root_mut().unwrap();
        assert_eq!(root.remove_descendants(&|e: &Element| e.is("drawing")), 2);
        let out = String::from_utf8(doc.to_bytes("test").unwrap()).unwrap();
        assert_eq!(out, "<p><r></r><r><t>keep</t></r></p>");
    }

    #[test]
    fn test_unbalanced_part_is_an_error() {
        assert!(XmlDocument::parse("word/document.xml", b"<a><b></a>").is_err());
    }

    #[test]
    fn test_attribute_by_local_name() {
        let doc = XmlDocument::parse("test", br#"<w:fldSimple w:instr=" HYPERLINK x "/>"#).unwrap();
        assert_eq!(
            doc.root().unwrap().attribute("instr").as_deref(),
            Some(" HYPERLINK x ")
        );
    }
}
