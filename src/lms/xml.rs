//! Owned XML element tree, read and written with quick-xml.
//!
//! Elements own their children outright, so cloning an [`Element`] is a full
//! structural copy: attributes, nested elements and text all come along.

use std::borrow::Cow;
use std::io::BufRead;

use indexmap::IndexMap;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    /// Raw comment body, kept escaped as read.
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attribute values are stored unescaped; insertion order is preserved.
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Remove every child element called `name`. Returns how many were removed.
    pub fn remove_children_named(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| n.as_element().is_none_or(|e| e.name != name));
        before - self.children.len()
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, DocumentError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let mut element = Element::new(name);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| DocumentError::Parse(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| DocumentError::Parse(format!("bad value for '{key}': {e}")))?
                .into_owned();
            element.attributes.insert(key, value);
        }
        Ok(element)
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), DocumentError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_to(writer)?,
                Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
                Node::CData(c) => writer.write_event(Event::CData(BytesCData::new(c.as_str())))?,
                Node::Comment(c) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?;
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// Contents of the `<?xml ...?>` prolog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Declaration {
    fn from_decl(decl: &BytesDecl<'_>) -> Self {
        fn text(raw: Cow<'_, [u8]>) -> String {
            String::from_utf8_lossy(&raw).to_string()
        }
        Self {
            version: decl.version().map_or_else(|_| "1.0".to_string(), text),
            encoding: decl.encoding().and_then(Result::ok).map(text),
            standalone: decl.standalone().and_then(Result::ok).map(text),
        }
    }
}

/// A whole XML document: optional declaration plus a single root element.
/// Comments or text outside the root are not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTree {
    pub declaration: Option<Declaration>,
    pub root: Element,
}

impl XmlTree {
    pub fn parse<R: BufRead>(mut xml: Reader<R>) -> Result<Self, DocumentError> {
        xml.config_mut().trim_text(true);

        let mut buf = Vec::with_capacity(4096);
        let mut declaration = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Eof => break,
                Event::Decl(ref d) => declaration = Some(Declaration::from_decl(d)),
                Event::Start(ref e) => stack.push(Element::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Element::from_start(e)?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::End(ref e) => {
                    let element = stack.pop().ok_or_else(|| {
                        DocumentError::Parse(format!(
                            "unexpected closing tag '{}'",
                            String::from_utf8_lossy(e.name().as_ref())
                        ))
                    })?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::Text(ref t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| DocumentError::Parse(format!("bad text: {e}")))?
                        .into_owned();
                    if !text.is_empty() {
                        attach_inner(&mut stack, Node::Text(text));
                    }
                }
                Event::CData(ref c) => {
                    attach_inner(&mut stack, Node::CData(String::from_utf8_lossy(c).to_string()));
                }
                Event::Comment(ref c) => {
                    attach_inner(&mut stack, Node::Comment(String::from_utf8_lossy(c).to_string()));
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(DocumentError::Parse(format!(
                "unclosed element '{}'",
                open.name
            )));
        }
        let root = root.ok_or_else(|| DocumentError::Parse("document has no root element".into()))?;
        Ok(Self { declaration, root })
    }

    pub fn parse_str(s: &str) -> Result<Self, DocumentError> {
        Self::parse(Reader::from_str(s))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
        }
        self.root.write_to(&mut writer)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Attach a completed node to its parent, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    node: Node,
) -> Result<(), DocumentError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(element) if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        Node::Element(element) => Err(DocumentError::Parse(format!(
            "second root element '{}'",
            element.name
        ))),
        _ => Ok(()),
    }
}

/// Text-like nodes outside the root element are dropped.
fn attach_inner(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}
