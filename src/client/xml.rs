//! Minimal XML element tree for SOAP responses.
//!
//! Secret Server replies are small, so the whole document is read into a
//! tree of elements keyed by local name (namespace prefixes are dropped).
//! Attributes are ignored; the API carries everything in element text.
//! Leaf text is kept byte for byte, since secret values may start or end
//! with whitespace. Only the indentation between child elements is dropped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::soap::TransportError;

/// One XML element: local name, concatenated text, child elements in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(input: &str) -> Result<Self, TransportError> {
        let mut reader = Reader::from_str(input);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(XmlElement::new(local_name(&e)?)),
                Ok(Event::Empty(e)) => {
                    let element = XmlElement::new(local_name(&e)?);
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| TransportError::Xml("unbalanced end tag".to_string()))?;
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(t)) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| TransportError::Xml(e.to_string()))?;
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(TransportError::Xml(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        if !stack.is_empty() {
            return Err(TransportError::Xml("unexpected end of document".to_string()));
        }
        root.ok_or_else(|| TransportError::Xml("document has no root element".to_string()))
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Walk a chain of child names starting at this element's own name.
    ///
    /// `root.path(&["Envelope", "Body"])` matches when `root` is `Envelope`.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        let (first, rest) = names.split_first()?;
        if self.name != *first {
            return None;
        }
        rest.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Trimmed text of the first child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }
}

fn local_name(start: &BytesStart<'_>) -> Result<String, TransportError> {
    std::str::from_utf8(start.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| TransportError::Xml(e.to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), TransportError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(TransportError::Xml(
                "document has more than one root element".to_string(),
            ));
        }
    }
    Ok(())
}
