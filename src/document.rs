//! Owned XML element tree for feed documents.
//!
//! Feed files are small (tens of kilobytes) so they are read in full with
//! the `quick_xml` event reader and kept as a tree; section lookup and
//! period walking then work on borrowed [`XmlElement`]s.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::FeedError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Element text, or `None` when the element is empty.
    pub fn text(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    /// Depth-first, document-order walk over this element and everything
    /// below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All elements named `tag` at any depth, in document order.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.descendants().filter(move |e| e.name == tag)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, FeedError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| FeedError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| FeedError::Xml(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }
}

#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Parse a complete document.
    ///
    /// Fails on malformed XML, on a document without a root element, and on
    /// unbalanced tags.
    pub fn parse(bytes: &[u8]) -> Result<Self, FeedError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut open: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    open.push(XmlElement::from_start(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let element = XmlElement::from_start(&e)?;
                    Self::attach(&mut open, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = open.last_mut() {
                        let text = e.unescape().map_err(|e| FeedError::Xml(e.to_string()))?;
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = open.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Ok(Event::End(_)) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| FeedError::Xml("unexpected closing tag".to_string()))?;
                    Self::attach(&mut open, &mut root, element)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    debug!(error = ?e, position = reader.buffer_position(), "XML parsing error");
                    return Err(FeedError::Xml(e.to_string()));
                }
                _ => {}
            }
            buf.clear();
        }

        if !open.is_empty() {
            return Err(FeedError::Xml(format!("unclosed element <{}>", open[open.len() - 1].name)));
        }

        let root = root.ok_or_else(|| FeedError::Xml("document has no root element".to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    fn attach(
        open: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<(), FeedError> {
        match open.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(FeedError::Xml("multiple root elements".to_string())),
        }
        Ok(())
    }
}
