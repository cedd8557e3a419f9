//! Owned element tree read and written with quick-xml.
//!
//! Only what the return needs is modelled: element names, attributes, text
//! and child elements. Leading and trailing whitespace of text is not kept.

use super::XmlError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

fn malformed<E: std::fmt::Display>(e: E) -> XmlError {
    XmlError::Malformed(e.to_string())
}

fn write_error<E: std::fmt::Display>(e: E) -> XmlError {
    XmlError::Write(e.to_string())
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Element::default()
        }
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> {
        self.children.iter_mut().filter(move |c| c.name == name)
    }

    /// Descendant at a `/`-separated path of element names.
    pub fn find(&self, path: &str) -> Option<&Element> {
        segments(path).try_fold(self, |element, name| element.child(name))
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut Element> {
        let mut current = self;
        for name in segments(path) {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// Trimmed text at `path`, empty when the element is missing.
    pub fn text_at(&self, path: &str) -> &str {
        self.find(path).map(|e| e.text.trim()).unwrap_or("")
    }

    /// Descendant at `path`, appending any missing elements on the way.
    pub fn ensure(&mut self, path: &str) -> &mut Element {
        let mut current = self;
        for name in segments(path) {
            let index = match current.children.iter().position(|c| c.name == name) {
                Some(index) => index,
                None => {
                    current.children.push(Element::new(name));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        current
    }

    pub fn set_text(&mut self, path: &str, text: impl Into<String>) {
        self.ensure(path).text = text.into();
    }

    pub fn parse(xml: &str) -> Result<Element, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(ref e) => stack.push(Self::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(ref e) => {
                    let name = std::str::from_utf8(e.name().as_ref())
                        .map_err(malformed)?
                        .to_string();
                    match stack.pop() {
                        Some(element) if element.name == name => {
                            Self::attach(&mut stack, &mut root, element)?
                        }
                        _ => return Err(XmlError::UnexpectedEnd(name)),
                    }
                }
                Event::Text(ref e) => {
                    let text = e.unescape().map_err(malformed)?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    let bytes = e.into_inner();
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&bytes));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        root.ok_or(XmlError::Empty)
    }

    fn from_start(start: &BytesStart) -> Result<Element, XmlError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(malformed)?
            .to_string();
        let mut element = Element::new(name);
        for attr in start.attributes() {
            let attr = attr.map_err(malformed)?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(malformed)?
                .to_string();
            let value = attr.unescape_value().map_err(malformed)?.to_string();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn attach(
        stack: &mut [Element],
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<(), XmlError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(XmlError::Malformed("more than one root element".into())),
        }
        Ok(())
    }

    /// Serialize with an XML declaration and two-space indentation.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(write_error)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(write_error)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_error)
    }
}
