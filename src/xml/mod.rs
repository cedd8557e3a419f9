//! Translation between the form and the official DPFO typ B XML document.

pub mod export;
pub mod import;
pub mod template;
pub mod tree;

pub use export::{to_document, to_xml};
pub use import::from_document;
pub use tree::Element;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(String),
    #[error("document has no root element")]
    Empty,
    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("failed to write XML: {0}")]
    Write(String),
}
