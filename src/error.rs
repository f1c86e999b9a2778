//! Error types for the captionize library.

use std::io;
use thiserror::Error;

/// Result type alias for captionize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while classifying captions.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing the document.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not well-formed XML.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// The document tree has an unexpected shape (e.g. no root element).
    ///
    /// This aborts the whole run; there is no per-item skip mode.
    #[error("Malformed document tree: {0}")]
    Malformed(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(format!("invalid attribute: {}", err))
    }
}
