//! Error types for the brandoc library.

use std::io;
use thiserror::Error;

/// Result type alias for brandoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during document processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required document part is missing from the package.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The document or template does not have the expected section shape.
    ///
    /// Fatal: the tool aborts before any write rather than guessing at
    /// section boundaries and risking mutation of branded content.
    #[error("Structure error: {0}")]
    Structure(String),

    /// Output serialization or package-write failure.
    #[error("Write error: {0}")]
    Write(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
