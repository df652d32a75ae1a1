//! Error types for pdfsift.
//!
//! There are two kinds of failure:
//!
//! * [`Error`] is returned by providers, renderers and the file-level helpers.
//!   Inside an extraction pass it is never propagated to the caller; the
//!   assembler converts it into an [`ExtractionError`] at the smallest unit of
//!   work (one image, one strategy on one page) and keeps going.
//! * [`ExtractionError`] is the recorded form stored in
//!   [`crate::model::Document::errors`].

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pdfsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading primitives or rendering output.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document could not be opened by the provider at all.
    #[error("Cannot open document: {0}")]
    Open(String),

    /// A primitive snapshot could not be decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The provider failed to decode a page.
    #[error("Page {0} could not be decoded: {1}")]
    PageDecode(u32, String),

    /// The provider or the image decoder failed on an image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// The external grid extractor failed.
    #[error("Grid extraction error: {0}")]
    GridExtract(String),

    /// Error during rendering (JSON, CSV).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageExtract(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Render(format!("CSV error: {}", err))
    }
}

/// Category of a recorded, non-fatal extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The document could not be opened; the only fatal kind.
    ProviderOpenFailure,
    /// Page geometry or text could not be read.
    PageDecodeFailure,
    /// One image (or one image source on a page) failed.
    ImageDecodeFailure,
    /// A table strategy failed on a page.
    TableStrategyFailure,
    /// An accepted table could not be flattened to text.
    TableRenderFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ProviderOpenFailure => "provider open failure",
            ErrorKind::PageDecodeFailure => "page decode failure",
            ErrorKind::ImageDecodeFailure => "image decode failure",
            ErrorKind::TableStrategyFailure => "table strategy failure",
            ErrorKind::TableRenderFailure => "table render failure",
        };
        f.write_str(name)
    }
}

/// A failure recorded during extraction.
///
/// `page` is `None` for document-level failures. `context` names the
/// operation that failed and `method` the strategy or image source involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionError {
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Page number (1-indexed), if page-scoped
    pub page: Option<u32>,
    /// Operation that failed (e.g. "spans", "raw_images", "image 3")
    pub context: String,
    /// Strategy or source tag
    pub method: Option<String>,
}

impl ExtractionError {
    /// Create a new recorded error.
    pub fn new(kind: ErrorKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            page: None,
            context: context.into(),
            method: None,
        }
    }

    /// Attach a page number.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a strategy or source tag.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Whether this error is scoped to a page.
    pub fn is_page_scoped(&self) -> bool {
        self.page.is_some()
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "[{}] page {}, {}: {}", self.kind, page, self.context, self.message)?,
            None => write!(f, "[{}] {}: {}", self.kind, self.context, self.message)?,
        }
        if let Some(ref method) = self.method {
            write!(f, " ({})", method)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::PageDecode(3, "bad stream".to_string());
        assert_eq!(err.to_string(), "Page 3 could not be decoded: bad stream");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_extraction_error_display() {
        let err = ExtractionError::new(ErrorKind::ImageDecodeFailure, "truncated", "image 2")
            .on_page(4)
            .with_method("primary");
        assert_eq!(
            err.to_string(),
            "[image decode failure] page 4, image 2: truncated (primary)"
        );
        assert!(err.is_page_scoped());

        let err = ExtractionError::new(ErrorKind::ProviderOpenFailure, "missing", "open");
        assert_eq!(err.to_string(), "[provider open failure] open: missing");
    }
}
