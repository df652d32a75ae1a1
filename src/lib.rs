//! # pdfsift
//!
//! Reconstructs a structured document from the raw primitives of a parsed PDF.
//!
//! A [`PdfProvider`] supplies positioned text spans, line graphics, raw image
//! payloads and grid-extractor output for each page. pdfsift turns them into a
//! [`Document`]: page-tagged text, deduplicated images written to disk, and
//! validated tables, including tables that have no ruling lines at all.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsift::{extract_file, render, ExtractOptions};
//!
//! fn main() -> pdfsift::Result<()> {
//!     // A JSON snapshot of page primitives dumped by a PDF engine
//!     let doc = extract_file("report.snapshot.json", "./images", &ExtractOptions::default());
//!
//!     for error in &doc.errors {
//!         eprintln!("{}", error);
//!     }
//!     println!("{}", render::to_json(&doc, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Three table strategies**: bordered grids, an external grid extractor,
//!   and pure text alignment, merged by priority
//! - **Image deduplication**: decoded-pixel fingerprints across image sources
//! - **Partial failure**: a failing page, image or strategy is recorded in
//!   [`Document::errors`] and never aborts the document
//! - **Parallel processing**: uses Rayon for multi-page documents

pub mod error;
pub mod extract;
pub mod model;
pub mod provider;
pub mod render;

// Re-export commonly used types
pub use error::{Error, ErrorKind, ExtractionError, Result};
pub use extract::{AlignmentPass, ExtractOptions, GridMode, PageSelection, StrategyKind};
pub use model::{
    BBox, ColorMode, Document, ExtractionMethod, ImageAsset, LineSegment, Metadata, Page, Span,
    Table,
};
pub use provider::{
    DocumentSnapshot, ImageSource, PageInfo, PageSnapshot, PdfProvider, RawImage, RawMatrix,
    SnapshotProvider, ToleranceProfile,
};
pub use render::JsonFormat;

use std::path::{Path, PathBuf};

use extract::Assembler;

/// Extract a document from any provider.
///
/// Images are written into `output_dir`. This never fails: every problem is
/// recorded in [`Document::errors`].
///
/// # Example
///
/// ```no_run
/// use pdfsift::{extract, ExtractOptions, SnapshotProvider};
///
/// let provider = SnapshotProvider::open("report.snapshot.json")?;
/// let doc = extract(&provider, "./images", &ExtractOptions::default());
/// println!("{} tables", doc.tables.len());
/// # Ok::<(), pdfsift::Error>(())
/// ```
pub fn extract<P: AsRef<Path>>(
    provider: &dyn PdfProvider,
    output_dir: P,
    options: &ExtractOptions,
) -> Document {
    Assembler::new(provider, output_dir.as_ref(), options).run()
}

/// Extract a document from a primitive snapshot file.
///
/// If the snapshot cannot be opened the result is an empty document holding a
/// single [`ErrorKind::ProviderOpenFailure`].
///
/// # Example
///
/// ```no_run
/// use pdfsift::{extract_file, ExtractOptions};
///
/// let doc = extract_file("report.snapshot.json", "./images", &ExtractOptions::default());
/// if doc.is_open_failure() {
///     eprintln!("{}", doc.errors[0]);
/// }
/// ```
pub fn extract_file<P: AsRef<Path>, O: AsRef<Path>>(
    path: P,
    output_dir: O,
    options: &ExtractOptions,
) -> Document {
    let path = path.as_ref();
    match SnapshotProvider::open(path) {
        Ok(provider) => extract(&provider, output_dir, options),
        Err(e) => {
            log::warn!("Cannot open {}: {}", path.display(), e);
            let mut doc = Document::open_failure(e.to_string());
            doc.metadata.source = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string());
            doc
        }
    }
}

/// Extract a document from a snapshot file on the blocking thread pool.
#[cfg(feature = "async")]
pub async fn extract_file_async(
    path: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
    options: ExtractOptions,
) -> Document {
    let path = path.into();
    let output_dir = output_dir.into();
    let task = tokio::task::spawn_blocking(move || extract_file(&path, &output_dir, &options));
    match task.await {
        Ok(doc) => doc,
        Err(e) => Document::open_failure(format!("extraction task failed: {}", e)),
    }
}

/// Builder for extraction passes.
///
/// # Example
///
/// ```no_run
/// use pdfsift::{Extractor, GridMode, JsonFormat};
///
/// let json = Extractor::new()
///     .with_output_dir("./images")
///     .with_grid_mode(GridMode::AccumulateAll)
///     .sequential()
///     .extract_file("report.snapshot.json")
///     .to_json(JsonFormat::Compact)?;
/// # Ok::<(), pdfsift::Error>(())
/// ```
pub struct Extractor {
    options: ExtractOptions,
    output_dir: PathBuf,
}

impl Extractor {
    /// Create a new builder writing images into the current directory.
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the image output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.with_parallel(false);
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.options = self.options.with_images(extract);
        self
    }

    /// Enable or disable table extraction.
    pub fn with_tables(mut self, extract: bool) -> Self {
        self.options = self.options.with_tables(extract);
        self
    }

    /// Set the grid profile mode.
    pub fn with_grid_mode(mut self, mode: GridMode) -> Self {
        self.options = self.options.with_grid_mode(mode);
        self
    }

    /// Set when the text-alignment strategy runs.
    pub fn with_alignment_pass(mut self, pass: AlignmentPass) -> Self {
        self.options = self.options.with_alignment_pass(pass);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Current options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract from a provider.
    pub fn extract(&self, provider: &dyn PdfProvider) -> ExtractResult {
        ExtractResult {
            document: extract(provider, &self.output_dir, &self.options),
        }
    }

    /// Extract from a snapshot file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> ExtractResult {
        ExtractResult {
            document: extract_file(path, &self.output_dir, &self.options),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of an extraction pass.
pub struct ExtractResult {
    /// The extracted document
    pub document: Document,
}

impl ExtractResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// All tables as CSV blocks.
    pub fn tables_csv(&self) -> String {
        render::tables_to_csv(&self.document.tables)
    }

    /// Get plain text without page tags.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the document.
    pub fn into_document(self) -> Document {
        self.document
    }
}
