//! PDF provider abstraction layer.
//!
//! Decoding a PDF is not this crate's job. A provider hands over the raw
//! primitives of each page (spans, line segments, image payloads per source,
//! grid-extractor matrices per tolerance profile) and the extraction pipeline
//! reconstructs the document from them. [`SnapshotProvider`] serves primitives
//! that an upstream engine dumped to JSON; any other engine plugs in by
//! implementing [`PdfProvider`].

mod snapshot;

pub use snapshot::{DocumentSnapshot, PageSnapshot, SnapshotProvider};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BBox, LineSegment, Span};

/// A raw table matrix as returned by a grid extractor. `None` marks a cell
/// the extractor could not fill.
pub type RawMatrix = Vec<Vec<Option<String>>>;

/// Page geometry reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page box in points
    pub bbox: BBox,
    /// Rotation in degrees
    pub rotation: u16,
}

impl Default for PageInfo {
    fn default() -> Self {
        // Letter size
        Self {
            bbox: BBox::new(0.0, 0.0, 612.0, 792.0),
            rotation: 0,
        }
    }
}

/// A named backend that can surface embedded raster images.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSource {
    /// Source name, used as the image's extraction method
    pub name: String,
}

impl ImageSource {
    /// Create a named source.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The conventional primary source.
    pub fn primary() -> Self {
        Self::new("primary")
    }

    /// The conventional fallback source.
    pub fn fallback() -> Self {
        Self::new("fallback")
    }
}

/// Undecoded image bytes and the format the provider claims for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    /// Encoded image bytes (base64 in snapshots)
    #[serde(with = "snapshot::base64_bytes")]
    pub data: Vec<u8>,
    /// Format as a file extension ("png", "jpeg", ...); may be empty
    #[serde(default)]
    pub format: String,
}

impl RawImage {
    /// Create a raw image.
    pub fn new(data: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            data,
            format: format.into(),
        }
    }
}

/// How the grid extractor treats ruling lines and words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Both axes come from drawn lines
    Lines,
    /// Both axes come from word alignment
    Text,
    /// Vertical axis from words, horizontal axis from lines
    Hybrid,
}

/// A named bundle of grid-extractor thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceProfile {
    /// Profile name (e.g., "strict-lines")
    pub name: String,
    /// Line or text driven
    pub kind: ProfileKind,
    /// Snap tolerance for aligning nearby edges
    pub snap_tolerance: f32,
    /// Join tolerance for merging collinear edges
    pub join_tolerance: f32,
    /// Minimum edge length considered
    pub edge_min_length: f32,
    /// Minimum words sharing a vertical alignment
    pub min_words_vertical: usize,
    /// Minimum words sharing a horizontal alignment
    pub min_words_horizontal: usize,
    /// Tolerance for assigning text to cells
    pub text_tolerance: f32,
}

impl ToleranceProfile {
    /// Visible ruling lines only, tight snapping.
    pub fn strict_lines() -> Self {
        Self {
            name: "strict-lines".to_string(),
            kind: ProfileKind::Lines,
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 3.0,
            min_words_vertical: 3,
            min_words_horizontal: 1,
            text_tolerance: 3.0,
        }
    }

    /// Visible ruling lines, forgiving snapping for sloppy drawings.
    pub fn loose_lines() -> Self {
        Self {
            name: "loose-lines".to_string(),
            snap_tolerance: 6.0,
            join_tolerance: 6.0,
            edge_min_length: 10.0,
            ..Self::strict_lines()
        }
    }

    /// Word alignment only.
    pub fn text() -> Self {
        Self {
            name: "text".to_string(),
            kind: ProfileKind::Text,
            min_words_vertical: 2,
            ..Self::strict_lines()
        }
    }

    /// Word columns with ruled rows.
    pub fn hybrid() -> Self {
        Self {
            name: "hybrid".to_string(),
            kind: ProfileKind::Hybrid,
            min_words_vertical: 2,
            ..Self::strict_lines()
        }
    }

    /// The default profile order: strict-lines, loose-lines, text, hybrid.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::strict_lines(),
            Self::loose_lines(),
            Self::text(),
            Self::hybrid(),
        ]
    }

    /// Whether the profile relies on drawn lines for both axes.
    pub fn is_lines_based(&self) -> bool {
        self.kind == ProfileKind::Lines
    }
}

/// Abstract interface to a parsed PDF.
///
/// Implementations must be shareable across threads: pages are processed in
/// parallel. Page numbers are 1-indexed. Every method may fail for a single
/// page without affecting the others.
pub trait PdfProvider: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Page box and rotation.
    fn page_info(&self, _page: u32) -> Result<PageInfo> {
        Ok(PageInfo::default())
    }

    /// Positioned text spans, in content order.
    fn spans(&self, page: u32) -> Result<Vec<Span>>;

    /// Vector line and rectangle edges.
    fn lines(&self, page: u32) -> Result<Vec<LineSegment>>;

    /// Image backends, highest priority first.
    fn image_sources(&self) -> Vec<ImageSource>;

    /// Raw images of a page from one backend, in backend order.
    fn raw_images(&self, page: u32, source: &ImageSource) -> Result<Vec<RawImage>>;

    /// Grid-extractor output for a page under one tolerance profile.
    fn grid_tables(&self, page: u32, profile: &ToleranceProfile) -> Result<Vec<RawMatrix>>;

    /// Name of the input, if known.
    fn source_name(&self) -> Option<String> {
        None
    }
}
