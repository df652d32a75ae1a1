//! Document model types.
//!
//! The model is the single immutable snapshot an extraction pass returns:
//! flat lists of spans, tables and images, plus pages that index into them.

mod document;
mod image;
mod page;
mod span;
mod table;

pub use document::{Document, Metadata};
pub use image::{detect_format, ColorMode, ImageAsset};
pub use page::Page;
pub use span::{BBox, LineSegment, Span};
pub use table::{fill_ratio, ExtractionMethod, Table};
