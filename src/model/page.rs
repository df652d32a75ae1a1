//! Page-level types.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::BBox;

/// A single page in the document.
///
/// A page does not own its content. It indexes into the flat lists held by
/// [`super::Document`], so every span, image and table exists exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page box in points (1 point = 1/72 inch)
    pub bbox: BBox,

    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,

    /// Byte range of this page's text inside `Document::text`
    pub text_range: Range<usize>,

    /// Range of this page's spans inside `Document::positioned_text`
    pub span_range: Range<usize>,

    /// Indices into `Document::images`
    pub image_indices: Vec<usize>,

    /// Indices into `Document::tables`
    pub table_indices: Vec<usize>,
}

impl Page {
    /// Create a new page with the given box and no content.
    pub fn new(number: u32, bbox: BBox, rotation: u16) -> Self {
        Self {
            number,
            bbox,
            rotation,
            text_range: 0..0,
            span_range: 0..0,
            image_indices: Vec::new(),
            table_indices: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, BBox::new(0.0, 0.0, 612.0, 792.0), 0)
    }

    /// Page width in points.
    pub fn width(&self) -> f32 {
        self.bbox.width()
    }

    /// Page height in points.
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width(), self.height())
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        let (w, h) = self.dimensions();
        if self.rotation % 180 == 90 {
            h > w
        } else {
            w > h
        }
    }

    /// Check if the page has no spans, images or tables.
    pub fn is_empty(&self) -> bool {
        self.span_range.is_empty() && self.image_indices.is_empty() && self.table_indices.is_empty()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::letter(1);
        assert_eq!(page.number, 1);
        assert_eq!(page.width(), 612.0);
        assert_eq!(page.height(), 792.0);
        assert!(page.is_empty());
        assert!(!page.is_landscape());
    }

    #[test]
    fn test_rotated_page_is_landscape() {
        let page = Page::new(2, BBox::new(0.0, 0.0, 612.0, 792.0), 90);
        assert!(page.is_landscape());
    }
}
