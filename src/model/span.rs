//! Positioned primitives supplied by the provider.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page units (origin top-left, y grows down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Absolute width.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    /// Absolute height.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// Bounding box with ordered corners.
    pub fn normalized(&self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        let b = self.normalized();
        Self {
            x0: b.x0 - margin,
            y0: b.y0 - margin,
            x1: b.x1 + margin,
            y1: b.y1 + margin,
        }
    }

    /// Whether a point lies inside the box (edges inclusive).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let b = self.normalized();
        x >= b.x0 && x <= b.x1 && y >= b.y0 && y <= b.y1
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BBox) -> bool {
        let o = other.normalized();
        self.contains_point(o.x0, o.y0) && self.contains_point(o.x1, o.y1)
    }

    /// Whether the two boxes overlap (touching edges count).
    pub fn intersects(&self, other: &BBox) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BBox) -> Self {
        let a = self.normalized();
        let b = other.normalized();
        Self {
            x0: a.x0.min(b.x0),
            y0: a.y0.min(b.y0),
            x1: a.x1.max(b.x1),
            y1: a.y1.max(b.y1),
        }
    }
}

/// A run of text with position and font information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Bounding box of the run
    pub bbox: BBox,
    /// Font name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font: String,
    /// Font size in points
    #[serde(default)]
    pub size: f32,
    /// Provider style flags (bold, italic, ...)
    #[serde(default)]
    pub style_flags: u32,
    /// sRGB color packed as 0xRRGGBB
    #[serde(default)]
    pub color: u32,
}

impl Span {
    /// Create a span with default font information.
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            font: String::new(),
            size: 0.0,
            style_flags: 0,
            color: 0,
        }
    }

    /// Set font name and size.
    pub fn with_font(mut self, font: impl Into<String>, size: f32) -> Self {
        self.font = font.into();
        self.size = size;
        self
    }

    /// Set style flags.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.style_flags = flags;
        self
    }

    /// Set color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Left edge.
    pub fn x0(&self) -> f32 {
        self.bbox.x0
    }

    /// Top edge.
    pub fn y0(&self) -> f32 {
        self.bbox.y0
    }
}

/// A vector line or rectangle edge from the page's drawing operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Endpoints as a box: (x0, y0) to (x1, y1)
    pub bbox: BBox,
}

impl LineSegment {
    /// Create a segment from its endpoints.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            bbox: BBox::new(x0, y0, x1, y1),
        }
    }

    /// Horizontal segment at `y` from `x0` to `x1`.
    pub fn horizontal(y: f32, x0: f32, x1: f32) -> Self {
        Self::new(x0, y, x1, y)
    }

    /// Vertical segment at `x` from `y0` to `y1`.
    pub fn vertical(x: f32, y0: f32, y1: f32) -> Self {
        Self::new(x, y0, x, y1)
    }

    /// Horizontal extent.
    pub fn width(&self) -> f32 {
        self.bbox.width()
    }

    /// Vertical extent.
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_contains() {
        let outer = BBox::new(0.0, 0.0, 100.0, 50.0);
        assert!(outer.contains(&BBox::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!outer.contains(&BBox::new(90.0, 10.0, 110.0, 20.0)));
        assert!(outer.contains_point(100.0, 50.0));
    }

    #[test]
    fn test_bbox_intersects() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&BBox::new(5.0, 5.0, 15.0, 15.0)));
        assert!(a.intersects(&BBox::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&BBox::new(11.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_bbox_expand_normalizes() {
        let b = BBox::new(10.0, 20.0, 0.0, 0.0).expand(5.0);
        assert_eq!(b, BBox::new(-5.0, -5.0, 15.0, 25.0));
    }

    #[test]
    fn test_segment_extent() {
        let line = LineSegment::horizontal(40.0, 10.0, 90.0);
        assert_eq!(line.width(), 80.0);
        assert_eq!(line.height(), 0.0);
    }
}
