//! Geometry helpers shared by the extraction passes.

use crate::model::{BBox, LineSegment, Span};

/// Orientation of a line segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Wider than tall and long enough
    Horizontal,
    /// Taller than wide and long enough
    Vertical,
    /// Too short or square
    Ignored,
}

/// Classify a segment by aspect ratio and minimum length.
pub fn classify_line(segment: &LineSegment, min_length: f32) -> LineKind {
    let width = segment.width();
    let height = segment.height();
    if width > height && width >= min_length {
        LineKind::Horizontal
    } else if height > width && height >= min_length {
        LineKind::Vertical
    } else {
        LineKind::Ignored
    }
}

/// Whether the lines form a visible border grid.
///
/// Needs two horizontal and two vertical lines, and in each direction at least
/// one spacing between consecutive lines of `min_gap` or more.
pub fn has_regular_grid(lines: &[LineSegment], min_length: f32, min_gap: f32) -> bool {
    let (mut ys, mut xs) = split_positions(lines, min_length);
    if ys.len() < 2 || xs.len() < 2 {
        return false;
    }
    ys.sort_by(f32::total_cmp);
    xs.sort_by(f32::total_cmp);
    has_gap(&ys, min_gap) && has_gap(&xs, min_gap)
}

fn has_gap(sorted: &[f32], min_gap: f32) -> bool {
    sorted.windows(2).any(|w| w[1] - w[0] >= min_gap)
}

/// Y positions of horizontal lines and x positions of vertical lines, unsorted.
fn split_positions(lines: &[LineSegment], min_length: f32) -> (Vec<f32>, Vec<f32>) {
    let mut ys = Vec::new();
    let mut xs = Vec::new();
    for line in lines {
        let b = line.bbox.normalized();
        match classify_line(line, min_length) {
            LineKind::Horizontal => ys.push((b.y0 + b.y1) / 2.0),
            LineKind::Vertical => xs.push((b.x0 + b.x1) / 2.0),
            LineKind::Ignored => {}
        }
    }
    (ys, xs)
}

/// Result of an alignment check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Whether every position is within tolerance of the mean
    pub aligned: bool,
    /// Mean position
    pub mean: f32,
    /// Largest distance from the mean
    pub max_deviation: f32,
}

/// Check whether positions cluster around their mean.
pub fn points_aligned(positions: &[f32], tolerance: f32) -> Alignment {
    if positions.is_empty() {
        return Alignment {
            aligned: false,
            mean: 0.0,
            max_deviation: 0.0,
        };
    }
    let mean = positions.iter().sum::<f32>() / positions.len() as f32;
    let max_deviation = positions
        .iter()
        .map(|p| (p - mean).abs())
        .fold(0.0_f32, f32::max);
    Alignment {
        aligned: max_deviation <= tolerance,
        mean,
        max_deviation,
    }
}

/// Group spans into visual rows.
///
/// Spans are sorted by rounded (y0, x0). A new row starts when a span's y0 is
/// more than `y_tolerance` away from the first span of the current row. Each
/// row comes back ordered left to right.
pub fn group_rows(spans: &[Span], y_tolerance: f32) -> Vec<Vec<&Span>> {
    let mut sorted: Vec<&Span> = spans.iter().collect();
    sorted.sort_by_key(|s| (s.y0().round() as i64, s.x0().round() as i64));

    let mut rows: Vec<Vec<&Span>> = Vec::new();
    let mut anchor = f32::NAN;
    for span in sorted {
        let same_row = (span.y0() - anchor).abs() <= y_tolerance;
        if let Some(row) = rows.last_mut().filter(|_| same_row) {
            row.push(span);
            continue;
        }
        anchor = span.y0();
        rows.push(vec![span]);
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.x0().total_cmp(&b.x0()));
    }
    rows
}

/// Border positions of a ruled grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPositions {
    /// Y positions of horizontal lines, ascending
    pub rows: Vec<f32>,
    /// X positions of vertical lines, ascending
    pub columns: Vec<f32>,
}

impl GridPositions {
    /// Number of row bands between consecutive horizontal lines.
    pub fn row_bands(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Number of column bands between consecutive vertical lines.
    pub fn column_bands(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// Box spanned by the outermost lines.
    pub fn bbox(&self) -> Option<BBox> {
        match (
            self.columns.first(),
            self.rows.first(),
            self.columns.last(),
            self.rows.last(),
        ) {
            (Some(&x0), Some(&y0), Some(&x1), Some(&y1)) => Some(BBox::new(x0, y0, x1, y1)),
            _ => None,
        }
    }

    /// Row band containing `y`, clamped to the grid.
    pub fn row_band(&self, y: f32) -> usize {
        band_index(&self.rows, y)
    }

    /// Column band containing `x`, clamped to the grid.
    pub fn column_band(&self, x: f32) -> usize {
        band_index(&self.columns, x)
    }
}

fn band_index(edges: &[f32], value: f32) -> usize {
    let bands = edges.len().saturating_sub(1).max(1);
    edges
        .partition_point(|&e| e <= value)
        .saturating_sub(1)
        .min(bands - 1)
}

/// Sorted, de-duplicated border positions. Lines closer than one point are
/// treated as the same border.
pub fn grid_positions(lines: &[LineSegment], min_length: f32) -> GridPositions {
    let (ys, xs) = split_positions(lines, min_length);
    GridPositions {
        rows: dedup_positions(ys),
        columns: dedup_positions(xs),
    }
}

fn dedup_positions(mut positions: Vec<f32>) -> Vec<f32> {
    positions.sort_by(f32::total_cmp);
    positions.dedup_by(|a, b| (*a - *b).abs() < 1.0);
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[f32], cols: &[f32]) -> Vec<LineSegment> {
        let (x0, x1) = (cols[0], cols[cols.len() - 1]);
        let (y0, y1) = (rows[0], rows[rows.len() - 1]);
        rows.iter()
            .map(|&y| LineSegment::horizontal(y, x0, x1))
            .chain(cols.iter().map(|&x| LineSegment::vertical(x, y0, y1)))
            .collect()
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(
            classify_line(&LineSegment::horizontal(10.0, 0.0, 100.0), 20.0),
            LineKind::Horizontal
        );
        assert_eq!(
            classify_line(&LineSegment::vertical(10.0, 0.0, 100.0), 20.0),
            LineKind::Vertical
        );
        assert_eq!(
            classify_line(&LineSegment::horizontal(10.0, 0.0, 19.0), 20.0),
            LineKind::Ignored
        );
        assert_eq!(
            classify_line(&LineSegment::new(0.0, 0.0, 30.0, 30.0), 20.0),
            LineKind::Ignored
        );
    }

    #[test]
    fn test_regular_grid() {
        let lines = grid(&[100.0, 120.0, 140.0, 160.0], &[50.0, 150.0, 250.0]);
        assert!(has_regular_grid(&lines, 20.0, 5.0));
    }

    #[test]
    fn test_grid_needs_both_directions() {
        let lines = vec![
            LineSegment::horizontal(100.0, 0.0, 200.0),
            LineSegment::horizontal(150.0, 0.0, 200.0),
            LineSegment::vertical(10.0, 0.0, 200.0),
        ];
        assert!(!has_regular_grid(&lines, 20.0, 5.0));
        assert!(!has_regular_grid(&[], 20.0, 5.0));
    }

    #[test]
    fn test_grid_needs_spacing() {
        let lines = vec![
            LineSegment::horizontal(100.0, 0.0, 200.0),
            LineSegment::horizontal(101.0, 0.0, 200.0),
            LineSegment::vertical(10.0, 0.0, 200.0),
            LineSegment::vertical(100.0, 0.0, 200.0),
        ];
        assert!(!has_regular_grid(&lines, 20.0, 5.0));
    }

    #[test]
    fn test_points_aligned() {
        let a = points_aligned(&[100.0, 105.0, 110.0], 20.0);
        assert!(a.aligned);
        assert_eq!(a.mean, 105.0);
        assert_eq!(a.max_deviation, 5.0);

        assert!(!points_aligned(&[0.0, 100.0], 20.0).aligned);
        assert!(!points_aligned(&[], 20.0).aligned);
    }

    #[test]
    fn test_group_rows() {
        let spans = vec![
            Span::new("b", BBox::new(200.0, 101.0, 220.0, 111.0)),
            Span::new("a", BBox::new(50.0, 100.0, 70.0, 110.0)),
            Span::new("c", BBox::new(50.0, 130.0, 70.0, 140.0)),
        ];
        let rows = group_rows(&spans, 5.0);
        assert_eq!(rows.len(), 2);
        let first: Vec<_> = rows[0].iter().map(|s| s.text.as_str()).collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(rows[1][0].text, "c");
    }

    #[test]
    fn test_group_rows_tolerance_boundary() {
        let at = |y: f32| {
            vec![
                Span::new("a", BBox::new(50.0, 100.0, 70.0, 110.0)),
                Span::new("b", BBox::new(200.0, y, 220.0, y + 10.0)),
            ]
        };
        assert_eq!(group_rows(&at(105.0), 5.0).len(), 1);
        assert_eq!(group_rows(&at(105.01), 5.0).len(), 2);
    }

    #[test]
    fn test_grid_positions_and_bands() {
        let mut lines = grid(&[100.0, 120.0, 140.0], &[50.0, 150.0, 250.0]);
        lines.push(LineSegment::horizontal(120.4, 50.0, 250.0));
        let positions = grid_positions(&lines, 20.0);
        assert_eq!(positions.rows, vec![100.0, 120.0, 140.0]);
        assert_eq!(positions.row_bands(), 2);
        assert_eq!(positions.column_bands(), 2);
        assert_eq!(positions.bbox(), Some(BBox::new(50.0, 100.0, 250.0, 140.0)));

        assert_eq!(positions.row_band(95.0), 0);
        assert_eq!(positions.row_band(110.0), 0);
        assert_eq!(positions.row_band(125.0), 1);
        assert_eq!(positions.row_band(145.0), 1);
        assert_eq!(positions.column_band(160.0), 1);
    }
}
