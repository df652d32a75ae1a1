//! Bordered-hybrid candidates: ruling lines delimit the cells, spans fill them.

use super::{Candidate, PageContext, TableStrategy};
use crate::error::Result;
use crate::extract::geometry::grid_positions;
use crate::extract::options::{ExtractOptions, StrategyKind};
use crate::model::ExtractionMethod;

/// Fills the cells of a ruled grid with the spans inside it.
pub struct BorderedStrategy {
    line_min_length: f32,
    zone_margin: f32,
}

impl BorderedStrategy {
    /// Create a strategy with explicit thresholds.
    pub fn new(line_min_length: f32, zone_margin: f32) -> Self {
        Self {
            line_min_length,
            zone_margin,
        }
    }

    /// Create a strategy from extraction options.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(options.line_min_length, options.zone_margin)
    }
}

impl TableStrategy for BorderedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Bordered
    }

    fn detect(&self, ctx: &PageContext<'_>) -> Result<Vec<Candidate>> {
        if !ctx.has_grid {
            return Ok(Vec::new());
        }

        let grid = grid_positions(ctx.lines, self.line_min_length);
        let (rows, columns) = (grid.row_bands(), grid.column_bands());
        let zone = match grid.bbox() {
            Some(bbox) if rows >= 2 && columns >= 2 => bbox.expand(self.zone_margin),
            _ => {
                log::debug!(
                    "Page {}: bordered grid too small ({}x{} bands)",
                    ctx.page,
                    rows,
                    columns
                );
                return Ok(Vec::new());
            }
        };

        let mut cells: Vec<Vec<Vec<&str>>> = vec![vec![Vec::new(); columns]; rows];
        for span in ctx.spans.iter().filter(|s| zone.contains(&s.bbox)) {
            let text = span.text.trim();
            if text.is_empty() {
                continue;
            }
            let row = grid.row_band(span.y0());
            let col = grid.column_band(span.x0());
            cells[row][col].push(text);
        }

        let data: Vec<Vec<String>> = cells
            .into_iter()
            .map(|row| row.into_iter().map(|parts| parts.join(" ")).collect())
            .collect();

        let populated = data
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .count();
        if populated < 2 {
            log::debug!("Page {}: bordered grid has {} populated rows", ctx.page, populated);
            return Ok(Vec::new());
        }

        Ok(vec![Candidate::new(ctx.page, data, ExtractionMethod::BorderedHybrid).with_borders(true)])
    }
}
