//! Table detection from text alignment alone.
//!
//! Tables without any ruling lines are recognised by spans that fall into
//! consistent rows and whose left edges line up column by column.

use std::collections::BTreeMap;

use super::{Candidate, PageContext, TableStrategy};
use crate::error::Result;
use crate::extract::geometry::{group_rows, points_aligned};
use crate::extract::options::{AlignmentPass, ExtractOptions, StrategyKind};
use crate::model::{fill_ratio, ExtractionMethod, Span};

/// Text-alignment detector configuration.
#[derive(Debug, Clone)]
pub struct AlignmentConfig {
    /// Y tolerance for grouping spans into rows (points)
    pub row_tolerance: f32,
    /// Maximum deviation of a column's left edges from their mean (points)
    pub column_tolerance: f32,
    /// Minimum fill ratio of the reconstructed matrix
    pub min_fill_ratio: f32,
    /// When the detector runs
    pub pass: AlignmentPass,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 5.0,
            column_tolerance: 20.0,
            min_fill_ratio: 0.40,
            pass: AlignmentPass::Always,
        }
    }
}

/// Detects at most one table per page from span alignment.
pub struct AlignmentStrategy {
    config: AlignmentConfig,
}

impl AlignmentStrategy {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self {
            config: AlignmentConfig::default(),
        }
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: AlignmentConfig) -> Self {
        Self { config }
    }

    /// Create a detector from extraction options.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::with_config(AlignmentConfig {
            row_tolerance: options.row_tolerance,
            column_tolerance: options.column_tolerance,
            min_fill_ratio: options.text_fill_ratio,
            pass: options.alignment_pass,
        })
    }

    /// Reconstruct a matrix from spans, if they form a table.
    pub fn reconstruct(&self, spans: &[Span]) -> Option<Vec<Vec<String>>> {
        let rows: Vec<Vec<&Span>> = group_rows(spans, self.config.row_tolerance)
            .into_iter()
            .filter(|row| row.len() >= 2)
            .collect();
        if rows.len() < 2 {
            log::debug!("AlignmentStrategy: not enough multi-span rows ({})", rows.len());
            return None;
        }

        let columns = modal_length(&rows)?;
        let rows: Vec<Vec<&Span>> = rows
            .into_iter()
            .filter(|row| row.len().abs_diff(columns) <= 1)
            .collect();
        if rows.len() < 2 || columns < 2 {
            return None;
        }

        // Padded cells sit at the left edge of the row's last real cell.
        for col in 0..columns {
            let lefts: Vec<f32> = rows.iter().filter_map(|row| cell_left(row, col)).collect();
            let alignment = points_aligned(&lefts, self.config.column_tolerance);
            if !alignment.aligned {
                log::debug!(
                    "AlignmentStrategy: column {} deviates by {:.1} (mean x {:.1})",
                    col,
                    alignment.max_deviation,
                    alignment.mean
                );
                return None;
            }
        }

        let data: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                (0..columns)
                    .map(|col| row.get(col).map(|s| s.text.clone()).unwrap_or_default())
                    .collect()
            })
            .collect();

        let ratio = fill_ratio(&data);
        if ratio < self.config.min_fill_ratio {
            log::debug!(
                "AlignmentStrategy: fill ratio {:.2} below {:.2}",
                ratio,
                self.config.min_fill_ratio
            );
            return None;
        }

        Some(data)
    }
}

impl Default for AlignmentStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStrategy for AlignmentStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TextAlignment
    }

    fn detect(&self, ctx: &PageContext<'_>) -> Result<Vec<Candidate>> {
        if self.config.pass == AlignmentPass::WhenNoGrid && ctx.has_grid {
            return Ok(Vec::new());
        }
        Ok(self
            .reconstruct(ctx.spans)
            .map(|data| Candidate::new(ctx.page, data, ExtractionMethod::TextAlignment))
            .into_iter()
            .collect())
    }
}

/// Left edge of a cell, padded cells inheriting the last real cell's.
fn cell_left(row: &[&Span], col: usize) -> Option<f32> {
    row.get(col).or_else(|| row.last()).map(|span| span.x0())
}

/// Most common row length; ties go to the larger length.
fn modal_length(rows: &[Vec<&Span>]) -> Option<usize> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(len, count)| (count, len))
        .map(|(len, _)| len)
}
