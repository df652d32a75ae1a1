//! Grid-based candidates from the external grid extractor.

use super::{Candidate, PageContext, TableStrategy};
use crate::error::Result;
use crate::extract::options::{ExtractOptions, GridMode, StrategyKind};
use crate::model::ExtractionMethod;
use crate::provider::{RawMatrix, ToleranceProfile};

/// Runs the grid extractor under each tolerance profile.
pub struct GridStrategy {
    profiles: Vec<ToleranceProfile>,
    mode: GridMode,
}

impl GridStrategy {
    /// Create a strategy with explicit profiles.
    pub fn new(profiles: Vec<ToleranceProfile>, mode: GridMode) -> Self {
        Self { profiles, mode }
    }

    /// Create a strategy from extraction options.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(options.grid_profiles.clone(), options.grid_mode)
    }
}

impl TableStrategy for GridStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Grid
    }

    fn detect(&self, ctx: &PageContext<'_>) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for profile in &self.profiles {
            let raw = ctx.provider.grid_tables(ctx.page, profile)?;
            if raw.is_empty() {
                continue;
            }

            log::debug!(
                "Page {}: grid profile '{}' returned {} tables",
                ctx.page,
                profile.name,
                raw.len()
            );

            let has_borders = profile.is_lines_based() && ctx.has_grid;
            candidates.extend(raw.into_iter().map(|matrix| {
                Candidate::new(
                    ctx.page,
                    fill_missing(matrix),
                    ExtractionMethod::grid(&profile.name),
                )
                .with_borders(has_borders)
            }));

            if self.mode == GridMode::FirstSuccess {
                break;
            }
        }

        Ok(candidates)
    }
}

/// Replace missing cells with empty strings.
fn fill_missing(matrix: RawMatrix) -> Vec<Vec<String>> {
    matrix
        .into_iter()
        .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
        .collect()
}
