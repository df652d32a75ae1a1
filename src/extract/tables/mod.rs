//! Table candidate generation.
//!
//! Three independent strategies look at the same page and each proposes raw
//! candidates. Candidates are validated by [`super::normalize`] and merged by
//! [`super::dedup`] in strategy priority order.

mod alignment;
mod bordered;
mod grid;

pub use alignment::AlignmentStrategy;
pub use bordered::BorderedStrategy;
pub use grid::GridStrategy;

use crate::error::Result;
use crate::model::{ExtractionMethod, LineSegment, Span};
use crate::provider::PdfProvider;

use super::options::{ExtractOptions, StrategyKind};

/// Everything a strategy may look at for one page.
pub struct PageContext<'a> {
    /// Page number (1-indexed)
    pub page: u32,
    /// Spans in content order
    pub spans: &'a [Span],
    /// Line segments
    pub lines: &'a [LineSegment],
    /// Whether the lines form a regular border grid
    pub has_grid: bool,
    /// Provider, for strategies that call the grid extractor
    pub provider: &'a dyn PdfProvider,
}

/// A raw table proposed by a strategy, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Page number (1-indexed)
    pub page: u32,
    /// Cell text, possibly ragged
    pub data: Vec<Vec<String>>,
    /// Strategy tag
    pub method: ExtractionMethod,
    /// Whether visible borders delimit the table
    pub has_borders: bool,
}

impl Candidate {
    /// Create a candidate without borders.
    pub fn new(page: u32, data: Vec<Vec<String>>, method: ExtractionMethod) -> Self {
        Self {
            page,
            data,
            method,
            has_borders: false,
        }
    }

    /// Set the border flag.
    pub fn with_borders(mut self, has_borders: bool) -> Self {
        self.has_borders = has_borders;
        self
    }
}

/// A table detection strategy.
pub trait TableStrategy: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Propose candidates for one page.
    ///
    /// An error means the strategy failed on this page; the caller records it
    /// and continues with zero candidates.
    fn detect(&self, ctx: &PageContext<'_>) -> Result<Vec<Candidate>>;
}

/// Build the strategies in the configured priority order. Repeated kinds are
/// ignored.
pub fn build_strategies(options: &ExtractOptions) -> Vec<Box<dyn TableStrategy>> {
    let mut seen = Vec::new();
    let mut strategies: Vec<Box<dyn TableStrategy>> = Vec::new();
    for &kind in &options.strategy_order {
        if seen.contains(&kind) {
            continue;
        }
        seen.push(kind);
        strategies.push(match kind {
            StrategyKind::Bordered => Box::new(BorderedStrategy::from_options(options)),
            StrategyKind::Grid => Box::new(GridStrategy::from_options(options)),
            StrategyKind::TextAlignment => Box::new(AlignmentStrategy::from_options(options)),
        });
    }
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_strategies_order() {
        let options = ExtractOptions::default().with_strategy_order(vec![
            StrategyKind::TextAlignment,
            StrategyKind::Grid,
            StrategyKind::TextAlignment,
        ]);
        let kinds: Vec<_> = build_strategies(&options)
            .iter()
            .map(|s| s.kind())
            .collect();
        assert_eq!(kinds, vec![StrategyKind::TextAlignment, StrategyKind::Grid]);
    }

    #[test]
    fn test_default_strategies() {
        let kinds: Vec<_> = build_strategies(&ExtractOptions::default())
            .iter()
            .map(|s| s.kind())
            .collect();
        assert_eq!(kinds, StrategyKind::default_order());
    }
}
