//! Extraction options and configuration.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::provider::ToleranceProfile;

/// Options for an extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Minimum fill ratio for any accepted table
    pub fill_ratio: f32,

    /// Minimum fill ratio for text-alignment candidates
    pub text_fill_ratio: f32,

    /// Maximum column deviation for text-alignment tables (points)
    pub column_tolerance: f32,

    /// Y tolerance for grouping spans into rows (points)
    pub row_tolerance: f32,

    /// Header rule: row 0 chars must exceed this share of the mean body row
    pub header_ratio: f32,

    /// Grid-extractor tolerance profiles, tried in order
    pub grid_profiles: Vec<ToleranceProfile>,

    /// How grid profiles combine
    pub grid_mode: GridMode,

    /// Table strategies in priority order
    pub strategy_order: Vec<StrategyKind>,

    /// When the text-alignment strategy runs
    pub alignment_pass: AlignmentPass,

    /// Minimum length for a line to count as a border
    pub line_min_length: f32,

    /// Minimum spacing between consecutive border lines
    pub min_grid_gap: f32,

    /// Margin around a bordered zone when assigning spans
    pub zone_margin: f32,

    /// Process pages on the rayon thread pool
    pub parallel: bool,

    /// Page selection
    #[serde(skip)]
    pub pages: PageSelection,

    /// Run the image pass
    pub extract_images: bool,

    /// Run the table passes
    pub extract_tables: bool,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum fill ratio.
    pub fn with_fill_ratio(mut self, ratio: f32) -> Self {
        self.fill_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the minimum fill ratio for text-alignment tables.
    pub fn with_text_fill_ratio(mut self, ratio: f32) -> Self {
        self.text_fill_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the column alignment tolerance.
    pub fn with_column_tolerance(mut self, tolerance: f32) -> Self {
        self.column_tolerance = tolerance;
        self
    }

    /// Set the row grouping tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f32) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the header detection ratio.
    pub fn with_header_ratio(mut self, ratio: f32) -> Self {
        self.header_ratio = ratio;
        self
    }

    /// Set the grid profiles.
    pub fn with_grid_profiles(mut self, profiles: Vec<ToleranceProfile>) -> Self {
        self.grid_profiles = profiles;
        self
    }

    /// Set the grid mode.
    pub fn with_grid_mode(mut self, mode: GridMode) -> Self {
        self.grid_mode = mode;
        self
    }

    /// Set the strategy priority order.
    pub fn with_strategy_order(mut self, order: Vec<StrategyKind>) -> Self {
        self.strategy_order = order;
        self
    }

    /// Set when the text-alignment strategy runs.
    pub fn with_alignment_pass(mut self, pass: AlignmentPass) -> Self {
        self.alignment_pass = pass;
        self
    }

    /// Set the minimum border line length.
    pub fn with_line_min_length(mut self, length: f32) -> Self {
        self.line_min_length = length;
        self
    }

    /// Set the minimum grid gap.
    pub fn with_min_grid_gap(mut self, gap: f32) -> Self {
        self.min_grid_gap = gap;
        self
    }

    /// Set the bordered zone margin.
    pub fn with_zone_margin(mut self, margin: f32) -> Self {
        self.zone_margin = margin;
        self
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.pages = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.pages = PageSelection::Range(range);
        self
    }

    /// Enable or disable the image pass.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable the table passes.
    pub fn with_tables(mut self, extract: bool) -> Self {
        self.extract_tables = extract;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fill_ratio: 0.30,
            text_fill_ratio: 0.40,
            column_tolerance: 20.0,
            row_tolerance: 5.0,
            header_ratio: 0.7,
            grid_profiles: ToleranceProfile::defaults(),
            grid_mode: GridMode::FirstSuccess,
            strategy_order: StrategyKind::default_order(),
            alignment_pass: AlignmentPass::Always,
            line_min_length: 20.0,
            min_grid_gap: 5.0,
            zone_margin: 5.0,
            parallel: true,
            pages: PageSelection::All,
            extract_images: true,
            extract_tables: true,
        }
    }
}

/// How the grid strategy combines its tolerance profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    /// Stop at the first profile returning at least one table
    #[default]
    FirstSuccess,
    /// Keep every profile's output and let deduplication merge them
    AccumulateAll,
}

/// When the text-alignment strategy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPass {
    /// On every page
    #[default]
    Always,
    /// Only on pages without a regular border grid
    WhenNoGrid,
}

/// Table detection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Border lines plus span assignment
    Bordered,
    /// External grid extractor
    Grid,
    /// Text alignment only
    TextAlignment,
}

impl StrategyKind {
    /// Bordered, then grid, then text alignment.
    pub fn default_order() -> Vec<Self> {
        vec![
            StrategyKind::Bordered,
            StrategyKind::Grid,
            StrategyKind::TextAlignment,
        ]
    }

    /// Parse a strategy name ("bordered", "grid", "text").
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bordered" | "bordered_hybrid" => Ok(StrategyKind::Bordered),
            "grid" => Ok(StrategyKind::Grid),
            "text" | "text_alignment" | "alignment" => Ok(StrategyKind::TextAlignment),
            other => Err(format!("Unknown strategy: {}", other)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Bordered => f.write_str("bordered"),
            StrategyKind::Grid => f.write_str("grid"),
            StrategyKind::TextAlignment => f.write_str("text_alignment"),
        }
    }
}

/// Page selection for extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Extract all pages
    #[default]
    All,
    /// Extract a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Extract specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.binary_search(&page).is_ok(),
        }
    }

    /// Selected page numbers out of `1..=page_count`, ascending.
    pub fn resolve(&self, page_count: u32) -> Vec<u32> {
        (1..=page_count).filter(|&p| self.includes(p)).collect()
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page(start)?;
                let end = parse_page(end)?;
                if start > end {
                    return Err(format!("Invalid page range: {}", s));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page(start)?;
                let end = parse_page(end)?;
                if start > end {
                    return Err(format!("Invalid page range: {}", part));
                }
                pages.extend(start..=end);
            } else {
                pages.push(parse_page(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("Invalid page number: {}", s.trim())),
        Ok(p) => Ok(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.fill_ratio, 0.30);
        assert_eq!(options.text_fill_ratio, 0.40);
        assert_eq!(options.column_tolerance, 20.0);
        assert_eq!(options.row_tolerance, 5.0);
        assert_eq!(options.grid_mode, GridMode::FirstSuccess);
        assert_eq!(options.alignment_pass, AlignmentPass::Always);
        assert_eq!(options.strategy_order, StrategyKind::default_order());
        assert_eq!(options.grid_profiles.len(), 4);
        assert!(options.parallel);
    }

    #[test]
    fn test_builder() {
        let options = ExtractOptions::new()
            .with_fill_ratio(1.5)
            .with_grid_mode(GridMode::AccumulateAll)
            .with_parallel(false)
            .with_images(false)
            .with_page_range(2..=3);
        assert_eq!(options.fill_ratio, 1.0);
        assert_eq!(options.grid_mode, GridMode::AccumulateAll);
        assert!(!options.parallel);
        assert!(!options.extract_images);
        assert!(options.pages.includes(2));
        assert!(!options.pages.includes(4));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("2-4").unwrap(), PageSelection::Range(2..=4));
        assert_eq!(
            PageSelection::parse("5, 1-3,3").unwrap(),
            PageSelection::Pages(vec![1, 2, 3, 5])
        );
        assert!(PageSelection::parse("0").is_err());
        assert!(PageSelection::parse("4-2").is_err());
        assert!(PageSelection::parse("x").is_err());
    }

    #[test]
    fn test_page_selection_resolve() {
        assert_eq!(PageSelection::All.resolve(3), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(2..=9).resolve(3), vec![2, 3]);
        assert_eq!(PageSelection::Pages(vec![1, 3]).resolve(2), vec![1]);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(StrategyKind::parse("Grid").unwrap(), StrategyKind::Grid);
        assert_eq!(StrategyKind::parse("text").unwrap(), StrategyKind::TextAlignment);
        assert!(StrategyKind::parse("ocr").is_err());
    }
}
