//! Table validation and normalization.

use std::fmt;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::options::ExtractOptions;
use super::tables::Candidate;
use crate::model::{fill_ratio, Table};
use crate::render;

/// Why a candidate was not accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Fewer than two rows or two columns after cleanup
    TooSmall {
        /// Rows left
        rows: usize,
        /// Columns left
        columns: usize,
    },
    /// Too many empty cells
    SparseFill(f32),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooSmall { rows, columns } => write!(f, "too small ({}x{})", rows, columns),
            Rejection::SparseFill(ratio) => write!(f, "sparse fill ({:.2})", ratio),
        }
    }
}

/// Turns raw candidates into validated, rectangular tables.
pub struct TableNormalizer {
    fill_ratio: f32,
    header_ratio: f32,
    line_break_regex: Regex,
}

impl TableNormalizer {
    /// Create a normalizer with explicit thresholds.
    pub fn new(fill_ratio: f32, header_ratio: f32) -> Self {
        Self {
            fill_ratio,
            header_ratio,
            line_break_regex: Regex::new(r"\s*\n\s*").unwrap(),
        }
    }

    /// Create a normalizer from extraction options.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(options.fill_ratio, options.header_ratio)
    }

    /// Clean a single cell.
    pub fn clean_cell(&self, cell: &str) -> String {
        let nfc: String = cell.nfc().collect();
        self.line_break_regex
            .replace_all(&nfc, " ")
            .trim()
            .to_string()
    }

    /// Clean cells, drop blank rows and pad every row to the widest one.
    ///
    /// Running this on its own output returns the input unchanged.
    pub fn normalize_matrix(&self, data: Vec<Vec<String>>) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|row| row.iter().map(|cell| self.clean_cell(cell)).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(columns, String::new());
        }
        rows
    }

    /// Whether row 0 looks like a header.
    ///
    /// Approximate: row 0 must carry more than `header_ratio` times the mean
    /// character count of the remaining rows.
    pub fn detect_header(&self, data: &[Vec<String>]) -> bool {
        let Some((first, rest)) = data.split_first() else {
            return false;
        };
        if rest.is_empty() {
            return false;
        }
        let chars = |row: &Vec<String>| row.iter().map(|c| c.chars().count()).sum::<usize>();
        let mean = rest.iter().map(chars).sum::<usize>() as f32 / rest.len() as f32;
        chars(first) as f32 > self.header_ratio * mean
    }

    /// Validate a candidate and build the table.
    ///
    /// A failed text rendering does not reject the table; it is stored in
    /// `conversion_error` instead.
    pub fn accept(&self, candidate: Candidate) -> Result<Table, Rejection> {
        let data = self.normalize_matrix(candidate.data);
        let rows = data.len();
        let columns = data.first().map(Vec::len).unwrap_or(0);
        if rows < 2 || columns < 2 {
            return Err(Rejection::TooSmall { rows, columns });
        }

        let ratio = fill_ratio(&data);
        if ratio < self.fill_ratio {
            return Err(Rejection::SparseFill(ratio));
        }

        let has_headers = self.detect_header(&data);
        let mut table = Table::from_matrix(candidate.page, data, candidate.method);
        table.has_headers = has_headers;
        table.has_borders = candidate.has_borders;

        match render::to_csv(&table) {
            Ok(text) => table.flattened_text = Some(text),
            Err(e) => table.conversion_error = Some(e.to_string()),
        }

        Ok(table)
    }
}

impl Default for TableNormalizer {
    fn default() -> Self {
        Self::new(0.30, 0.7)
    }
}
