//! Table types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which strategy produced a table.
///
/// Serialized as a short tag: `bordered_hybrid`, `grid:<profile>` or
/// `text_alignment`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ExtractionMethod {
    /// Border lines delimit the zone, text spans fill the cells
    BorderedHybrid,
    /// External grid extractor run with the named tolerance profile
    Grid {
        /// Tolerance profile name
        profile: String,
    },
    /// Reconstructed purely from text alignment
    TextAlignment,
}

impl ExtractionMethod {
    /// Grid method for the given profile.
    pub fn grid(profile: impl Into<String>) -> Self {
        ExtractionMethod::Grid {
            profile: profile.into(),
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::BorderedHybrid => f.write_str("bordered_hybrid"),
            ExtractionMethod::Grid { profile } => write!(f, "grid:{}", profile),
            ExtractionMethod::TextAlignment => f.write_str("text_alignment"),
        }
    }
}

impl FromStr for ExtractionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bordered_hybrid" => Ok(ExtractionMethod::BorderedHybrid),
            "text_alignment" => Ok(ExtractionMethod::TextAlignment),
            _ => match s.strip_prefix("grid:") {
                Some(profile) if !profile.is_empty() => Ok(ExtractionMethod::grid(profile)),
                _ => Err(format!("unknown extraction method: {}", s)),
            },
        }
    }
}

impl From<ExtractionMethod> for String {
    fn from(method: ExtractionMethod) -> Self {
        method.to_string()
    }
}

impl TryFrom<String> for ExtractionMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A validated, rectangular table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Document-wide identifier (assigned at finalize)
    pub id: String,

    /// Page number (1-indexed)
    pub page: u32,

    /// Cell text, `rows × columns`
    pub data: Vec<Vec<String>>,

    /// Number of rows
    pub rows: usize,

    /// Number of columns
    pub columns: usize,

    /// Whether row 0 looks like a header
    pub has_headers: bool,

    /// Whether visible border lines delimit the table
    pub has_borders: bool,

    /// Strategy that produced the table
    pub extraction_method: ExtractionMethod,

    /// Delimited text rendering
    pub flattened_text: Option<String>,

    /// Why `flattened_text` is missing, if rendering failed
    pub conversion_error: Option<String>,
}

impl Table {
    /// Build a table from an already rectangular matrix.
    pub fn from_matrix(page: u32, data: Vec<Vec<String>>, method: ExtractionMethod) -> Self {
        let rows = data.len();
        let columns = data.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            id: String::new(),
            page,
            data,
            rows,
            columns,
            has_headers: false,
            has_borders: false,
            extraction_method: method,
            flattened_text: None,
            conversion_error: None,
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Header row, if detected.
    pub fn header(&self) -> Option<&[String]> {
        if self.has_headers {
            self.data.first().map(Vec::as_slice)
        } else {
            None
        }
    }

    /// Body rows (non-header).
    pub fn body(&self) -> &[Vec<String>] {
        if self.has_headers && !self.data.is_empty() {
            &self.data[1..]
        } else {
            &self.data
        }
    }

    /// Whether every row has exactly `columns` cells and `rows` matches the data.
    pub fn is_rectangular(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.columns)
    }

    /// Fraction of non-empty cells.
    pub fn fill_ratio(&self) -> f32 {
        fill_ratio(&self.data)
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.data
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Fraction of non-empty (after trimming) cells over `rows × max columns`.
pub fn fill_ratio(data: &[Vec<String>]) -> f32 {
    let columns = data.iter().map(Vec::len).max().unwrap_or(0);
    let total = data.len() * columns;
    if total == 0 {
        return 0.0;
    }
    let filled = data
        .iter()
        .flat_map(|row| row.iter())
        .filter(|cell| !cell.trim().is_empty())
        .count();
    filled as f32 / total as f32
}
