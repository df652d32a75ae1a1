//! Document-level types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ImageAsset, Page, Span, Table};
use crate::error::{ErrorKind, ExtractionError};

/// The reconstructed document.
///
/// Built once per input by the assembler and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Page-tagged text of every page
    pub text: String,

    /// All spans, in page order
    pub positioned_text: Vec<Span>,

    /// Accepted tables, in page order
    pub tables: Vec<Table>,

    /// Deduplicated images, in page order
    pub images: Vec<ImageAsset>,

    /// Pages in the document
    pub pages: Vec<Page>,

    /// Summary metadata
    pub metadata: Metadata,

    /// Every recorded non-fatal failure
    pub errors: Vec<ExtractionError>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty document returned when the provider cannot open the input.
    pub fn open_failure(message: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.errors.push(ExtractionError::new(
            ErrorKind::ProviderOpenFailure,
            message,
            "open",
        ));
        doc.metadata.error_count = 1;
        doc
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == page_num)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Text of one page (without the page tag).
    pub fn page_text(&self, page: &Page) -> &str {
        self.text.get(page.text_range.clone()).unwrap_or_default()
    }

    /// Spans of one page.
    pub fn page_spans(&self, page: &Page) -> &[Span] {
        self.positioned_text
            .get(page.span_range.clone())
            .unwrap_or_default()
    }

    /// Tables of one page.
    pub fn page_tables<'a>(&'a self, page: &'a Page) -> impl Iterator<Item = &'a Table> + 'a {
        page.table_indices.iter().filter_map(|&i| self.tables.get(i))
    }

    /// Images of one page.
    pub fn page_images<'a>(&'a self, page: &'a Page) -> impl Iterator<Item = &'a ImageAsset> + 'a {
        page.image_indices.iter().filter_map(|&i| self.images.get(i))
    }

    /// Errors recorded for one page.
    pub fn errors_for_page(&self, page_num: u32) -> impl Iterator<Item = &ExtractionError> {
        self.errors.iter().filter(move |e| e.page == Some(page_num))
    }

    /// Whether the document could not be opened.
    pub fn is_open_failure(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind == ErrorKind::ProviderOpenFailure)
    }

    /// Whether any page produced text.
    pub fn has_text(&self) -> bool {
        self.positioned_text.iter().any(|s| !s.text.trim().is_empty())
    }

    /// Whether any table was accepted.
    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    /// Whether any image was kept.
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Get plain text content of the entire document, without page tags.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| self.page_text(page))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Summary metadata computed at finalize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Input name, if known
    pub source: Option<String>,

    /// Total number of pages reported by the provider
    pub page_count: u32,

    /// Number of kept images
    pub image_count: usize,

    /// Number of accepted tables
    pub table_count: usize,

    /// Characters of page text (tags excluded)
    pub text_length: usize,

    /// Number of recorded errors
    pub error_count: usize,

    /// Accepted tables per extraction method tag
    pub tables_by_method: BTreeMap<String, usize>,

    /// When the extraction pass started
    pub started_at: Option<DateTime<Utc>>,

    /// When the extraction pass finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Wall-clock duration of the extraction pass, in milliseconds.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, ExtractionMethod};

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(!doc.has_text());
        assert!(!doc.is_open_failure());
    }

    #[test]
    fn test_open_failure() {
        let doc = Document::open_failure("no such file");
        assert!(doc.is_open_failure());
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(doc.errors[0].page, None);
        assert!(doc.pages.is_empty());
    }

    #[test]
    fn test_page_back_references() {
        let mut doc = Document::new();
        doc.text = "[Page 1]\nhello\n\n".to_string();
        doc.positioned_text
            .push(Span::new("hello", BBox::new(0.0, 0.0, 20.0, 10.0)));
        doc.tables.push(Table::from_matrix(
            1,
            vec![vec!["a".into(), "b".into()], vec!["c".into(), "d".into()]],
            ExtractionMethod::TextAlignment,
        ));

        let mut page = Page::letter(1);
        page.text_range = 9..14;
        page.span_range = 0..1;
        page.table_indices = vec![0];
        doc.pages.push(page);

        let page = doc.get_page(1).unwrap();
        assert_eq!(doc.page_text(page), "hello");
        assert_eq!(doc.page_spans(page).len(), 1);
        assert_eq!(doc.page_tables(page).count(), 1);
        assert_eq!(doc.page_images(page).count(), 0);
        assert_eq!(doc.plain_text(), "hello");
    }

    #[test]
    fn test_duration() {
        let mut metadata = Metadata::default();
        assert_eq!(metadata.duration_ms(), None);
        let start = Utc::now();
        metadata.started_at = Some(start);
        metadata.finished_at = Some(start + chrono::Duration::milliseconds(42));
        assert_eq!(metadata.duration_ms(), Some(42));
    }
}
