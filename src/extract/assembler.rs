//! Document assembly.
//!
//! The assembler walks the selected pages once per concern: text, images,
//! then each table strategy in priority order. Every pass fills page-indexed
//! slots; [`Stage::Finalize`] flattens the slots into the [`Document`] lists
//! and wires the page back-references. Failures are recorded on the slot and
//! never stop the pass.

use std::mem;
use std::path::Path;

use chrono::Utc;
use rayon::prelude::*;

use super::dedup::dedup_tables;
use super::geometry::{group_rows, has_regular_grid};
use super::images::ImageCollector;
use super::normalize::TableNormalizer;
use super::options::{ExtractOptions, StrategyKind};
use super::tables::{build_strategies, PageContext, TableStrategy};
use crate::error::{ErrorKind, ExtractionError};
use crate::model::{Document, ImageAsset, LineSegment, Metadata, Page, Span, Table};
use crate::provider::{PageInfo, PdfProvider};

/// Assembly stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing done yet
    Init,
    /// Reading page geometry and spans
    TextPass,
    /// Collecting images
    ImagePass,
    /// Running one table strategy
    TablePass(StrategyKind),
    /// Merging table candidates across strategies
    Dedup,
    /// Building the document
    Finalize,
    /// Finished
    Done,
}

/// Everything gathered for one page before finalize.
#[derive(Debug)]
struct PageSlot {
    number: u32,
    /// False once the page itself failed to decode; later passes skip it
    decoded: bool,
    info: PageInfo,
    spans: Vec<Span>,
    text: String,
    lines: Vec<LineSegment>,
    has_grid: bool,
    images: Vec<ImageAsset>,
    tables: Vec<Table>,
    errors: Vec<ExtractionError>,
}

impl PageSlot {
    fn new(number: u32) -> Self {
        Self {
            number,
            decoded: true,
            info: PageInfo::default(),
            spans: Vec::new(),
            text: String::new(),
            lines: Vec::new(),
            has_grid: false,
            images: Vec::new(),
            tables: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Drives one extraction pass over a provider.
pub struct Assembler<'a> {
    provider: &'a dyn PdfProvider,
    options: &'a ExtractOptions,
    collector: ImageCollector,
    normalizer: TableNormalizer,
    stage: Stage,
}

impl<'a> Assembler<'a> {
    /// Create an assembler writing images into `output_dir`.
    pub fn new(provider: &'a dyn PdfProvider, output_dir: &Path, options: &'a ExtractOptions) -> Self {
        Self {
            provider,
            options,
            collector: ImageCollector::new(output_dir),
            normalizer: TableNormalizer::from_options(options),
            stage: Stage::Init,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage and return the document.
    pub fn run(mut self) -> Document {
        let started_at = Utc::now();
        let page_count = self.provider.page_count();
        let numbers = self.options.pages.resolve(page_count);
        log::debug!(
            "Assembler: {} of {} pages selected",
            numbers.len(),
            page_count
        );

        self.advance(Stage::TextPass);
        let mut slots: Vec<PageSlot> = numbers.into_iter().map(PageSlot::new).collect();
        self.for_each_page(&mut slots, |slot| self.text_pass(slot));

        if self.options.extract_images {
            self.advance(Stage::ImagePass);
            self.for_each_page(&mut slots, |slot| self.image_pass(slot));
        }

        if self.options.extract_tables {
            let strategies = build_strategies(self.options);
            if !strategies.is_empty() {
                self.for_each_page(&mut slots, |slot| self.load_lines(slot));
            }
            for strategy in &strategies {
                self.advance(Stage::TablePass(strategy.kind()));
                self.for_each_page(&mut slots, |slot| self.table_pass(slot, strategy.as_ref()));
            }

            self.advance(Stage::Dedup);
            for slot in &mut slots {
                slot.tables = dedup_tables(mem::take(&mut slot.tables));
            }
        }

        self.advance(Stage::Finalize);
        let mut doc = finalize(slots);
        doc.metadata.source = self.provider.source_name();
        doc.metadata.page_count = page_count;
        doc.metadata.started_at = Some(started_at);
        doc.metadata.finished_at = Some(Utc::now());

        self.advance(Stage::Done);
        doc
    }

    fn advance(&mut self, next: Stage) {
        log::debug!("Assembler: {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn for_each_page<F>(&self, slots: &mut [PageSlot], f: F)
    where
        F: Fn(&mut PageSlot) + Send + Sync,
    {
        if self.options.parallel {
            slots.par_iter_mut().for_each(f);
        } else {
            slots.iter_mut().for_each(f);
        }
    }

    fn text_pass(&self, slot: &mut PageSlot) {
        let page = slot.number;

        match self.provider.page_info(page) {
            Ok(info) => slot.info = info,
            Err(e) => {
                log::warn!("Page {}: cannot read page info: {}", page, e);
                slot.errors.push(
                    ExtractionError::new(ErrorKind::PageDecodeFailure, e.to_string(), "page_info")
                        .on_page(page),
                );
                slot.decoded = false;
                return;
            }
        }

        match self.provider.spans(page) {
            Ok(spans) => {
                slot.text = page_text(&spans, self.options.row_tolerance);
                slot.spans = spans;
            }
            Err(e) => {
                log::warn!("Page {}: cannot read text: {}", page, e);
                slot.errors.push(
                    ExtractionError::new(ErrorKind::PageDecodeFailure, e.to_string(), "spans")
                        .on_page(page),
                );
                slot.decoded = false;
            }
        }
    }

    fn image_pass(&self, slot: &mut PageSlot) {
        if !slot.decoded {
            return;
        }
        let result = self.collector.collect(self.provider, slot.number);
        slot.images = result.assets;
        slot.errors.extend(result.errors);
    }

    fn load_lines(&self, slot: &mut PageSlot) {
        if !slot.decoded {
            return;
        }
        match self.provider.lines(slot.number) {
            Ok(lines) => {
                slot.has_grid = has_regular_grid(
                    &lines,
                    self.options.line_min_length,
                    self.options.min_grid_gap,
                );
                slot.lines = lines;
            }
            Err(e) => {
                log::warn!("Page {}: cannot read line graphics: {}", slot.number, e);
                slot.errors.push(
                    ExtractionError::new(ErrorKind::TableStrategyFailure, e.to_string(), "lines")
                        .on_page(slot.number),
                );
            }
        }
    }

    fn table_pass(&self, slot: &mut PageSlot, strategy: &dyn TableStrategy) {
        if !slot.decoded {
            return;
        }
        let ctx = PageContext {
            page: slot.number,
            spans: &slot.spans,
            lines: &slot.lines,
            has_grid: slot.has_grid,
            provider: self.provider,
        };

        let candidates = match strategy.detect(&ctx) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("Page {}: {} strategy failed: {}", slot.number, strategy.kind(), e);
                slot.errors.push(
                    ExtractionError::new(ErrorKind::TableStrategyFailure, e.to_string(), "detect")
                        .on_page(slot.number)
                        .with_method(strategy.kind().to_string()),
                );
                return;
            }
        };

        for candidate in candidates {
            let method = candidate.method.to_string();
            match self.normalizer.accept(candidate) {
                Ok(table) => {
                    if let Some(ref message) = table.conversion_error {
                        log::warn!("Page {}: {} table not rendered: {}", slot.number, method, message);
                        slot.errors.push(
                            ExtractionError::new(ErrorKind::TableRenderFailure, message.clone(), "flatten")
                                .on_page(slot.number)
                                .with_method(&method),
                        );
                    }
                    slot.tables.push(table);
                }
                Err(rejection) => {
                    log::debug!("Page {}: {} candidate rejected: {}", slot.number, method, rejection);
                }
            }
        }
    }
}

/// Page text: spans grouped into visual rows, joined by spaces and newlines.
fn page_text(spans: &[Span], row_tolerance: f32) -> String {
    group_rows(spans, row_tolerance)
        .iter()
        .map(|row| {
            row.iter()
                .map(|span| span.text.trim())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flatten page slots into the document, in page order.
fn finalize(slots: Vec<PageSlot>) -> Document {
    let mut doc = Document::new();

    for slot in slots {
        let mut page = Page::new(slot.number, slot.info.bbox, slot.info.rotation);

        if !doc.text.is_empty() {
            doc.text.push('\n');
        }
        doc.text.push_str(&format!("[Page {}]\n", slot.number));
        let start = doc.text.len();
        doc.text.push_str(&slot.text);
        page.text_range = start..doc.text.len();
        doc.text.push('\n');

        let span_start = doc.positioned_text.len();
        doc.positioned_text.extend(slot.spans);
        page.span_range = span_start..doc.positioned_text.len();

        for image in slot.images {
            page.image_indices.push(doc.images.len());
            doc.images.push(image);
        }

        for mut table in slot.tables {
            page.table_indices.push(doc.tables.len());
            table.id = format!("table_{}", doc.tables.len() + 1);
            doc.tables.push(table);
        }

        doc.metadata.text_length += slot.text.chars().count();
        doc.errors.extend(slot.errors);
        doc.pages.push(page);
    }

    let mut metadata = Metadata {
        image_count: doc.images.len(),
        table_count: doc.tables.len(),
        error_count: doc.errors.len(),
        text_length: doc.metadata.text_length,
        ..Default::default()
    };
    for table in &doc.tables {
        *metadata
            .tables_by_method
            .entry(table.extraction_method.to_string())
            .or_insert(0) += 1;
    }
    doc.metadata = metadata;
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;
    use crate::provider::{DocumentSnapshot, PageSnapshot, SnapshotProvider};

    fn span(text: &str, x: f32, y: f32) -> Span {
        Span::new(text, BBox::new(x, y, x + 40.0, y + 10.0))
    }

    fn provider() -> SnapshotProvider {
        let page1 = PageSnapshot::new(1).with_spans(vec![
            span("Name", 50.0, 100.0),
            span("Age", 200.0, 100.0),
            span("Alice", 50.0, 120.0),
            span("30", 200.0, 120.0),
            span("Bob", 50.0, 140.0),
            span("25", 200.0, 140.0),
        ]);
        let page2 = PageSnapshot::new(2).with_span(span("Closing words", 50.0, 100.0));
        SnapshotProvider::from_snapshot(DocumentSnapshot::new().with_page(page1).with_page(page2))
            .unwrap()
    }

    #[test]
    fn test_page_text_rows() {
        let spans = vec![span("world", 100.0, 10.0), span("hello", 10.0, 11.0), span("next", 10.0, 40.0)];
        assert_eq!(page_text(&spans, 5.0), "hello world\nnext");
        assert_eq!(page_text(&[], 5.0), "");
    }

    #[test]
    fn test_run_builds_document() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider();
        let options = ExtractOptions::default();
        let doc = Assembler::new(&provider, dir.path(), &options).run();

        assert_eq!(doc.pages.len(), 2);
        assert!(doc.errors.is_empty());
        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].id, "table_1");
        assert_eq!(doc.pages[0].table_indices, vec![0]);
        assert_eq!(doc.page_text(&doc.pages[1]), "Closing words");
        assert!(doc.text.starts_with("[Page 1]\nName Age\nAlice 30\nBob 25\n"));
        assert!(doc.text.contains("[Page 2]\nClosing words"));
        assert_eq!(doc.page_spans(&doc.pages[0]).len(), 6);
        assert_eq!(doc.metadata.table_count, 1);
        assert_eq!(doc.metadata.tables_by_method.get("text_alignment"), Some(&1));
        assert!(doc.metadata.duration_ms().is_some());
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider();
        let parallel = ExtractOptions::default();
        let sequential = ExtractOptions::default().with_parallel(false);
        let a = Assembler::new(&provider, dir.path(), &parallel).run();
        let b = Assembler::new(&provider, dir.path(), &sequential).run();
        assert_eq!(a.text, b.text);
        assert_eq!(a.tables, b.tables);
        assert_eq!(a.pages, b.pages);
    }

    #[test]
    fn test_page_selection_and_switches() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider();
        let options = ExtractOptions::default()
            .with_page_range(2..=2)
            .with_tables(false);
        let doc = Assembler::new(&provider, dir.path(), &options).run();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].number, 2);
        assert_eq!(doc.metadata.page_count, 2);
        assert!(doc.tables.is_empty());
    }

    #[test]
    fn test_stage_starts_at_init() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider();
        let options = ExtractOptions::default();
        let assembler = Assembler::new(&provider, dir.path(), &options);
        assert_eq!(assembler.stage(), Stage::Init);
    }
}
