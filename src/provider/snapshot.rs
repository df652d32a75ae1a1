//! Provider backed by a JSON dump of page primitives.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ImageSource, PageInfo, PdfProvider, RawImage, RawMatrix, ToleranceProfile};
use crate::error::{Error, Result};
use crate::model::{BBox, LineSegment, Span};

/// All primitives of one document, as dumped by an upstream engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Input name (usually the PDF file name)
    #[serde(default)]
    pub source: Option<String>,

    /// Image source names, highest priority first
    #[serde(default = "default_image_sources")]
    pub image_sources: Vec<String>,

    /// Pages, 1-indexed
    #[serde(default)]
    pub pages: Vec<PageSnapshot>,
}

fn default_image_sources() -> Vec<String> {
    vec!["primary".to_string(), "fallback".to_string()]
}

impl DocumentSnapshot {
    /// Create an empty snapshot with the default image sources.
    pub fn new() -> Self {
        Self {
            source: None,
            image_sources: default_image_sources(),
            pages: Vec::new(),
        }
    }

    /// Add a page.
    pub fn with_page(mut self, page: PageSnapshot) -> Self {
        self.pages.push(page);
        self
    }

    /// Set the image source order.
    pub fn with_image_sources<S: Into<String>>(mut self, sources: impl IntoIterator<Item = S>) -> Self {
        self.image_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Primitives of a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page box; Letter size when absent
    #[serde(default)]
    pub bbox: Option<BBox>,

    /// Rotation in degrees
    #[serde(default)]
    pub rotation: u16,

    /// Text spans in content order
    #[serde(default)]
    pub spans: Vec<Span>,

    /// Line and rectangle edges
    #[serde(default)]
    pub lines: Vec<LineSegment>,

    /// Raw images keyed by source name
    #[serde(default)]
    pub images: BTreeMap<String, Vec<RawImage>>,

    /// Grid-extractor output keyed by tolerance profile name
    #[serde(default)]
    pub grid_tables: BTreeMap<String, Vec<RawMatrix>>,
}

impl PageSnapshot {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Set the page box.
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Add a span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    /// Add several spans.
    pub fn with_spans(mut self, spans: impl IntoIterator<Item = Span>) -> Self {
        self.spans.extend(spans);
        self
    }

    /// Add a line segment.
    pub fn with_line(mut self, line: LineSegment) -> Self {
        self.lines.push(line);
        self
    }

    /// Add several line segments.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = LineSegment>) -> Self {
        self.lines.extend(lines);
        self
    }

    /// Add an image under a source.
    pub fn with_image(mut self, source: impl Into<String>, image: RawImage) -> Self {
        self.images.entry(source.into()).or_default().push(image);
        self
    }

    /// Add a grid-extractor matrix under a profile.
    pub fn with_grid_table(mut self, profile: impl Into<String>, matrix: RawMatrix) -> Self {
        self.grid_tables.entry(profile.into()).or_default().push(matrix);
        self
    }
}

/// [`PdfProvider`] serving a [`DocumentSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    snapshot: DocumentSnapshot,
}

impl SnapshotProvider {
    /// Load a snapshot file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::Open(format!("{}: {}", path.display(), e)))?;
        let mut provider = Self::from_bytes(&data)?;
        if provider.snapshot.source.is_none() {
            provider.snapshot.source = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string());
        }
        Ok(provider)
    }

    /// Load a snapshot from JSON bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let snapshot: DocumentSnapshot = serde_json::from_slice(data)?;
        Self::from_snapshot(snapshot)
    }

    /// Load a snapshot from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Serve an in-memory snapshot.
    ///
    /// Fails when a page is numbered 0 or a number appears twice.
    pub fn from_snapshot(mut snapshot: DocumentSnapshot) -> Result<Self> {
        snapshot.pages.sort_by_key(|p| p.number);
        if snapshot.pages.first().is_some_and(|p| p.number == 0) {
            return Err(Error::Open("page numbers are 1-indexed".to_string()));
        }
        if let Some(pair) = snapshot.pages.windows(2).find(|w| w[0].number == w[1].number) {
            return Err(Error::Open(format!("duplicate page {}", pair[0].number)));
        }
        Ok(Self { snapshot })
    }

    /// The underlying snapshot.
    pub fn snapshot(&self) -> &DocumentSnapshot {
        &self.snapshot
    }

    fn page(&self, page: u32) -> Result<&PageSnapshot> {
        self.snapshot
            .pages
            .binary_search_by_key(&page, |p| p.number)
            .map(|i| &self.snapshot.pages[i])
            .map_err(|_| Error::PageDecode(page, "page missing from snapshot".to_string()))
    }
}

impl PdfProvider for SnapshotProvider {
    fn page_count(&self) -> u32 {
        self.snapshot.pages.last().map(|p| p.number).unwrap_or(0)
    }

    fn page_info(&self, page: u32) -> Result<PageInfo> {
        let snap = self.page(page)?;
        let mut info = PageInfo::default();
        if let Some(bbox) = snap.bbox {
            info.bbox = bbox;
        }
        info.rotation = snap.rotation;
        Ok(info)
    }

    fn spans(&self, page: u32) -> Result<Vec<Span>> {
        Ok(self.page(page)?.spans.clone())
    }

    fn lines(&self, page: u32) -> Result<Vec<LineSegment>> {
        Ok(self.page(page)?.lines.clone())
    }

    fn image_sources(&self) -> Vec<ImageSource> {
        self.snapshot
            .image_sources
            .iter()
            .map(ImageSource::new)
            .collect()
    }

    fn raw_images(&self, page: u32, source: &ImageSource) -> Result<Vec<RawImage>> {
        Ok(self
            .page(page)?
            .images
            .get(&source.name)
            .cloned()
            .unwrap_or_default())
    }

    fn grid_tables(&self, page: u32, profile: &ToleranceProfile) -> Result<Vec<RawMatrix>> {
        Ok(self
            .page(page)?
            .grid_tables
            .get(&profile.name)
            .cloned()
            .unwrap_or_default())
    }

    fn source_name(&self) -> Option<String> {
        self.snapshot.source.clone()
    }
}

/// Serde adapter storing bytes as a base64 string.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentSnapshot {
        DocumentSnapshot::new()
            .with_page(
                PageSnapshot::new(2)
                    .with_span(Span::new("two", BBox::new(0.0, 0.0, 10.0, 10.0)))
                    .with_grid_table("strict-lines", vec![vec![Some("a".into()), None]]),
            )
            .with_page(
                PageSnapshot::new(1)
                    .with_bbox(BBox::new(0.0, 0.0, 595.0, 842.0))
                    .with_image("primary", RawImage::new(vec![1, 2, 3], "png")),
            )
    }

    #[test]
    fn test_pages_are_sorted_and_served() {
        let provider = SnapshotProvider::from_snapshot(sample()).unwrap();
        assert_eq!(provider.page_count(), 2);
        assert_eq!(provider.page_info(1).unwrap().bbox.width(), 595.0);
        assert_eq!(provider.page_info(2).unwrap().bbox.width(), 612.0);
        assert_eq!(provider.spans(2).unwrap()[0].text, "two");
        assert!(provider.spans(1).unwrap().is_empty());
    }

    #[test]
    fn test_missing_page_is_decode_error() {
        let provider = SnapshotProvider::from_snapshot(sample()).unwrap();
        assert!(matches!(provider.spans(7), Err(Error::PageDecode(7, _))));
    }

    #[test]
    fn test_images_and_grid_lookup() {
        let provider = SnapshotProvider::from_snapshot(sample()).unwrap();
        let primary = provider.raw_images(1, &ImageSource::primary()).unwrap();
        assert_eq!(primary.len(), 1);
        assert!(provider
            .raw_images(1, &ImageSource::fallback())
            .unwrap()
            .is_empty());

        let grids = provider
            .grid_tables(2, &ToleranceProfile::strict_lines())
            .unwrap();
        assert_eq!(grids[0][0], vec![Some("a".to_string()), None]);
        assert!(provider
            .grid_tables(2, &ToleranceProfile::text())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_json_round_trip_keeps_image_bytes() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"AQID\""));
        let provider = SnapshotProvider::from_bytes(json.as_bytes()).unwrap();
        let images = provider.raw_images(1, &ImageSource::primary()).unwrap();
        assert_eq!(images[0].data, vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_snapshots_are_rejected() {
        assert!(SnapshotProvider::from_bytes(b"not json").is_err());

        let dup = DocumentSnapshot::new()
            .with_page(PageSnapshot::new(1))
            .with_page(PageSnapshot::new(1));
        assert!(matches!(
            SnapshotProvider::from_snapshot(dup),
            Err(Error::Open(_))
        ));

        let zero = DocumentSnapshot::new().with_page(PageSnapshot::new(0));
        assert!(SnapshotProvider::from_snapshot(zero).is_err());
    }

    #[test]
    fn test_default_image_sources() {
        let provider = SnapshotProvider::from_bytes(br#"{"pages": []}"#).unwrap();
        assert_eq!(
            provider.image_sources(),
            vec![ImageSource::primary(), ImageSource::fallback()]
        );
        assert_eq!(provider.page_count(), 0);
    }
}
