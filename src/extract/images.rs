//! Image collection across provider sources.
//!
//! Each page asks every source in priority order for its raw payloads. A
//! payload is decoded, fingerprinted over its decoded pixels, and kept only
//! if no earlier image on the same page had the same fingerprint. Kept images
//! are written to the output directory with their original bytes.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{ErrorKind, ExtractionError, Result};
use crate::model::{detect_format, ColorMode, ImageAsset};
use crate::provider::{ImageSource, PdfProvider, RawImage};

/// Images kept on one page and the failures met on the way.
#[derive(Debug, Default)]
pub struct PageImages {
    /// Kept images, in source priority then source order
    pub assets: Vec<ImageAsset>,
    /// Per-image and per-source failures
    pub errors: Vec<ExtractionError>,
}

/// Collects and stores the images of a page.
pub struct ImageCollector {
    output_dir: PathBuf,
}

impl ImageCollector {
    /// Create a collector writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Output directory for stored images.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Collect the images of one page from every source.
    ///
    /// Sources that cannot list their images on this page are reported
    /// together as a single error.
    pub fn collect(&self, provider: &dyn PdfProvider, page: u32) -> PageImages {
        let mut result = PageImages::default();
        let sources = provider.image_sources();
        let stems = source_stems(&sources);
        let mut failed: Vec<(&str, String)> = Vec::new();

        for (source, stem) in sources.iter().zip(&stems) {
            let raws = match provider.raw_images(page, source) {
                Ok(raws) => raws,
                Err(e) => {
                    log::warn!("Page {}: image source '{}' failed: {}", page, source.name, e);
                    failed.push((source.name.as_str(), e.to_string()));
                    continue;
                }
            };

            for (i, raw) in raws.iter().enumerate() {
                let index = i + 1;
                match self.process(page, source, stem, index, raw, &result.assets) {
                    Ok(Some(asset)) => result.assets.push(asset),
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!(
                            "Page {}: image {} from '{}' failed: {}",
                            page,
                            index,
                            source.name,
                            e
                        );
                        result.errors.push(
                            ExtractionError::new(
                                ErrorKind::ImageDecodeFailure,
                                e.to_string(),
                                format!("image {}", index),
                            )
                            .on_page(page)
                            .with_method(&source.name),
                        );
                    }
                }
            }
        }

        if let Some((_, message)) = failed.first() {
            let names: Vec<&str> = failed.iter().map(|(name, _)| *name).collect();
            result.errors.push(
                ExtractionError::new(ErrorKind::ImageDecodeFailure, message.clone(), "raw_images")
                    .on_page(page)
                    .with_method(names.join(",")),
            );
        }

        result
    }

    /// Decode, fingerprint and store one image. `Ok(None)` means duplicate.
    fn process(
        &self,
        page: u32,
        source: &ImageSource,
        stem: &str,
        index: usize,
        raw: &RawImage,
        kept: &[ImageAsset],
    ) -> Result<Option<ImageAsset>> {
        let decoded = image::load_from_memory(&raw.data)?;
        let fingerprint = fingerprint(&decoded);

        if let Some(existing) = kept.iter().find(|a| a.content_fingerprint == fingerprint) {
            log::debug!(
                "Page {}: image {} from '{}' duplicates {}",
                page,
                index,
                source.name,
                existing.id
            );
            return Ok(None);
        }

        let format = image_extension(raw);
        let id = format!("page{}_{}_{}", page, stem, index);
        let filename = format!("{}.{}", id, format);
        let storage_path = self.output_dir.join(&filename);

        fs::create_dir_all(&self.output_dir)?;
        fs::write(&storage_path, &raw.data)?;

        Ok(Some(ImageAsset {
            id,
            filename,
            storage_path,
            page,
            format,
            width: decoded.width(),
            height: decoded.height(),
            size_bytes: raw.data.len(),
            color_mode: ColorMode::from(decoded.color()),
            extraction_method: source.name.clone(),
            content_fingerprint: fingerprint,
        }))
    }
}

/// Hex SHA-256 over the decoded dimensions and pixel buffer.
pub fn fingerprint(image: &image::DynamicImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_be_bytes());
    hasher.update(image.height().to_be_bytes());
    hasher.update(image.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn image_extension(raw: &RawImage) -> String {
    if let Some(format) = detect_format(&raw.data) {
        return format.to_string();
    }
    let claimed = raw.format.trim().trim_start_matches('.').to_ascii_lowercase();
    if claimed.is_empty() {
        "bin".to_string()
    } else {
        claimed
    }
}

/// File-name stems for each source, unique even when sanitized names clash.
fn source_stems(sources: &[ImageSource]) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let mut stem = sanitize(&source.name);
            while !seen.insert(stem.clone()) {
                stem = format!("{}_{}", stem, i + 1);
            }
            stem
        })
        .collect()
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
