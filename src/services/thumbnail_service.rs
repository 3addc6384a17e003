//! The rendition cache.
//!
//! A rendition is keyed by (canonical path, target size) and lives at
//! `<cache_root>/<size>/<path>`. Content at a key is immutable: it is
//! generated at most once, published with a write-then-rename so readers
//! never observe a partial file, and served with a far-future expiry.
//! Concurrent first requests may both generate; the loser's rename lands
//! an identical file, which is wasted work but never corruption.

use crate::config::GalleryConfig;
use crate::error::AppError;
use crate::models::fs_types::Rendition;
use crate::services::exif_service;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use std::path::PathBuf;

const RENDITION_QUALITY: u8 = 90;

/// Returns the cached rendition for a canonical file path at a target
/// size, generating it on first access.
///
/// `size` must come from the configured size set; the caller has already
/// confirmed read permission.
pub fn get_rendition(
    config: &GalleryConfig,
    path: &str,
    size: u32,
) -> Result<Rendition, AppError> {
    if !config.is_render_size(size) {
        return Err(AppError::Validation(format!("unsupported size {}", size)));
    }

    let original = config.data_path(path);
    if !original.is_file() {
        return Err(AppError::NotFound(path.to_string()));
    }

    let cache_file = cache_location(config, path, size);
    if cache_file.is_file() {
        log::debug!("rendition cache hit for {:?} @ {}", path, size);
        return Ok(Rendition {
            cache_path: cache_file,
            max_age: Rendition::MAX_AGE,
        });
    }

    if let Some(dir) = cache_file.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut img = ImageReader::open(&original)?.decode()?;

    // Orientation correction first: the bounding box is not square, so
    // rotation has to happen before the fit.
    match exif_service::rotation_degrees(exif_service::orientation(&original)) {
        90 => img = img.rotate90(),
        180 => img = img.rotate180(),
        270 => img = img.rotate270(),
        _ => {}
    }

    // Fit into size x floor(size * 0.75), aspect preserved, never upscaled.
    let (max_w, max_h) = (size, size * 3 / 4);
    if img.width() > max_w || img.height() > max_h {
        img = img.resize(max_w, max_h, FilterType::Lanczos3);
    }

    let format = ImageFormat::from_path(&cache_file)?;
    let dir = cache_file.parent().unwrap_or(config.cache_root.as_path());
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut tmp, RENDITION_QUALITY);
            img.write_with_encoder(encoder)?;
        }
        _ => {
            img.write_to(tmp.as_file_mut(), format)?;
        }
    }
    tmp.persist(&cache_file).map_err(|e| AppError::Io(e.error))?;
    log::info!("generated rendition for {:?} @ {}", path, size);

    Ok(Rendition {
        cache_path: cache_file,
        max_age: Rendition::MAX_AGE,
    })
}

/// Deterministic cache location for a (path, size) key.
pub fn cache_location(config: &GalleryConfig, path: &str, size: u32) -> PathBuf {
    config.cache_root.join(size.to_string()).join(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> GalleryConfig {
        GalleryConfig {
            data_root: dir.join("data"),
            cache_root: dir.join("cache"),
            ..GalleryConfig::default()
        }
    }

    fn write_png(config: &GalleryConfig, path: &str, w: u32, h: u32) {
        let file = config.data_path(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        image::RgbImage::new(w, h).save(&file).unwrap();
    }

    #[test]
    fn rejects_unlisted_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        write_png(&cfg, "a/photo.png", 100, 100);
        assert!(matches!(
            get_rendition(&cfg, "a/photo.png", 129),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn missing_original_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        std::fs::create_dir_all(&cfg.data_root).unwrap();
        assert!(matches!(
            get_rendition(&cfg, "nope.png", 128),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn generates_into_bounding_box() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        write_png(&cfg, "a/photo.png", 400, 400);

        let rendition = get_rendition(&cfg, "a/photo.png", 128).unwrap();
        assert_eq!(rendition.cache_path, cache_location(&cfg, "a/photo.png", 128));
        // 400x400 fit into 128x96 keeps the aspect ratio: 96x96.
        let (w, h) = image::image_dimensions(&rendition.cache_path).unwrap();
        assert_eq!((w, h), (96, 96));
    }

    #[test]
    fn never_upscales_small_originals() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        write_png(&cfg, "small.png", 50, 40);

        let rendition = get_rendition(&cfg, "small.png", 128).unwrap();
        let (w, h) = image::image_dimensions(&rendition.cache_path).unwrap();
        assert_eq!((w, h), (50, 40));
    }

    #[test]
    fn second_call_reuses_cache_content() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        write_png(&cfg, "a/photo.png", 400, 300);

        let first = get_rendition(&cfg, "a/photo.png", 128).unwrap();
        // Plant a sentinel: if a second call regenerated, it would be
        // replaced with real image bytes.
        std::fs::write(&first.cache_path, b"sentinel").unwrap();

        let second = get_rendition(&cfg, "a/photo.png", 128).unwrap();
        assert_eq!(second.cache_path, first.cache_path);
        assert_eq!(std::fs::read(&second.cache_path).unwrap(), b"sentinel");
    }

    #[test]
    fn jpeg_original_gets_jpeg_rendition() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let file = cfg.data_path("shot.jpg");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        image::RgbImage::from_pixel(300, 200, image::Rgb([10, 120, 200]))
            .save_with_format(&file, ImageFormat::Jpeg)
            .unwrap();

        let rendition = get_rendition(&cfg, "shot.jpg", 128).unwrap();
        let bytes = std::fs::read(&rendition.cache_path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let (w, h) = image::image_dimensions(&rendition.cache_path).unwrap();
        assert_eq!((w, h), (128, 85));
    }
}
