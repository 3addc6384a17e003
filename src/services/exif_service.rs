//! Embedded image metadata.
//!
//! All readers here are tolerant by contract: a missing or corrupt tag
//! yields `None`, never an error. Listings and renditions degrade to
//! "no metadata" instead of failing.

use crate::models::fs_types::ImageInfo;
use exif::{In, Tag, Value};
use std::io::{Cursor, Read};
use std::path::Path;

const EXIF_HEADER_BYTES: u64 = 128 * 1024;

/// Reads pixel dimensions plus camera and exposure strings for an image
/// file. Returns `None` when the file cannot be identified as an image;
/// EXIF problems only drop the affected fields.
pub fn read_image_info(path: &Path) -> Option<ImageInfo> {
    let (width, height) = image::image_dimensions(path).ok()?;
    let mut info = ImageInfo {
        width,
        height,
        camera: None,
        settings: None,
    };

    if let Some(exif) = read_exif(path) {
        info.camera = camera_string(&exif);
        info.settings = settings_string(&exif);
    }
    Some(info)
}

/// EXIF orientation (1-8), defaulting to 1 when absent or unreadable.
pub fn orientation(path: &Path) -> u32 {
    let Some(exif) = read_exif(path) else {
        return 1;
    };
    match exif.get_field(Tag::Orientation, In::PRIMARY) {
        Some(field) => match field.value {
            Value::Short(ref v) => *v.first().unwrap_or(&1) as u32,
            Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        },
        None => 1,
    }
}

/// Clockwise rotation for an EXIF orientation value.
///
/// Orientations 2, 4, 5 and 7 also call for a horizontal flip; only the
/// rotation component is honored here, so mirrored shots come out
/// unmirrored. Kept that way for compatibility with existing caches.
pub fn rotation_degrees(orientation: u32) -> u32 {
    match orientation {
        3 => 180,
        5 | 8 => 270,
        6 | 7 => 90,
        _ => 0,
    }
}

/// Parses EXIF from the first 128KB of the file, which covers headers in
/// practice without pulling whole originals into memory.
fn read_exif(path: &Path) -> Option<exif::Exif> {
    let file = std::fs::File::open(path).ok()?;
    let mut header = Vec::with_capacity(EXIF_HEADER_BYTES as usize);
    file.take(EXIF_HEADER_BYTES).read_to_end(&mut header).ok()?;
    exif::Reader::new()
        .read_from_container(&mut Cursor::new(&header))
        .ok()
}

/// "Make Model", with the make prefix dropped when the model already
/// starts with it (e.g. "Canon EOS 450D", not "Canon Canon EOS 450D").
fn camera_string(exif: &exif::Exif) -> Option<String> {
    let field_str = |tag| {
        exif.get_field(tag, In::PRIMARY)
            .map(|f| f.display_value().to_string().trim_matches('"').trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let model = field_str(Tag::Model);
    let make = field_str(Tag::Make);
    match (make, model) {
        (Some(make), Some(model)) => {
            if model.starts_with(&make) {
                Some(model)
            } else {
                Some(format!("{} {}", make, model))
            }
        }
        (Some(make), None) => Some(make),
        (None, model) => model,
    }
}

/// Comma-joined exposure settings: aperture, exposure time, focal length.
/// Any piece that fails to parse is simply left out.
fn settings_string(exif: &exif::Exif) -> Option<String> {
    let mut bits: Vec<String> = Vec::new();

    if let Some(f_number) = rational_value(exif, Tag::FNumber) {
        bits.push(format!("f/{}", trim_float(f_number)));
    }
    if let Some(field) = exif.get_field(Tag::ExposureTime, In::PRIMARY) {
        bits.push(format!("{} sec", field.display_value()));
    }
    if let Some(focal) = rational_value(exif, Tag::FocalLength) {
        bits.push(format!("{} mm", trim_float(focal)));
    }

    if bits.is_empty() {
        None
    } else {
        Some(bits.join(", "))
    }
}

fn rational_value(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(ref v) => v.first().map(|r| r.to_f64()),
        Value::SRational(ref v) => v.first().map(|r| r.to_f64()),
        _ => None,
    }
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_honors_rotation_component_only() {
        assert_eq!(rotation_degrees(1), 0);
        assert_eq!(rotation_degrees(2), 0);
        assert_eq!(rotation_degrees(3), 180);
        assert_eq!(rotation_degrees(4), 0);
        assert_eq!(rotation_degrees(5), 270);
        assert_eq!(rotation_degrees(6), 90);
        assert_eq!(rotation_degrees(7), 90);
        assert_eq!(rotation_degrees(8), 270);
        // Absent or out-of-range values rotate nothing.
        assert_eq!(rotation_degrees(0), 0);
        assert_eq!(rotation_degrees(42), 0);
    }

    #[test]
    fn orientation_defaults_to_one_for_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"not an image").unwrap();
        assert_eq!(orientation(&file), 1);
        assert_eq!(orientation(&dir.path().join("missing.jpg")), 1);
    }

    #[test]
    fn image_info_reads_dimensions_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.png");
        image::RgbImage::new(40, 30).save(&file).unwrap();

        let info = read_image_info(&file).unwrap();
        assert_eq!((info.width, info.height), (40, 30));
        assert_eq!(info.camera, None);
        assert_eq!(info.settings, None);
    }

    #[test]
    fn image_info_absorbs_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.jpg");
        std::fs::write(&file, b"\xff\xd8garbage").unwrap();
        assert!(read_image_info(&file).is_none());
    }

    #[test]
    fn trims_whole_floats() {
        assert_eq!(trim_float(8.0), "8");
        assert_eq!(trim_float(5.6), "5.6");
    }
}
