use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Embedded image metadata attached to listing rows for recognized image
/// files. Every field is best-effort.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Camera make/model, e.g. "Canon EOS 450D".
    pub camera: Option<String>,
    /// Exposure settings, e.g. "f/5.6, 1/250 sec, 50 mm".
    pub settings: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct FolderEntry {
    pub name: String,
    /// Canonical path relative to the data root.
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Serialize, Clone)]
pub struct FileEntry {
    pub name: String,
    /// Canonical path relative to the data root.
    pub path: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub image: Option<ImageInfo>,
}

/// One folder's listing, recomputed on every request.
#[derive(Debug, Serialize, Clone)]
pub struct FolderListing {
    pub name: String,
    pub path: String,
    pub can_write: bool,
    pub can_manage: bool,
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
}

/// A cached derivative image, plus the expiry hint the serving layer
/// attaches. Cache content at a given location is immutable, hence the
/// far-future max age.
#[derive(Debug, Clone)]
pub struct Rendition {
    pub cache_path: PathBuf,
    pub max_age: Duration,
}

impl Rendition {
    pub const MAX_AGE: Duration = Duration::from_secs(365 * 24 * 3600);
}
