//! Directory listing and folder mutations.
//!
//! Callers are expected to have confirmed permissions through the facade;
//! the functions here only enforce filesystem-level preconditions.

use crate::config::GalleryConfig;
use crate::error::AppError;
use crate::models::fs_types::{FileEntry, FolderEntry, FolderListing};
use crate::models::share_types::{OwnerContext, Permission};
use crate::services::exif_service;
use crate::services::path_service;
use crate::services::share_service::ShareService;
use std::path::Path;

/// Content types that get embedded image metadata attached to their
/// listing rows.
const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/pjpeg", "image/png"];

/// Guesses a content type from the file name's extension.
pub fn content_type_for(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(content_type)
}

/// Lists the immediate children of a canonical folder path.
///
/// Entries are sorted by name (byte order); dot-files are skipped. Child
/// folders are included only when the context can read them — this only
/// bites at the root, where children are the top-level shares themselves,
/// but is applied uniformly. Image files carry best-effort metadata.
pub fn list(
    config: &GalleryConfig,
    shares: &ShareService,
    path: &str,
    ctx: &OwnerContext,
) -> Result<FolderListing, AppError> {
    let dir = config.data_path(path);
    if !dir.is_dir() {
        return Err(AppError::NotFound(path.to_string()));
    }

    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names.sort();

    let mut folders = Vec::new();
    let mut files = Vec::new();
    for name in names {
        let node = dir.join(&name);
        let node_path = join_path(path, &name);
        // Only metadata extraction degrades gracefully; a failed stat
        // fails the listing.
        let size = node.metadata()?.len();

        if node.is_dir() {
            if shares.check_permission(&node_path, Permission::Read, ctx)? {
                folders.push(FolderEntry {
                    name,
                    path: node_path,
                    size,
                });
            }
        } else {
            let content_type = content_type_for(&name);
            let image = match content_type {
                Some(ct) if IMAGE_CONTENT_TYPES.contains(&ct) => {
                    let info = exif_service::read_image_info(&node);
                    if info.is_none() {
                        log::warn!("no readable image metadata for {:?}", node_path);
                    }
                    info
                }
                _ => None,
            };
            files.push(FileEntry {
                name,
                path: node_path,
                size,
                content_type: content_type.map(str::to_string),
                image,
            });
        }
    }

    Ok(FolderListing {
        name: basename(path).to_string(),
        path: path.to_string(),
        can_write: shares.check_permission(path, Permission::Write, ctx)?,
        can_manage: shares.check_permission(path, Permission::Manage, ctx)?,
        folders,
        files,
    })
}

/// Creates a sub-folder under an existing canonical folder path.
pub fn create_folder(config: &GalleryConfig, path: &str, name: &str) -> Result<(), AppError> {
    let name = clean_segment(name)?;
    let dir = config.data_path(path);
    if !dir.is_dir() {
        return Err(AppError::NotFound(path.to_string()));
    }
    std::fs::create_dir(dir.join(name))?;
    Ok(())
}

/// Writes an uploaded file into an existing canonical folder path.
/// Refuses to overwrite.
pub fn add_file(
    config: &GalleryConfig,
    path: &str,
    filename: &str,
    bytes: &[u8],
) -> Result<(), AppError> {
    let filename = clean_segment(filename)?;
    let dir = config.data_path(path);
    if !dir.is_dir() {
        return Err(AppError::NotFound(path.to_string()));
    }
    let dest = dir.join(filename);
    if dest.exists() {
        return Err(AppError::Validation(format!("{} already exists", filename)));
    }
    std::fs::write(dest, bytes)?;
    Ok(())
}

/// Removes a file or a whole folder tree at a canonical path.
pub fn delete(config: &GalleryConfig, path: &str) -> Result<(), AppError> {
    let target = config.data_path(path);
    if target.is_dir() {
        std::fs::remove_dir_all(target)?;
    } else if target.is_file() {
        std::fs::remove_file(target)?;
    } else {
        return Err(AppError::NotFound(path.to_string()));
    }
    Ok(())
}

/// A file or folder name must be a single canonical path segment.
fn clean_segment(name: &str) -> Result<&str, AppError> {
    let clean = path_service::canonicalize(name)?;
    if clean.is_empty() || clean != name || clean.contains('/') {
        return Err(AppError::Validation(format!("invalid name {:?}", name)));
    }
    Ok(name)
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}
