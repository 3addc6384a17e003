mod config;
mod error;
mod gallery;
pub mod models;
pub mod services;

pub use config::GalleryConfig;
pub use error::AppError;
pub use gallery::Gallery;
pub use models::fs_types::{FileEntry, FolderEntry, FolderListing, ImageInfo, Rendition};
pub use models::share_types::{AccessRow, AclEntry, Owner, OwnerContext, Permission, Share};
pub use services::owner_service::{OwnerGroup, OwnerProvider, OwnerRegistry, StaticOwnerProvider};
pub use services::share_repo::{JsonShareRepository, MemoryShareRepository, ShareRepository};
