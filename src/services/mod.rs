pub mod exif_service;
pub mod fs_service;
pub mod owner_service;
pub mod path_service;
pub mod share_repo;
pub mod share_service;
pub mod thumbnail_service;
