pub mod fs_types;
pub mod share_types;
