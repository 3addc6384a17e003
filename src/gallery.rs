//! The gallery facade.
//!
//! Wires configuration, the share store and the owner registry together
//! and applies the permission gate in front of every operation. This is
//! the whole surface the serving layer talks to; raw request paths go in,
//! typed results or classified errors come out.

use crate::config::GalleryConfig;
use crate::error::AppError;
use crate::models::fs_types::{FolderListing, Rendition};
use crate::models::share_types::{AccessRow, OwnerContext, Permission, Share};
use crate::services::owner_service::{OwnerGroup, OwnerRegistry};
use crate::services::share_repo::ShareRepository;
use crate::services::share_service::{has_permission, ShareService};
use crate::services::{fs_service, path_service, thumbnail_service};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Gallery {
    config: GalleryConfig,
    shares: ShareService,
    owners: OwnerRegistry,
}

impl Gallery {
    pub fn new(
        config: GalleryConfig,
        repo: Arc<dyn ShareRepository>,
        owners: OwnerRegistry,
    ) -> Self {
        Self {
            config,
            shares: ShareService::new(repo),
            owners,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Canonical form of a raw request path. Every other operation calls
    /// this first; it is also exposed for hosts that build links.
    pub fn canonicalize(&self, raw: &str) -> Result<String, AppError> {
        path_service::canonicalize(raw)
    }

    pub fn check_permission(
        &self,
        raw_path: &str,
        perm: Permission,
        ctx: &OwnerContext,
    ) -> Result<bool, AppError> {
        let path = path_service::canonicalize(raw_path)?;
        self.shares.check_permission(&path, perm, ctx)
    }

    /// Lists a folder the context can read.
    pub fn list(&self, raw_path: &str, ctx: &OwnerContext) -> Result<FolderListing, AppError> {
        let path = path_service::canonicalize(raw_path)?;
        self.require(&path, Permission::Read, ctx)?;
        fs_service::list(&self.config, &self.shares, &path, ctx)
    }

    /// Returns the cached rendition of an image, generating it on first
    /// access. Read permission is checked on the containing folder.
    pub fn rendition(
        &self,
        raw_path: &str,
        size: u32,
        ctx: &OwnerContext,
    ) -> Result<Rendition, AppError> {
        let path = path_service::canonicalize(raw_path)?;
        self.require(path_service::parent(&path), Permission::Read, ctx)?;
        thumbnail_service::get_rendition(&self.config, &path, size)
    }

    /// Resolves the on-disk location of an original file for download.
    pub fn download(&self, raw_path: &str, ctx: &OwnerContext) -> Result<PathBuf, AppError> {
        let path = path_service::canonicalize(raw_path)?;
        self.require(path_service::parent(&path), Permission::Read, ctx)?;
        let file = self.config.data_path(&path);
        if !file.is_file() {
            return Err(AppError::NotFound(path));
        }
        Ok(file)
    }

    /// Creates a sub-folder inside a writable folder.
    pub fn create_folder(
        &self,
        raw_path: &str,
        name: &str,
        ctx: &OwnerContext,
    ) -> Result<(), AppError> {
        let path = path_service::canonicalize(raw_path)?;
        self.require(&path, Permission::Write, ctx)?;
        fs_service::create_folder(&self.config, &path, name)
    }

    /// Stores an uploaded file inside a writable folder.
    pub fn add_file(
        &self,
        raw_path: &str,
        filename: &str,
        bytes: &[u8],
        ctx: &OwnerContext,
    ) -> Result<(), AppError> {
        let path = path_service::canonicalize(raw_path)?;
        self.require(&path, Permission::Write, ctx)?;
        fs_service::add_file(&self.config, &path, filename, bytes)
    }

    /// Deletes a file or folder tree. The root itself can never be
    /// deleted; write permission is checked on the parent folder.
    pub fn delete(&self, raw_path: &str, ctx: &OwnerContext) -> Result<(), AppError> {
        let path = path_service::canonicalize(raw_path)?;
        if path.is_empty() {
            return Err(AppError::PermissionDenied("cannot delete the root".into()));
        }
        self.require(path_service::parent(&path), Permission::Write, ctx)?;
        fs_service::delete(&self.config, &path)
    }

    /// The share governing a folder, for display in the manage UI.
    pub fn share(&self, raw_path: &str, ctx: &OwnerContext) -> Result<Share, AppError> {
        let path = path_service::canonicalize(raw_path)?;
        let share = self.shares.resolve_share(&path)?;
        if !has_permission(&share.acl, ctx, Permission::Manage) {
            return Err(AppError::PermissionDenied(share.path));
        }
        Ok(share)
    }

    /// The manage workflow: validates and merges submitted ACL rows and
    /// persists the share, refusing edits that would lock the submitter
    /// out of `manage`.
    pub fn update_share(
        &self,
        raw_path: &str,
        display_name: Option<&str>,
        rows: &[AccessRow],
        ctx: &OwnerContext,
    ) -> Result<Share, AppError> {
        let path = path_service::canonicalize(raw_path)?;
        self.shares
            .update_share(&path, display_name, rows, &self.owners, ctx)
    }

    /// Known owners grouped by kind, for populating the manage UI.
    pub fn owners(&self) -> Vec<OwnerGroup> {
        self.owners.grouped()
    }

    fn require(&self, path: &str, perm: Permission, ctx: &OwnerContext) -> Result<(), AppError> {
        if self.shares.check_permission(path, perm, ctx)? {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "{} on {:?}",
                perm.key(),
                path
            )))
        }
    }
}
