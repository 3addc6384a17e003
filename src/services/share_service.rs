//! Share resolution and access control.
//!
//! Permission is an all-or-nothing property of the top-level share: the
//! ACL evaluated for any path is the one attached to its first segment,
//! however deep the path goes. Sub-folders never carry their own ACLs.

use crate::error::AppError;
use crate::models::share_types::{
    AccessRow, AclEntry, Owner, OwnerContext, Permission, Share,
};
use crate::services::owner_service::OwnerRegistry;
use crate::services::path_service;
use crate::services::share_repo::ShareRepository;
use std::collections::HashMap;
use std::sync::Arc;

/// True iff at least one ACL entry pairs the permission with an owner the
/// context matches.
pub fn has_permission(acl: &[AclEntry], ctx: &OwnerContext, perm: Permission) -> bool {
    acl.iter().any(|entry| entry.has(perm) && ctx.matches(&entry.owner))
}

/// Collapses submitted form rows into a canonical ACL: one entry per
/// distinct owner, permissions OR-ed across duplicate rows, empty-owner
/// rows discarded, owners left with no permission dropped entirely.
///
/// The result is independent of row order; entry order follows first
/// appearance, for stable display.
pub fn merge_acl(rows: &[AccessRow], owners: &OwnerRegistry) -> Result<Vec<AclEntry>, AppError> {
    let mut entries: Vec<AclEntry> = Vec::new();
    let mut index: HashMap<Owner, usize> = HashMap::new();

    for row in rows {
        if row.owner.is_empty() {
            continue;
        }
        let owner = owners.parse(&row.owner)?;
        let at = *index.entry(owner.clone()).or_insert_with(|| {
            entries.push(AclEntry {
                owner,
                permissions: Default::default(),
            });
            entries.len() - 1
        });
        for perm in Permission::ALL {
            if row.granted(perm) {
                entries[at].permissions.insert(perm);
            }
        }
    }

    entries.retain(|e| !e.permissions.is_empty());
    Ok(entries)
}

/// Resolves folder paths to their governing shares and answers permission
/// checks on top of them.
pub struct ShareService {
    repo: Arc<dyn ShareRepository>,
}

impl ShareService {
    pub fn new(repo: Arc<dyn ShareRepository>) -> Self {
        Self { repo }
    }

    /// The share governing `path`: the stored record for its top-level
    /// segment, or a transient empty-ACL share when none exists. The
    /// transient share is never written to the store.
    pub fn resolve_share(&self, path: &str) -> Result<Share, AppError> {
        let top = path_service::top_segment(path);
        match self.repo.get(top)? {
            Some(share) => Ok(share),
            None => {
                log::debug!("no stored share for {:?}, using empty ACL", top);
                Ok(Share::transient(top))
            }
        }
    }

    pub fn check_permission(
        &self,
        path: &str,
        perm: Permission,
        ctx: &OwnerContext,
    ) -> Result<bool, AppError> {
        let share = self.resolve_share(path)?;
        Ok(has_permission(&share.acl, ctx, perm))
    }

    /// The manage workflow: replace the share's ACL (and optionally its
    /// display name) from submitted rows.
    ///
    /// The submitter must hold `manage` both before the edit and under the
    /// merged result; an edit that would strip the submitter's own
    /// `manage` grant is rejected and nothing is persisted.
    pub fn update_share(
        &self,
        path: &str,
        display_name: Option<&str>,
        rows: &[AccessRow],
        owners: &OwnerRegistry,
        ctx: &OwnerContext,
    ) -> Result<Share, AppError> {
        let mut share = self.resolve_share(path)?;
        if !has_permission(&share.acl, ctx, Permission::Manage) {
            return Err(AppError::PermissionDenied(share.path.clone()));
        }

        share.acl = merge_acl(rows, owners)?;
        if let Some(name) = display_name {
            share.name = name.to_string();
        }

        // Lockout guard, evaluated against the post-merge ACL.
        if !has_permission(&share.acl, ctx, Permission::Manage) {
            return Err(AppError::PermissionDenied(format!(
                "edit would remove your own manage permission on {}",
                share.path
            )));
        }

        self.repo.save(&share)?;
        share.persisted = true;
        log::info!("share {:?} saved with {} ACL entries", share.path, share.acl.len());
        Ok(share)
    }
}
