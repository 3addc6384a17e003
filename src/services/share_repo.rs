//! Share persistence.
//!
//! Shares are a key-value store keyed by top-level folder name. The trait
//! is the boundary; hosts may plug in their own store. Both bundled
//! implementations provide per-record atomicity: a save either lands
//! completely or not at all.

use crate::error::AppError;
use crate::models::share_types::Share;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait ShareRepository: Send + Sync {
    fn get(&self, path: &str) -> Result<Option<Share>, AppError>;
    fn save(&self, share: &Share) -> Result<(), AppError>;
}

/// In-memory store. Used by tests and as a default for embedding hosts
/// that persist shares themselves.
#[derive(Default)]
pub struct MemoryShareRepository {
    shares: Mutex<HashMap<String, Share>>,
}

impl ShareRepository for MemoryShareRepository {
    fn get(&self, path: &str) -> Result<Option<Share>, AppError> {
        let shares = self.shares.lock().expect("share store poisoned");
        Ok(shares.get(path).cloned().map(|mut s| {
            s.persisted = true;
            s
        }))
    }

    fn save(&self, share: &Share) -> Result<(), AppError> {
        let mut shares = self.shares.lock().expect("share store poisoned");
        shares.insert(share.path.clone(), share.clone());
        Ok(())
    }
}

/// File-backed store: all shares in one JSON document, rewritten
/// atomically on every save.
pub struct JsonShareRepository {
    file: PathBuf,
    shares: Mutex<HashMap<String, Share>>,
}

impl JsonShareRepository {
    pub fn open(file: &Path) -> Result<Self, AppError> {
        let shares = if file.exists() {
            let data = std::fs::read(file)?;
            serde_json::from_slice(&data)
                .map_err(|e| AppError::Validation(format!("share store corrupt: {}", e)))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            file: file.to_path_buf(),
            shares: Mutex::new(shares),
        })
    }
}

impl ShareRepository for JsonShareRepository {
    fn get(&self, path: &str) -> Result<Option<Share>, AppError> {
        let shares = self.shares.lock().expect("share store poisoned");
        Ok(shares.get(path).cloned().map(|mut s| {
            s.persisted = true;
            s
        }))
    }

    fn save(&self, share: &Share) -> Result<(), AppError> {
        let mut shares = self.shares.lock().expect("share store poisoned");
        shares.insert(share.path.clone(), share.clone());

        let dir = self.file.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &*shares)
            .map_err(|e| AppError::Io(e.into()))?;
        tmp.flush()?;
        tmp.persist(&self.file).map_err(|e| AppError::Io(e.error))?;
        log::debug!("saved share store ({} shares)", shares.len());
        Ok(())
    }
}
