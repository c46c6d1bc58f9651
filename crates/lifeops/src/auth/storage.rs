//! Durable single-record credential storage

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::Credential;
use crate::error::Result;

/// A durable home for exactly one serialized credential
pub trait TokenStorage: Send + Sync {
    /// Load the persisted credential; `Ok(None)` when nothing is stored
    fn load(&self) -> Result<Option<Credential>>;

    /// Overwrite the persisted credential
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Remove the persisted credential so the next acquisition re-consents
    fn delete(&self) -> Result<()>;
}

impl<T: TokenStorage + ?Sized> TokenStorage for Arc<T> {
    fn load(&self) -> Result<Option<Credential>> {
        (**self).load()
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        (**self).save(credential)
    }

    fn delete(&self) -> Result<()> {
        (**self).delete()
    }
}

/// Token file on disk (~/.config/lifeops/google-token.json by default)
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the default token path
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(crate::config::default_token_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let credential: Credential = config::load_json_file(&self.path)?;
        Ok(Some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        config::save_json_file(&self.path, credential)?;
        restrict_permissions(&self.path);
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| crate::Error::Config {
                message: format!("Failed to delete {}: {}", self.path.display(), e),
            })?;
        }
        Ok(())
    }
}

/// Token files hold refresh tokens; keep them owner-readable only
#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        log::warn!("Could not restrict permissions on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

/// In-process storage for embedding and tests
#[derive(Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<Credential>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }

    /// Snapshot of what is currently stored
    pub fn stored(&self) -> Option<Credential> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.stored())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
