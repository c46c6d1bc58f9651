//! The single shared credential
//!
//! `CredentialStore` owns the one OAuth2 credential every API call uses.
//! It loads the persisted token, refreshes it silently when it expires, and
//! falls back to interactive consent only when the grant is missing,
//! revoked, or too narrow. Every acquisition runs under one mutex so
//! concurrent callers wait for, and then reuse, an in-flight refresh.

use chrono::Utc;
use log::{info, warn};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::{
    ConsentFlow, Credential, FileTokenStorage, GoogleTokenEndpoint, LoopbackConsent,
    RefreshError, TokenRefresher, TokenStorage,
};
use crate::config::{ClientSecrets, TransportConfig};
use crate::error::{Error, Result};

/// Outcome of a successful acquisition
#[derive(Debug, Clone)]
pub struct Acquired {
    pub credential: Credential,
    /// Set when the credential changed but could not be written to storage.
    /// The credential works for this process; the next start will re-consent.
    pub persist_warning: Option<String>,
}

pub struct CredentialStore {
    storage: Box<dyn TokenStorage>,
    refresher: Box<dyn TokenRefresher>,
    consent: Option<Box<dyn ConsentFlow>>,
    current: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    credential: Option<Credential>,
    /// Every scope requested through `acquire` so far
    requested: BTreeSet<String>,
}

impl CredentialStore {
    /// Store without an interactive flow; re-consent surfaces as `Error::Auth`
    pub fn new(
        storage: impl TokenStorage + 'static,
        refresher: impl TokenRefresher + 'static,
    ) -> Self {
        Self {
            storage: Box::new(storage),
            refresher: Box::new(refresher),
            consent: None,
            current: Mutex::new(Slot::default()),
        }
    }

    pub fn with_consent(mut self, consent: impl ConsentFlow + 'static) -> Self {
        self.consent = Some(Box::new(consent));
        self
    }

    /// Production wiring: token file, Google token endpoint, browser consent
    pub fn installed_app(
        secrets: ClientSecrets,
        token_path: Option<PathBuf>,
        transport: &TransportConfig,
    ) -> Result<Self> {
        let storage = match token_path {
            Some(path) => FileTokenStorage::new(path),
            None => FileTokenStorage::default_location()?,
        };
        Ok(Self::new(storage, GoogleTokenEndpoint::new(transport))
            .with_consent(LoopbackConsent::new(secrets, transport)))
    }

    /// Return a credential valid for `scopes`, refreshing or re-consenting as needed
    pub fn acquire<S: AsRef<str>>(&self, scopes: &[S]) -> Result<Acquired> {
        let scopes: Vec<String> = scopes.iter().map(|s| s.as_ref().to_string()).collect();
        let mut slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        slot.requested.extend(scopes.iter().cloned());
        self.acquire_locked(&mut slot.credential, &scopes)
    }

    /// Bearer token for the current credential, refreshed in place if expired.
    ///
    /// Re-acquisition asks for every scope requested so far, or for the
    /// persisted grant's scopes when nothing has been requested yet.
    pub fn access_token(&self) -> Result<String> {
        let mut slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(credential) = slot.credential.as_ref()
            && credential.is_valid(Utc::now())
        {
            return Ok(credential.access_token.clone());
        }

        if slot.credential.is_none() {
            slot.credential = self.load_persisted();
        }
        let scopes: Vec<String> = if slot.requested.is_empty() {
            slot.credential
                .as_ref()
                .map(|c| c.scopes.iter().cloned().collect())
                .unwrap_or_default()
        } else {
            slot.requested.iter().cloned().collect()
        };
        if scopes.is_empty() {
            return Err(Error::auth("No credential and no scopes to request"));
        }
        Ok(self.acquire_locked(&mut slot.credential, &scopes)?.credential.access_token)
    }

    /// Write the in-memory credential back to storage, if there is one
    pub fn flush(&self) -> Result<()> {
        let slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(credential) = slot.credential.as_ref() {
            self.storage.save(credential)?;
        }
        Ok(())
    }

    /// Forget the credential in memory and on disk; the next acquisition re-consents.
    /// Requested scopes are remembered so `access_token` can ask for them again.
    pub fn revoke_local(&self) -> Result<()> {
        let mut slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        slot.credential = None;
        self.storage.delete()?;
        info!("Deleted persisted credential");
        Ok(())
    }

    fn acquire_locked(
        &self,
        slot: &mut Option<Credential>,
        scopes: &[String],
    ) -> Result<Acquired> {
        if slot.is_none() {
            *slot = self.load_persisted();
        }

        if let Some(credential) = slot.as_mut()
            && credential.covers(scopes)
        {
            let now = Utc::now();
            if credential.is_valid(now) {
                return Ok(Acquired {
                    credential: credential.clone(),
                    persist_warning: None,
                });
            }

            if credential.can_refresh() {
                match self.refresher.refresh(credential) {
                    Ok(grant) => {
                        credential.apply_grant(grant, now);
                        info!("Token refreshed silently");
                        let persist_warning = self.persist(credential);
                        return Ok(Acquired {
                            credential: credential.clone(),
                            persist_warning,
                        });
                    }
                    Err(RefreshError::Revoked { message }) => {
                        warn!("Refresh token rejected, re-consent required: {}", message);
                    }
                    Err(RefreshError::Transport { message }) => {
                        return Err(Error::auth(format!("Token refresh failed: {}", message)));
                    }
                }
            }
        }

        let consent = self.consent.as_ref().ok_or_else(|| {
            Error::auth("Re-consent required but no interactive consent flow is available")
        })?;
        let fresh = consent.authorize(scopes)?;
        let persist_warning = self.persist(&fresh);
        *slot = Some(fresh.clone());
        Ok(Acquired {
            credential: fresh,
            persist_warning,
        })
    }

    /// An unreadable token file is treated like a missing one
    fn load_persisted(&self) -> Option<Credential> {
        match self.storage.load() {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Ignoring unreadable persisted credential: {}", e);
                None
            }
        }
    }

    fn persist(&self, credential: &Credential) -> Option<String> {
        match self.storage.save(credential) {
            Ok(()) => {
                info!("Credential saved");
                None
            }
            Err(e) => {
                let message = format!(
                    "Credential could not be saved ({}); the next run will require re-consent",
                    e
                );
                warn!("{}", message);
                Some(message)
            }
        }
    }
}
