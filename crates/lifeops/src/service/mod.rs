//! Memoized API transports keyed by (name, version)
//!
//! The cache owns every handle it builds. The first `get` acquires a
//! credential for the cache's scope set; later calls never re-run consent.

mod handle;

pub use handle::{ServiceHandle, ServiceKey};

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::CredentialStore;
use crate::config::{ClientSecrets, TransportConfig, scopes};
use crate::error::Result;

type Slot = Arc<Mutex<Option<Arc<ServiceHandle>>>>;

pub struct ServiceCache {
    credentials: Arc<CredentialStore>,
    scopes: Vec<String>,
    transport: TransportConfig,
    authorized: Mutex<bool>,
    slots: Mutex<HashMap<ServiceKey, Slot>>,
}

impl ServiceCache {
    pub fn new(
        credentials: Arc<CredentialStore>,
        scopes: Vec<String>,
        transport: TransportConfig,
    ) -> Self {
        Self {
            credentials,
            scopes,
            transport,
            authorized: Mutex::new(false),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Installed-app wiring with every default scope and the default token file
    pub fn from_config() -> Result<Self> {
        let secrets = ClientSecrets::load()?;
        let transport = TransportConfig::default();
        let credentials = CredentialStore::installed_app(secrets, None, &transport)?;
        Ok(Self::new(Arc::new(credentials), scopes::all(), transport))
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Handle for `name`/`version`, built on first request and shared afterwards
    pub fn get(&self, name: &str, version: &str) -> Result<Arc<ServiceHandle>> {
        let key = ServiceKey::new(name, version);
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key.clone()).or_default().clone()
        };

        // Held across construction so racing callers for one key wait here
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        self.ensure_authorized()?;
        debug!("Building service handle for {}", key);
        let handle = Arc::new(ServiceHandle::build(
            key,
            self.credentials.clone(),
            &self.transport,
        ));
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Number of handles built so far
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the current credential and drop every handle
    pub fn shutdown(self) -> Result<()> {
        self.credentials.flush()
    }

    fn ensure_authorized(&self) -> Result<()> {
        let mut authorized = self.authorized.lock().unwrap_or_else(PoisonError::into_inner);
        if *authorized {
            return Ok(());
        }
        let acquired = self.credentials.acquire(&self.scopes)?;
        if let Some(message) = acquired.persist_warning {
            warn!("Credential will not survive restart: {}", message);
        }
        *authorized = true;
        Ok(())
    }

    pub fn gmail(&self) -> Result<Arc<ServiceHandle>> {
        self.get("gmail", "v1")
    }

    pub fn calendar(&self) -> Result<Arc<ServiceHandle>> {
        self.get("calendar", "v3")
    }

    pub fn sheets(&self) -> Result<Arc<ServiceHandle>> {
        self.get("sheets", "v4")
    }

    pub fn drive(&self) -> Result<Arc<ServiceHandle>> {
        self.get("drive", "v3")
    }

    pub fn people(&self) -> Result<Arc<ServiceHandle>> {
        self.get("people", "v1")
    }

    pub fn docs(&self) -> Result<Arc<ServiceHandle>> {
        self.get("docs", "v1")
    }

    pub fn slides(&self) -> Result<Arc<ServiceHandle>> {
        self.get("slides", "v1")
    }

    pub fn tasks(&self) -> Result<Arc<ServiceHandle>> {
        self.get("tasks", "v1")
    }

    pub fn keep(&self) -> Result<Arc<ServiceHandle>> {
        self.get("keep", "v1")
    }

    pub fn meet(&self) -> Result<Arc<ServiceHandle>> {
        self.get("meet", "v2")
    }

    pub fn drive_labels(&self) -> Result<Arc<ServiceHandle>> {
        self.get("drivelabels", "v2")
    }
}
