//! Credential acquisition for Google APIs
//!
//! This module provides:
//! - The persisted OAuth2 credential model
//! - Token storage (file on disk, or in memory)
//! - Silent refresh against the token endpoint
//! - Interactive browser consent for first-time or revoked grants
//! - `CredentialStore`, the one shared credential every service uses

mod consent;
mod credential;
mod refresh;
mod storage;
mod store;

pub use consent::{ConsentFlow, LoopbackConsent};
pub use credential::{Credential, TokenGrant};
pub use refresh::{GoogleTokenEndpoint, RefreshError, TokenRefresher};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{Acquired, CredentialStore};
