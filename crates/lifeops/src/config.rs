//! Configuration loading for Google API access
//!
//! Supports loading OAuth client secrets from (in order of priority):
//! 1. Compile-time embedded credentials (for production builds)
//! 2. JSON file in the lifeops config directory (Google Cloud Console format)
//! 3. JSON file named by `GOOGLE_CLIENT_SECRET_FILE`
//! 4. Runtime environment variables (fallback)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client secrets filename in the lifeops config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Persisted token filename in the lifeops config directory
const TOKEN_FILE: &str = "google-token.json";

/// Default Google OAuth2 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth scopes used across the suite
pub mod scopes {
    pub const CALENDAR: &str = "https://www.googleapis.com/auth/calendar";
    pub const GMAIL_MODIFY: &str = "https://www.googleapis.com/auth/gmail.modify";
    pub const SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";
    pub const DRIVE: &str = "https://www.googleapis.com/auth/drive";
    pub const CONTACTS_READONLY: &str = "https://www.googleapis.com/auth/contacts.readonly";
    pub const DOCUMENTS: &str = "https://www.googleapis.com/auth/documents";
    pub const PRESENTATIONS: &str = "https://www.googleapis.com/auth/presentations";
    pub const TASKS: &str = "https://www.googleapis.com/auth/tasks";
    pub const MEET_CREATED: &str = "https://www.googleapis.com/auth/meetings.space.created";
    pub const MEET_READONLY: &str = "https://www.googleapis.com/auth/meetings.space.readonly";

    /// Workspace accounts only; personal accounts get 403 from the Keep API
    pub const KEEP: &str = "https://www.googleapis.com/auth/keep";

    /// Label schemas; needs org-level approval, so it is opt-in like [`KEEP`]
    pub const DRIVE_LABELS: &str = "https://www.googleapis.com/auth/drive.labels";

    /// Every scope granted to a personal account by default
    pub const ALL: &[&str] = &[
        CALENDAR,
        GMAIL_MODIFY,
        SPREADSHEETS,
        DRIVE,
        CONTACTS_READONLY,
        DOCUMENTS,
        PRESENTATIONS,
        TASKS,
        MEET_CREATED,
        MEET_READONLY,
    ];

    /// Owned copy of [`ALL`]
    pub fn all() -> Vec<String> {
        ALL.iter().map(|s| s.to_string()).collect()
    }
}

/// OAuth client id/secret for the installed application
#[derive(Debug, Clone)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
    token_uri: Option<String>,
}

impl ClientSecrets {
    /// Load client secrets using the priority order documented on this module
    pub fn load() -> Result<Self> {
        if let Some(secrets) = Self::from_compile_time() {
            return Ok(secrets);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            let creds: GoogleCredentialFile = config::load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(creds);
        }

        if let Ok(path) = std::env::var("GOOGLE_CLIENT_SECRET_FILE") {
            return Self::from_file(Path::new(&path));
        }

        Self::from_env()
    }

    /// Credentials embedded at compile time via environment variables.
    /// Build with: GOOGLE_CLIENT_ID=xxx GOOGLE_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID")?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        })
    }

    /// Load client secrets from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    /// Parse client secrets from a JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Desktop apps get "installed", web clients get "web"
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
            token_uri: installed
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }

    /// Load client secrets from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .context("GOOGLE_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .context("GOOGLE_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        })
    }

    /// Default client secrets path (~/.config/lifeops/google-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }
}

/// Default persisted token path (~/.config/lifeops/google-token.json)
pub fn default_token_path() -> Result<PathBuf> {
    config::config_path(TOKEN_FILE).context("Could not determine config directory")
}

/// Settings applied to every HTTP transport built by the service cache
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on a whole request, connect through body
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}
