//! Silent access-token refresh against the OAuth2 token endpoint
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use super::{Credential, TokenGrant};
use crate::config::TransportConfig;

/// Why a refresh attempt failed
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// The grant was revoked or the refresh token rejected; only re-consent helps
    #[error("refresh token rejected: {message}")]
    Revoked { message: String },

    /// The endpoint could not be reached or answered unexpectedly
    #[error("token endpoint unavailable: {message}")]
    Transport { message: String },
}

/// Exchanges a refresh token for a new access token
pub trait TokenRefresher: Send + Sync {
    fn refresh(&self, credential: &Credential) -> Result<TokenGrant, RefreshError>;
}

/// Google's OAuth2 token endpoint
pub struct GoogleTokenEndpoint {
    agent: ureq::Agent,
}

impl GoogleTokenEndpoint {
    pub fn new(transport: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(transport.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl TokenRefresher for GoogleTokenEndpoint {
    fn refresh(&self, credential: &Credential) -> Result<TokenGrant, RefreshError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| RefreshError::Revoked {
                message: "no refresh token stored".to_string(),
            })?;

        let mut response = self
            .agent
            .post(&credential.token_uri)
            .send_form([
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .map_err(|e| RefreshError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            return response
                .body_mut()
                .read_json::<TokenGrant>()
                .map_err(|e| RefreshError::Transport {
                    message: format!("Failed to parse refresh token response: {}", e),
                });
        }

        let body = response.body_mut().read_to_string().unwrap_or_default();
        Err(classify_refresh_failure(status, &body))
    }
}

/// 400/401 from the token endpoint mean the grant itself is bad
fn classify_refresh_failure(status: u16, body: &str) -> RefreshError {
    let message = format!("HTTP {}: {}", status, body.trim());
    match status {
        400 | 401 => RefreshError::Revoked { message },
        _ => RefreshError::Transport { message },
    }
}
