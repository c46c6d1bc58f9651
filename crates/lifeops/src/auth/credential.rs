//! OAuth2 credential model
//!
//! Serialized in Google's "authorized user" JSON layout so token files
//! written by other Google client libraries load unchanged.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::{ClientSecrets, DEFAULT_TOKEN_URI};

/// Tokens are treated as expired this long before their actual expiry
const EXPIRY_SKEW_SECS: i64 = 300;

/// An access/refresh token pair plus the scopes it was granted for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiry", default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Token endpoint response, for both code exchange and refresh
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    /// Space-separated scope list, when the endpoint reports one
    pub scope: Option<String>,
}

impl Credential {
    /// Build a credential from a fresh authorization-code grant
    pub fn from_grant(
        grant: TokenGrant,
        secrets: &ClientSecrets,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let mut credential = Self {
            access_token: String::new(),
            refresh_token: None,
            expires_at: None,
            scopes: requested_scopes.iter().cloned().collect(),
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
        };
        credential.apply_grant(grant, now);
        credential
    }

    /// Update token fields in place from a refresh response
    ///
    /// The refresh token is kept when the endpoint doesn't rotate it.
    pub fn apply_grant(&mut self, grant: TokenGrant, now: DateTime<Utc>) {
        self.access_token = grant.access_token;
        if let Some(refresh_token) = grant.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        // A lifetime too large to represent is recorded as no expiry
        self.expires_at = grant.expires_in.and_then(|secs| {
            let lifetime = Duration::try_seconds(i64::try_from(secs).ok()?)?;
            now.checked_add_signed(lifetime)
        });
        if let Some(scope) = grant.scope.filter(|s| !s.trim().is_empty()) {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }

    /// Whether the access token is past (or within the skew of) its expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            expires_at
                .checked_sub_signed(Duration::seconds(EXPIRY_SKEW_SECS))
                .is_none_or(|deadline| deadline <= now)
        })
    }

    /// Whether the access token can be sent as-is
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired(now)
    }

    /// Whether the granted scopes are a superset of `requested`
    pub fn covers<S: AsRef<str>>(&self, requested: &[S]) -> bool {
        requested.iter().all(|s| self.scopes.contains(s.as_ref()))
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_in_secs: i64) -> Credential {
        Credential {
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in_secs)),
            scopes: ["a".to_string(), "b".to_string()].into_iter().collect(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[test]
    fn test_validity_respects_skew() {
        let now = Utc::now();
        assert!(credential(3600).is_valid(now));
        assert!(!credential(60).is_valid(now));
        assert!(!credential(-10).is_valid(now));
    }

    #[test]
    fn test_missing_expiry_is_valid() {
        let mut cred = credential(3600);
        cred.expires_at = None;
        assert!(cred.is_valid(Utc::now()));
    }

    #[test]
    fn test_covers_is_superset_check() {
        let cred = credential(3600);
        assert!(cred.covers(&["a"]));
        assert!(cred.covers(&["a", "b"]));
        assert!(cred.covers::<&str>(&[]));
        assert!(!cred.covers(&["a", "c"]));
    }

    #[test]
    fn test_apply_grant_keeps_refresh_token() {
        let mut cred = credential(-10);
        let now = Utc::now();
        cred.apply_grant(
            TokenGrant {
                access_token: "ya29.new".to_string(),
                refresh_token: None,
                expires_in: Some(3599),
                scope: None,
            },
            now,
        );
        assert_eq!(cred.access_token, "ya29.new");
        assert_eq!(cred.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(cred.expires_at, Some(now + Duration::seconds(3599)));
        assert!(cred.covers(&["a", "b"]));
    }

    #[test]
    fn test_apply_grant_with_huge_lifetime_has_no_expiry() {
        let mut cred = credential(-10);
        cred.apply_grant(
            TokenGrant {
                access_token: "ya29.new".to_string(),
                refresh_token: None,
                expires_in: Some(u64::MAX / 2),
                scope: None,
            },
            Utc::now(),
        );
        assert_eq!(cred.expires_at, None);
        assert!(cred.is_valid(Utc::now()));
    }

    #[test]
    fn test_apply_grant_replaces_scopes_when_reported() {
        let mut cred = credential(-10);
        cred.apply_grant(
            TokenGrant {
                access_token: "ya29.new".to_string(),
                refresh_token: None,
                expires_in: None,
                scope: Some("a c".to_string()),
            },
            Utc::now(),
        );
        assert!(cred.covers(&["a", "c"]));
        assert!(!cred.covers(&["b"]));
    }

    #[test]
    fn test_reads_authorized_user_json() {
        let json = r#"{
            "token": "ya29.abc",
            "refresh_token": "1//xyz",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "shh",
            "scopes": ["https://www.googleapis.com/auth/tasks"],
            "universe_domain": "googleapis.com",
            "account": "",
            "expiry": "2026-03-01T12:00:00.123456Z"
        }"#;
        let cred: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(cred.access_token, "ya29.abc");
        assert!(cred.can_refresh());
        assert!(cred.covers(&["https://www.googleapis.com/auth/tasks"]));
        assert!(cred.expires_at.is_some());
    }
}
