//! Error types shared by every lifeops component

/// Errors surfaced by lifeops operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A credential could not be obtained, refreshed, or re-consented
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// A raw API response lacked a required identity field
    #[error("Malformed {resource} response: missing '{field}'")]
    MalformedResponse { resource: String, field: String },

    /// The API is gated behind an account tier this account doesn't have
    #[error("{api} is not available for this account: {message}")]
    AccessRestricted { api: String, message: String },

    /// The API answered with a non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (timeout, DNS, TLS, IO)
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Reading or writing a local file (uploads, downloads, exports)
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    pub fn malformed(resource: impl Into<String>, field: impl Into<String>) -> Self {
        Error::MalformedResponse {
            resource: resource.into(),
            field: field.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is the "permission denied" class of API fault (HTTP 403)
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::Api { status: 403, .. })
    }

    /// Whether the API reported the resource as missing (HTTP 404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Config {
            message: format!("{:#}", e),
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(status) => Error::Api {
                status,
                message: format!("HTTP status {}", status),
            },
            other => Error::Transport {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_detection() {
        let err = Error::Api {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert!(err.is_permission_denied());
        assert!(!err.is_not_found());

        let err = Error::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_permission_denied());
    }

    #[test]
    fn test_status_code_maps_to_api_error() {
        let err: Error = ureq::Error::StatusCode(404).into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_message() {
        let err = Error::malformed("message", "id");
        assert_eq!(err.to_string(), "Malformed message response: missing 'id'");
    }
}
