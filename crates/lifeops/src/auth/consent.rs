//! Interactive OAuth2 consent
//!
//! Implements the authorization code flow for installed apps: a local HTTP
//! server receives the redirect, the browser is opened on the consent page,
//! and the returned code is exchanged for tokens.

use chrono::Utc;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use super::{Credential, TokenGrant};
use crate::config::{ClientSecrets, TransportConfig};
use crate::error::{Error, Result};

/// Obtains a brand-new credential from the user
pub trait ConsentFlow: Send + Sync {
    fn authorize(&self, scopes: &[String]) -> Result<Credential>;
}

/// Browser consent with a loopback redirect
pub struct LoopbackConsent {
    secrets: ClientSecrets,
    agent: ureq::Agent,
}

impl LoopbackConsent {
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Port range to try for the local callback server
    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    pub fn new(secrets: ClientSecrets, transport: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(transport.timeout))
            .build()
            .into();
        Self { secrets, agent }
    }

    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        for port in Self::PORT_RANGE_START..=Self::PORT_RANGE_END {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                return Ok((listener, port));
            }
        }
        Err(Error::auth(format!(
            "Could not bind to any port in range {}-{}",
            Self::PORT_RANGE_START,
            Self::PORT_RANGE_END
        )))
    }

    fn authorization_url(&self, redirect_uri: &str, scopes: &[String]) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.secrets.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
        )
    }

    /// Wait for the redirect and pull the authorization code out of it
    fn wait_for_callback(&self, listener: TcpListener) -> Result<String> {
        let (mut stream, _) = listener
            .accept()
            .map_err(|e| Error::auth(format!("Failed to accept callback connection: {}", e)))?;

        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .map_err(|e| Error::auth(format!("Failed to read callback request: {}", e)))?;

        // Format: GET /?code=AUTH_CODE&scope=... HTTP/1.1
        let callback = parse_callback(&request_line);

        let (status, body) = if callback.code.is_some() {
            ("200 OK", "Authentication successful! You can close this window.")
        } else {
            ("400 Bad Request", "Authentication failed. Please try again.")
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        if let Some(err) = callback.error {
            return Err(Error::auth(format!("OAuth error: {}", err)));
        }
        callback
            .code
            .ok_or_else(|| Error::auth("No authorization code received"))
    }

    fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        let mut response = self
            .agent
            .post(&self.secrets.token_uri)
            .send_form([
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .map_err(|e| Error::auth(format!("Failed to exchange authorization code: {}", e)))?;

        response
            .body_mut()
            .read_json::<TokenGrant>()
            .map_err(|e| Error::auth(format!("Failed to parse token response: {}", e)))
    }
}

impl ConsentFlow for LoopbackConsent {
    fn authorize(&self, scopes: &[String]) -> Result<Credential> {
        let (listener, port) = self.start_local_server()?;
        let redirect_uri = format!("http://localhost:{}", port);
        let auth_url = self.authorization_url(&redirect_uri, scopes);

        println!("\n=== Google Authorization Required ===");
        println!("Requesting {} scope(s). Opening browser...", scopes.len());
        println!("If the browser doesn't open, visit: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            log::warn!("Failed to open browser: {}. Please open the URL manually.", e);
        }

        let code = self.wait_for_callback(listener)?;
        let grant = self.exchange_code(&code, &redirect_uri)?;
        log::info!("OAuth flow completed");

        Ok(Credential::from_grant(grant, &self.secrets, scopes, Utc::now()))
    }
}

#[derive(Debug, Default, PartialEq)]
struct Callback {
    code: Option<String>,
    error: Option<String>,
}

fn parse_callback(request_line: &str) -> Callback {
    let query = request_line
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.split_once('?'))
        .map(|(_, query)| query)
        .unwrap_or_default();

    let mut callback = Callback::default();
    for param in query.split('&') {
        let (key, value) = param.split_once('=').unwrap_or((param, ""));
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        match key {
            "code" => callback.code = Some(value),
            "error" => callback.error = Some(value),
            _ => {}
        }
    }
    callback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_code() {
        let callback = parse_callback("GET /?code=4%2F0Abc&scope=email HTTP/1.1\r\n");
        assert_eq!(callback.code.as_deref(), Some("4/0Abc"));
        assert_eq!(callback.error, None);
    }

    #[test]
    fn test_parse_callback_error() {
        let callback = parse_callback("GET /?error=access_denied HTTP/1.1\r\n");
        assert_eq!(callback.code, None);
        assert_eq!(callback.error.as_deref(), Some("access_denied"));
    }

    #[test]
    fn test_parse_callback_without_query() {
        assert_eq!(parse_callback("GET /favicon.ico HTTP/1.1"), Callback::default());
    }

    #[test]
    fn test_authorization_url_joins_scopes() {
        let consent = LoopbackConsent::new(
            ClientSecrets {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                token_uri: crate::config::DEFAULT_TOKEN_URI.to_string(),
            },
            &TransportConfig::default(),
        );
        let url = consent.authorization_url(
            "http://localhost:8080",
            &["scope-a".to_string(), "scope-b".to_string()],
        );
        assert!(url.contains("scope=scope-a%20scope-b"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080"));
    }
}
