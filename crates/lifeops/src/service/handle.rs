//! Bound REST transport for one API name/version
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use log::debug;
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CredentialStore;
use crate::config::TransportConfig;
use crate::error::{Error, Result};

/// Cache key: API name and version, e.g. ("gmail", "v1")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub name: String,
    pub version: String,
}

impl ServiceKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Root URL for an API's REST surface
fn base_url_for(key: &ServiceKey) -> String {
    let version = key.version.as_str();
    match key.name.as_str() {
        "gmail" => format!("https://gmail.googleapis.com/gmail/{}", version),
        "calendar" => format!("https://www.googleapis.com/calendar/{}", version),
        "drive" => format!("https://www.googleapis.com/drive/{}", version),
        "tasks" => format!("https://tasks.googleapis.com/tasks/{}", version),
        name => format!("https://{}.googleapis.com/{}", name, version),
    }
}

/// Media uploads go to `/upload/...` under the same host
fn upload_url_for(base_url: &str) -> String {
    base_url.replacen("googleapis.com/", "googleapis.com/upload/", 1)
}

/// `multipart/related` body: JSON metadata first, then the media
fn multipart_related(
    boundary: &str,
    metadata: &Value,
    content_type: &str,
    content: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

/// An authenticated transport for one API
///
/// Every request fetches a bearer token from the shared `CredentialStore`,
/// which refreshes it in place when it has expired.
pub struct ServiceHandle {
    key: ServiceKey,
    base_url: String,
    upload_url: String,
    agent: ureq::Agent,
    credentials: Arc<CredentialStore>,
}

impl ServiceHandle {
    pub(crate) fn build(
        key: ServiceKey,
        credentials: Arc<CredentialStore>,
        transport: &TransportConfig,
    ) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(transport.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let base_url = base_url_for(&key);
        let upload_url = upload_url_for(&base_url);
        Self {
            key,
            base_url,
            upload_url,
            agent,
            credentials,
        }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.credentials.access_token()?))
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let mut request = self.agent.get(&url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        read_response(request.call())
    }

    pub fn delete(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        let request = self.agent.delete(&url).header("Authorization", &self.bearer()?);
        read_response(request.call())
    }

    pub fn post(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let mut request = self.agent.post(&url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        read_response(request.send_json(body))
    }

    pub fn patch(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!("PATCH {}", url);
        let mut request = self.agent.patch(&url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        read_response(request.send_json(body))
    }

    pub fn put(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!("PUT {}", url);
        let mut request = self.agent.put(&url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        read_response(request.send_json(body))
    }

    /// Create a resource from metadata plus media in one multipart request
    pub fn upload(
        &self,
        path: &str,
        query: &[(&str, &str)],
        metadata: &Value,
        content_type: &str,
        content: &[u8],
    ) -> Result<Value> {
        let url = format!("{}/{}", self.upload_url, path.trim_start_matches('/'));
        debug!("POST {} ({} bytes of {})", url, content.len(), content_type);
        let boundary = format!("lifeops_{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, metadata, content_type, content);
        let mut request = self
            .agent
            .post(&url)
            .header("Authorization", &self.bearer()?)
            .header(
                "Content-Type",
                &format!("multipart/related; boundary={}", boundary),
            )
            .query("uploadType", "multipart");
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        read_response(request.send(body.as_slice()))
    }

    /// GET a raw body (file media, exports) into `sink`; returns the byte count
    pub fn download(
        &self,
        path: &str,
        query: &[(&str, &str)],
        sink: &mut dyn Write,
    ) -> Result<u64> {
        let url = self.url(path);
        debug!("GET {} (media)", url);
        let mut request = self.agent.get(&url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        let mut response = request.call()?;
        let status = response.status();
        if !status.is_success() {
            let text = response.body_mut().read_to_string()?;
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }
        std::io::copy(&mut response.body_mut().as_reader(), sink).map_err(|e| Error::Transport {
            message: format!("Download of {} failed: {}", path, e),
        })
    }
}

fn read_response(
    response: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<Value> {
    let mut response = response?;
    let status = response.status();
    let text = response.body_mut().read_to_string()?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: api_error_message(&text),
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| Error::Transport {
        message: format!("Failed to parse response body: {}", e),
    })
}

/// Google error bodies look like {"error": {"code": 403, "message": "..."}}
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_urls() {
        assert_eq!(
            base_url_for(&ServiceKey::new("gmail", "v1")),
            "https://gmail.googleapis.com/gmail/v1"
        );
        assert_eq!(
            base_url_for(&ServiceKey::new("tasks", "v1")),
            "https://tasks.googleapis.com/tasks/v1"
        );
        assert_eq!(
            base_url_for(&ServiceKey::new("docs", "v1")),
            "https://docs.googleapis.com/v1"
        );
        assert_eq!(
            base_url_for(&ServiceKey::new("meet", "v2")),
            "https://meet.googleapis.com/v2"
        );
    }

    #[test]
    fn test_api_error_message_extracts_google_message() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(api_error_message(body), "The caller does not have permission");
        assert_eq!(api_error_message(" plain text "), "plain text");
    }

    #[test]
    fn test_upload_url_inserts_upload_segment() {
        assert_eq!(
            upload_url_for(&base_url_for(&ServiceKey::new("drive", "v3"))),
            "https://www.googleapis.com/upload/drive/v3"
        );
    }

    #[test]
    fn test_multipart_related_layout() {
        let metadata = serde_json::json!({"name": "a.txt"});
        let body = multipart_related("b0", &metadata, "text/plain", b"hi");
        assert_eq!(
            String::from_utf8(body).unwrap(),
            concat!(
                "--b0\r\n",
                "Content-Type: application/json; charset=UTF-8\r\n\r\n",
                "{\"name\":\"a.txt\"}\r\n",
                "--b0\r\n",
                "Content-Type: text/plain\r\n\r\n",
                "hi\r\n",
                "--b0--\r\n",
            )
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ServiceKey::new("sheets", "v4").to_string(), "sheets/v4");
    }
}
