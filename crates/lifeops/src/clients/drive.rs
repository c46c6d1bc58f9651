//! Google Drive files: metadata, folders, transfer, sharing, and deletion

use log::{debug, info, warn};
use serde_json::{Value, json};
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use super::segment;
use crate::error::{Error, Result};
use crate::models::{DriveFile, FOLDER_MIME_TYPE};
use crate::parse::{self, Batch, FILE_FIELDS, Raw};
use crate::service::{ServiceCache, ServiceHandle};

/// Access level granted by a sharing permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRole {
    Reader,
    Commenter,
    Writer,
}

impl ShareRole {
    pub fn as_api(self) -> &'static str {
        match self {
            ShareRole::Reader => "reader",
            ShareRole::Commenter => "commenter",
            ShareRole::Writer => "writer",
        }
    }
}

pub struct DriveClient {
    service: Arc<ServiceHandle>,
}

impl DriveClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.drive()?,
        })
    }

    /// List files matching a Drive query ("name contains 'budget'", ...).
    /// An empty query lists everything visible.
    pub fn list_files(
        &self,
        query: &str,
        max_results: u32,
        order_by: &str,
    ) -> Result<Batch<DriveFile>> {
        let page_size = max_results.to_string();
        let fields = format!("files({})", FILE_FIELDS);
        let mut params = vec![
            ("pageSize", page_size.as_str()),
            ("orderBy", order_by),
            ("fields", fields.as_str()),
        ];
        if !query.is_empty() {
            params.push(("q", query));
        }
        let response = self.service.get("files", &params)?;
        Ok(Batch::parse(
            Raw::new("files", &response).arr("files"),
            parse::file,
        ))
    }

    pub fn get_file(&self, file_id: &str) -> Result<DriveFile> {
        let response = self.service.get(
            &format!("files/{}", segment(file_id)),
            &[("fields", FILE_FIELDS)],
        )?;
        parse::file(&response)
    }

    /// First non-trashed folder with exactly this name
    pub fn find_folder(&self, name: &str) -> Result<Option<DriveFile>> {
        Ok(self
            .list_files(&folder_query(name), 5, "modifiedTime desc")?
            .into_items()
            .into_iter()
            .next())
    }

    /// Create a folder and return its id
    pub fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<String> {
        let mut body = json!({ "name": name, "mimeType": FOLDER_MIME_TYPE });
        if let Some(parent) = parent_id {
            body["parents"] = json!([parent]);
        }
        let response = self.service.post("files", &[("fields", "id")], &body)?;
        let id = Raw::new("file", &response).id("id")?;
        info!("Created folder {}: {}", id, name);
        Ok(id)
    }

    pub fn get_or_create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<String> {
        if let Some(existing) = self.find_folder(name)? {
            debug!("Folder already exists: {} ({})", name, existing.id);
            return Ok(existing.id);
        }
        self.create_folder(name, parent_id)
    }

    /// Upload a local file and return its Drive id.
    ///
    /// The MIME type is guessed from the extension unless given. The file is
    /// sent in one multipart request.
    pub fn upload_file(
        &self,
        local_path: &Path,
        folder_id: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<String> {
        if !local_path.is_file() {
            return Err(Error::invalid_argument(format!(
                "File not found: {}",
                local_path.display()
            )));
        }
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = content_type(local_path, mime_type);
        let content = fs::read(local_path).map_err(|e| Error::io(local_path, e))?;

        let response = self.service.upload(
            "files",
            &[("fields", "id,name")],
            &upload_metadata(&name, folder_id),
            &mime_type,
            &content,
        )?;
        let id = Raw::new("file", &response).id("id")?;
        info!("Uploaded {} -> Drive file {}", name, id);
        Ok(id)
    }

    /// Download a binary file's content to `dest_path`; returns the byte count
    pub fn download_file(&self, file_id: &str, dest_path: &Path) -> Result<u64> {
        let bytes = self.save_to(
            &format!("files/{}", segment(file_id)),
            &[("alt", "media")],
            dest_path,
        )?;
        info!("Downloaded Drive file {} -> {}", file_id, dest_path.display());
        Ok(bytes)
    }

    /// Export a Google Doc, Sheet, or Slides deck as `mime_type`
    /// ("text/plain", "application/pdf", "text/csv" for Sheets, ...)
    pub fn export_google_doc(
        &self,
        file_id: &str,
        dest_path: &Path,
        mime_type: &str,
    ) -> Result<u64> {
        let bytes = self.save_to(
            &format!("files/{}/export", segment(file_id)),
            &[("mimeType", mime_type)],
            dest_path,
        )?;
        info!(
            "Exported Drive file {} -> {} ({})",
            file_id,
            dest_path.display(),
            mime_type
        );
        Ok(bytes)
    }

    /// Anyone with the link gets `role`
    pub fn share_with_anyone(&self, file_id: &str, role: ShareRole) -> Result<()> {
        self.create_permission(file_id, &json!({ "type": "anyone", "role": role.as_api() }))?;
        info!("Shared {} publicly (role={})", file_id, role.as_api());
        Ok(())
    }

    pub fn share_with_user(&self, file_id: &str, email: &str, role: ShareRole) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::invalid_argument("share_with_user needs an email address"));
        }
        self.create_permission(
            file_id,
            &json!({ "type": "user", "role": role.as_api(), "emailAddress": email }),
        )?;
        info!("Shared {} with {} (role={})", file_id, email, role.as_api());
        Ok(())
    }

    /// Browser URL for a file; no API call
    pub fn get_web_link(&self, file_id: &str) -> String {
        format!("https://drive.google.com/file/d/{}/view", segment(file_id))
    }

    /// Move to trash; recoverable from the Drive UI
    pub fn trash_file(&self, file_id: &str) -> Result<()> {
        self.service.patch(
            &format!("files/{}", segment(file_id)),
            &[],
            &json!({ "trashed": true }),
        )?;
        info!("Trashed Drive file {}", file_id);
        Ok(())
    }

    /// Permanent; skips the trash
    pub fn delete_file(&self, file_id: &str) -> Result<()> {
        self.service.delete(&format!("files/{}", segment(file_id)))?;
        info!("Permanently deleted Drive file {}", file_id);
        Ok(())
    }

    fn create_permission(&self, file_id: &str, permission: &Value) -> Result<()> {
        self.service.post(
            &format!("files/{}/permissions", segment(file_id)),
            &[],
            permission,
        )?;
        Ok(())
    }

    /// Stream a media response into a new file; a partial file is removed on failure
    fn save_to(&self, path: &str, query: &[(&str, &str)], dest_path: &Path) -> Result<u64> {
        if let Some(parent) = dest_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut file = File::create(dest_path).map_err(|e| Error::io(dest_path, e))?;
        let result = self.service.download(path, query, &mut file);
        if result.is_err() {
            drop(file);
            if let Err(e) = fs::remove_file(dest_path) {
                warn!("Could not remove partial download {}: {}", dest_path.display(), e);
            }
        }
        result
    }
}

/// Explicit type, else a guess from the extension
fn content_type(local_path: &Path, explicit: Option<&str>) -> String {
    match explicit {
        Some(mime_type) => mime_type.to_string(),
        None => mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .to_string(),
    }
}

fn upload_metadata(name: &str, folder_id: Option<&str>) -> Value {
    let mut metadata = json!({ "name": name });
    if let Some(folder) = folder_id {
        metadata["parents"] = json!([folder]);
    }
    metadata
}

fn folder_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "mimeType='{}' and name='{}' and trashed=false",
        FOLDER_MIME_TYPE, escaped
    )
}
