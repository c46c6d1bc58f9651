use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file or folder in Drive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub created_time: DateTime<Utc>,
    pub modified_time: DateTime<Utc>,
    pub web_view_link: String,
    /// Absent for Google-native documents and folders
    pub size_bytes: Option<u64>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Docs, Sheets, Slides, folders, and other Google-native types
    pub fn is_google_doc(&self) -> bool {
        self.mime_type.starts_with("application/vnd.google-apps.")
    }

    /// Size in KiB, rounded to one decimal
    pub fn size_kb(&self) -> Option<f64> {
        self.size_bytes
            .map(|bytes| (bytes as f64 / 1024.0 * 10.0).round() / 10.0)
    }
}

/// Value type of a label field, from which `*Options` key the API sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelFieldType {
    Text,
    Integer,
    Date,
    Selection,
    User,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelField {
    pub id: String,
    pub display_name: String,
    pub field_type: LabelFieldType,
}

/// A Drive Labels schema ("Project", "Status", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveLabel {
    pub id: String,
    /// Resource name, "labels/{id}" with an optional "@revision"
    pub name: String,
    pub title: String,
    pub description: String,
    pub label_type: String,
    pub fields: Vec<LabelField>,
    pub is_published: bool,
}

impl DriveLabel {
    pub fn field(&self, display_name: &str) -> Option<&LabelField> {
        self.fields
            .iter()
            .find(|f| f.display_name.eq_ignore_ascii_case(display_name))
    }
}
