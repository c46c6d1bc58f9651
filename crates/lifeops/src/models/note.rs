use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Keep note (Workspace accounts only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeepNote {
    /// "notes/abc123"
    pub name: String,
    pub title: String,
    pub text: String,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub trashed: bool,
    pub pinned: bool,
    pub labels: Vec<String>,
}
