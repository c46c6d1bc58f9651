use chrono::Utc;
use serde_json::Value;

use super::Raw;
use crate::error::Result;
use crate::models::{DriveFile, DriveLabel, LabelField, LabelFieldType};

/// Fields requested for every file
pub const FILE_FIELDS: &str = "id,name,mimeType,createdTime,modifiedTime,webViewLink,size";

pub fn file(value: &Value) -> Result<DriveFile> {
    let raw = Raw::new("file", value);

    // Drive reports size as a decimal string
    let size_bytes = match value.get("size") {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_u64(),
        _ => None,
    };

    Ok(DriveFile {
        id: raw.id("id")?,
        name: raw.str("name"),
        mime_type: raw.str("mimeType"),
        created_time: raw.time("createdTime").unwrap_or_else(Utc::now),
        modified_time: raw.time("modifiedTime").unwrap_or_else(Utc::now),
        web_view_link: raw.str("webViewLink"),
        size_bytes,
    })
}

/// `labels.get` / an entry of `labels.list`
pub fn label(value: &Value) -> Result<DriveLabel> {
    let raw = Raw::new("label", value);
    let properties = raw.obj("properties");
    Ok(DriveLabel {
        id: raw.id("id")?,
        name: raw.str("name"),
        title: properties.str("title"),
        description: properties.str("description"),
        label_type: raw.str("labelType"),
        fields: raw.arr("fields").iter().map(label_field).collect(),
        is_published: value
            .get("publishedLabelInfo")
            .is_some_and(|info| !info.is_null()),
    })
}

fn label_field(value: &Value) -> LabelField {
    let raw = Raw::new("label field", value);
    let field_type = [
        ("textOptions", LabelFieldType::Text),
        ("integerOptions", LabelFieldType::Integer),
        ("dateOptions", LabelFieldType::Date),
        ("selectionOptions", LabelFieldType::Selection),
        ("userOptions", LabelFieldType::User),
    ]
    .into_iter()
    .find(|(key, _)| value.get(key).is_some())
    .map_or(LabelFieldType::Unknown, |(_, kind)| kind);
    LabelField {
        id: raw.str("id"),
        display_name: raw.obj("properties").str("displayName"),
        field_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_size_from_string() {
        let f = file(&json!({
            "id": "f1",
            "name": "report.pdf",
            "mimeType": "application/pdf",
            "createdTime": "2025-01-01T00:00:00.000Z",
            "modifiedTime": "2025-01-02T00:00:00.000Z",
            "size": "2048"
        }))
        .unwrap();
        assert_eq!(f.size_bytes, Some(2048));
        assert_eq!(f.size_kb(), Some(2.0));
        assert_eq!(f.modified_time.to_rfc3339(), "2025-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_folder_without_size() {
        let f = file(&json!({"id": "d1", "mimeType": "application/vnd.google-apps.folder"})).unwrap();
        assert!(f.is_folder());
        assert_eq!(f.size_bytes, None);
    }

    #[test]
    fn test_label_with_typed_fields() {
        let l = label(&json!({
            "id": "abc123",
            "name": "labels/abc123@7",
            "labelType": "SHARED",
            "properties": {"title": "Status", "description": "Where it stands"},
            "publishedLabelInfo": {"revisionId": "7"},
            "fields": [
                {"id": "f1", "properties": {"displayName": "Stage"}, "selectionOptions": {}},
                {"id": "f2", "properties": {"displayName": "Owner"}, "userOptions": {}},
                {"id": "f3", "properties": {"displayName": "Odd"}, "mystery": {}}
            ]
        }))
        .unwrap();

        assert_eq!(l.title, "Status");
        assert!(l.is_published);
        assert_eq!(l.fields.len(), 3);
        assert_eq!(l.field("stage").unwrap().field_type, LabelFieldType::Selection);
        assert_eq!(l.fields[1].field_type, LabelFieldType::User);
        assert_eq!(l.fields[2].field_type, LabelFieldType::Unknown);
    }

    #[test]
    fn test_unpublished_label_and_missing_id() {
        let l = label(&json!({"id": "x", "properties": {"title": "Draft"}})).unwrap();
        assert!(!l.is_published);
        assert!(l.fields.is_empty());
        assert!(label(&json!({"name": "labels/"})).is_err());
    }
}
