use serde_json::Value;

use super::Raw;
use crate::error::Result;
use crate::models::Contact;

/// Fields requested from the People API
pub const PERSON_FIELDS: &str = "names,emailAddresses,phoneNumbers,organizations";

/// A People API `Person`; identity is `resourceName`
pub fn person(value: &Value) -> Result<Contact> {
    let raw = Raw::new("person", value);
    let resource_name = raw.id("resourceName")?;

    let values = |field: &str| -> Vec<String> {
        raw.arr(field)
            .iter()
            .map(|v| Raw::new("person", v).str("value"))
            .filter(|v| !v.is_empty())
            .collect()
    };
    let first = |field: &str, key: &str| -> String {
        raw.arr(field)
            .first()
            .map(|v| Raw::new("person", v).str(key))
            .unwrap_or_default()
    };

    Ok(Contact {
        resource_name,
        name: first("names", "displayName"),
        emails: values("emailAddresses"),
        phones: values("phoneNumbers"),
        organization: first("organizations", "name"),
    })
}
