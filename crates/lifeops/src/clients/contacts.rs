//! Google Contacts via the People API

use std::sync::Arc;

use crate::error::Result;
use crate::models::Contact;
use crate::parse::{self, Batch, PERSON_FIELDS, Raw};
use crate::service::{ServiceCache, ServiceHandle};

pub struct ContactsClient {
    service: Arc<ServiceHandle>,
}

impl ContactsClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.people()?,
        })
    }

    /// Prefix search over names, emails, and phone numbers
    pub fn search(&self, query: &str, max_results: u32) -> Result<Batch<Contact>> {
        let page_size = max_results.to_string();
        let response = self.service.get(
            "people:searchContacts",
            &[
                ("query", query),
                ("readMask", PERSON_FIELDS),
                ("pageSize", &page_size),
            ],
        )?;
        Ok(person_batch(
            Raw::new("contacts", &response)
                .arr("results")
                .iter()
                .filter_map(|r| r.get("person")),
        ))
    }

    /// First contact holding exactly this address, ignoring case
    pub fn get_by_email(&self, email: &str) -> Result<Option<Contact>> {
        Ok(self
            .search(email, 10)?
            .into_items()
            .into_iter()
            .find(|c| c.has_email(email)))
    }

    /// Contacts whose display name contains `name`, ignoring case
    pub fn get_by_name(&self, name: &str) -> Result<Vec<Contact>> {
        Ok(filter_by_name(self.search(name, 10)?.into_items(), name))
    }

    pub fn list_all(&self, max_results: u32) -> Result<Batch<Contact>> {
        let page_size = max_results.min(1000).to_string();
        let response = self.service.get(
            "people/me/connections",
            &[("personFields", PERSON_FIELDS), ("pageSize", &page_size)],
        )?;
        Ok(person_batch(
            Raw::new("connections", &response).arr("connections").iter(),
        ))
    }
}

fn person_batch<'a>(people: impl Iterator<Item = &'a serde_json::Value>) -> Batch<Contact> {
    Batch::from_results(
        people.map(|p| (Raw::new("person", p).opt_str("resourceName"), parse::person(p))),
    )
}

fn filter_by_name(contacts: Vec<Contact>, name: &str) -> Vec<Contact> {
    let needle = name.to_lowercase();
    contacts
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_batch_skips_people_without_resource_name() {
        let results = json!([
            {"resourceName": "people/c1", "names": [{"displayName": "Ann"}]},
            {"names": [{"displayName": "Ghost"}]}
        ]);
        let batch = person_batch(results.as_array().unwrap().iter());
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.items[0].name, "Ann");
        assert_eq!(batch.skipped.len(), 1);
    }

    #[test]
    fn test_filter_by_name_is_case_insensitive() {
        let contacts = vec![
            Contact {
                name: "Maria Lopez".to_string(),
                ..Default::default()
            },
            Contact {
                name: "Mark Twain".to_string(),
                ..Default::default()
            },
        ];
        let found = filter_by_name(contacts, "LOPEZ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Maria Lopez");
    }
}
