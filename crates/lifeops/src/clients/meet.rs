//! Google Meet spaces

use log::info;
use serde_json::json;
use std::sync::Arc;

use super::segment;
use crate::error::Result;
use crate::models::MeetingSpace;
use crate::parse;
use crate::service::{ServiceCache, ServiceHandle};

pub struct MeetClient {
    service: Arc<ServiceHandle>,
}

impl MeetClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.meet()?,
        })
    }

    /// New meeting space with default settings
    pub fn create_space(&self) -> Result<MeetingSpace> {
        let space = parse::space(&self.service.post("spaces", &[], &json!({}))?)?;
        info!("Created meeting space {} ({})", space.name, space.meeting_uri);
        Ok(space)
    }

    /// `name` may be "spaces/{id}" or the bare id
    pub fn get_space(&self, name: &str) -> Result<MeetingSpace> {
        parse::space(&self.service.get(&space_path(name), &[])?)
    }

    pub fn end_active_conference(&self, name: &str) -> Result<()> {
        self.service.post(
            &format!("{}:endActiveConference", space_path(name)),
            &[],
            &json!({}),
        )?;
        info!("Ended active conference in {}", name);
        Ok(())
    }
}

fn space_path(name: &str) -> String {
    let id = name.strip_prefix("spaces/").unwrap_or(name);
    format!("spaces/{}", segment(id))
}
