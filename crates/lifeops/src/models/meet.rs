use serde::{Deserialize, Serialize};

/// A persistent Meet space; its URI survives across conferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingSpace {
    /// "spaces/jEsU8RZgCRo"
    pub name: String,
    pub meeting_uri: String,
    pub meeting_code: String,
}
