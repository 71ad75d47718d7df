use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, UserSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: String,
    pub owner: UserSummary,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "catCount", default)]
    pub item_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for CollectionSummary {
    fn id(&self) -> &str {
        &self.id
    }
}
