use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, UserSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "commentId")]
    pub id: String,
    pub cat_id: String,
    #[serde(rename = "comment")]
    pub body: String,
    #[serde(rename = "commentAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "user")]
    pub author: UserSummary,
    #[serde(default)]
    pub is_owner: bool,
    /// Set on locally synthesized comments until the server confirms them.
    #[serde(skip)]
    pub pending: bool,
}

impl Comment {
    pub(crate) fn pending(
        local_id: String,
        cat_id: &str,
        body: String,
        author: UserSummary,
    ) -> Self {
        Self {
            id: local_id,
            cat_id: cat_id.to_string(),
            body,
            created_at: Utc::now(),
            author,
            is_owner: true,
            pending: true,
        }
    }
}

impl Identified for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}
