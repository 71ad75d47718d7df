use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identified;

/// Public profile summary; identified by username.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub post_count: u64,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub is_followed: Option<bool>,
}

impl UserSummary {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Optimistic follow delta on the target's profile.
    pub fn apply_follow(&mut self, follow: bool) {
        if self.is_followed == Some(follow) {
            return;
        }
        self.follower_count = if follow {
            self.follower_count.saturating_add(1)
        } else {
            self.follower_count.saturating_sub(1)
        };
        self.is_followed = Some(follow);
    }
}

impl Identified for UserSummary {
    fn id(&self) -> &str {
        &self.username
    }
}

/// A follower/following edge, identified by the other user's username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdge {
    pub user: UserSummary,
    #[serde(default)]
    pub followed_at: Option<DateTime<Utc>>,
}

impl Identified for FollowEdge {
    fn id(&self) -> &str {
        &self.user.username
    }
}
