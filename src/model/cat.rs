use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A posted cat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<CatLocation>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "poster")]
    pub author: UserSummary,
    #[serde(rename = "likes", default)]
    pub like_count: u64,
    #[serde(rename = "userLiked", default)]
    pub viewer_has_liked: bool,
}

/// The mutable social fields of a [`Cat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub like_count: u64,
    pub viewer_has_liked: bool,
}

impl Cat {
    pub fn like_state(&self) -> LikeState {
        LikeState {
            like_count: self.like_count,
            viewer_has_liked: self.viewer_has_liked,
        }
    }

    pub fn set_like_state(&mut self, state: LikeState) {
        self.like_count = state.like_count;
        self.viewer_has_liked = state.viewer_has_liked;
    }

    /// Optimistic like delta: count moves by exactly one (floored at zero)
    /// and the viewer flag follows `liked`. Applying the current state is a no-op.
    pub fn apply_like(&mut self, liked: bool) {
        if self.viewer_has_liked == liked {
            return;
        }
        self.like_count = if liked {
            self.like_count.saturating_add(1)
        } else {
            self.like_count.saturating_sub(1)
        };
        self.viewer_has_liked = liked;
    }
}

impl Identified for Cat {
    fn id(&self) -> &str {
        &self.id
    }
}
