use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::{Mirror, MutationCoordinator, OptimisticMutation};
use crate::api::{FollowAction, FollowReceipt};
use crate::error::SyncError;
use crate::model::{FollowEdge, UserSummary};

fn follow_key(username: &str) -> String {
    format!("follow:{}", username)
}

/// How the viewer's following list was changed, so it can be undone.
enum Splice {
    None,
    Inserted(Arc<dyn Mirror<FollowEdge>>),
    Removed(Arc<dyn Mirror<FollowEdge>>, usize, FollowEdge),
}

impl Splice {
    fn undo(self, username: &str) {
        match self {
            Splice::None => {}
            Splice::Inserted(list) => {
                list.remove(username);
            }
            Splice::Removed(list, index, edge) => {
                list.insert_at(index, edge);
            }
        }
    }
}

impl MutationCoordinator {
    /// Follow `target` if the viewer does not follow them yet, otherwise unfollow.
    pub async fn toggle_follow(&self, target: &UserSummary) -> Result<FollowReceipt, SyncError> {
        let _turn = self.queue.acquire(follow_key(&target.username)).await;
        let following = self
            .edges
            .find(&target.username)
            .and_then(|edge| edge.user.is_followed)
            .or_else(|| {
                self.users
                    .find(&target.username)
                    .and_then(|user| user.is_followed)
            })
            .or(target.is_followed)
            .unwrap_or(false);
        self.follow_in_turn(target, !following).await
    }

    pub async fn set_follow(
        &self,
        target: &UserSummary,
        follow: bool,
    ) -> Result<FollowReceipt, SyncError> {
        let _turn = self.queue.acquire(follow_key(&target.username)).await;
        self.follow_in_turn(target, follow).await
    }

    async fn follow_in_turn(
        &self,
        target: &UserSummary,
        follow: bool,
    ) -> Result<FollowReceipt, SyncError> {
        let username = target.username.as_str();
        let mutation =
            OptimisticMutation::apply(&self.edges, username, |edge| edge.user.apply_follow(follow));
        let profiles =
            OptimisticMutation::apply(&self.users, username, |user| user.apply_follow(follow));
        let splice = self.splice_following(target, follow);
        debug!(
            username,
            follow,
            edges = mutation.copies(),
            profiles = profiles.copies(),
            "follow applied"
        );

        let result = self
            .api
            .mutate_follow(username, FollowAction::from_follow(follow))
            .await;

        match result {
            Ok(receipt) if receipt.is_following().map_or(true, |state| state == follow) => {
                mutation.confirm(&self.edges, |edge| edge.user.is_followed = Some(follow));
                profiles.confirm(&self.users, |user| user.is_followed = Some(follow));
                self.report_patched(username);
                Ok(receipt)
            }
            Ok(receipt) => {
                // The server kept the previous relationship.
                splice.undo(username);
                mutation.rollback();
                profiles.rollback();
                self.report_patched(username);
                Ok(receipt)
            }
            Err(err) => {
                splice.undo(username);
                mutation.rollback();
                profiles.rollback();
                self.report_failure(username, &err);
                Err(err)
            }
        }
    }

    fn splice_following(&self, target: &UserSummary, follow: bool) -> Splice {
        let Some(list) = self.viewer_following() else {
            return Splice::None;
        };

        if follow {
            let mut user = target.clone();
            user.apply_follow(true);
            let edge = FollowEdge {
                user,
                followed_at: Some(Utc::now()),
            };
            if list.insert_at(0, edge) {
                return Splice::Inserted(list);
            }
            Splice::None
        } else {
            match list.remove(&target.username) {
                Some((index, edge)) => Splice::Removed(list, index, edge),
                None => Splice::None,
            }
        }
    }
}
