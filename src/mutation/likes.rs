use tracing::debug;

use super::{MutationCoordinator, OptimisticMutation};
use crate::api::LikeReceipt;
use crate::error::SyncError;
use crate::model::LikeState;

fn like_key(cat_id: &str) -> String {
    format!("like:{}", cat_id)
}

impl MutationCoordinator {
    /// Flip the viewer's like on `cat_id`. Queues behind an unresolved like on the same cat.
    pub async fn toggle_like(&self, cat_id: &str) -> Result<LikeReceipt, SyncError> {
        let _turn = self.queue.acquire(like_key(cat_id)).await;
        let current = self
            .cats
            .find(cat_id)
            .ok_or_else(|| SyncError::UnknownEntity(cat_id.to_string()))?;
        self.like_in_turn(cat_id, !current.viewer_has_liked).await
    }

    /// Like (`true`) or unlike (`false`) `cat_id`.
    pub async fn set_like(&self, cat_id: &str, liked: bool) -> Result<LikeReceipt, SyncError> {
        let _turn = self.queue.acquire(like_key(cat_id)).await;
        self.like_in_turn(cat_id, liked).await
    }

    async fn like_in_turn(&self, cat_id: &str, liked: bool) -> Result<LikeReceipt, SyncError> {
        let mutation = OptimisticMutation::apply(&self.cats, cat_id, |cat| cat.apply_like(liked));
        debug!(cat_id, liked, copies = mutation.copies(), "like applied");

        match self.api.mutate_like(cat_id, liked).await {
            Ok(receipt) => {
                let confirmed = LikeState {
                    like_count: receipt.like_count,
                    viewer_has_liked: receipt.viewer_has_liked,
                };
                mutation.confirm(&self.cats, |cat| cat.set_like_state(confirmed));
                self.report_patched(cat_id);
                Ok(receipt)
            }
            Err(err) => {
                mutation.rollback();
                self.report_failure(cat_id, &err);
                Err(err)
            }
        }
    }
}
