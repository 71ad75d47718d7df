use tracing::debug;

use super::{MutationCoordinator, OptimisticMutation};
use crate::api::MembershipReceipt;
use crate::error::SyncError;

fn membership_key(collection_id: &str) -> String {
    format!("membership:{}", collection_id)
}

impl MutationCoordinator {
    pub async fn add_to_collection(
        &self,
        collection_id: &str,
        cat_id: &str,
    ) -> Result<MembershipReceipt, SyncError> {
        self.set_membership(collection_id, cat_id, true).await
    }

    pub async fn remove_from_collection(
        &self,
        collection_id: &str,
        cat_id: &str,
    ) -> Result<MembershipReceipt, SyncError> {
        self.set_membership(collection_id, cat_id, false).await
    }

    async fn set_membership(
        &self,
        collection_id: &str,
        cat_id: &str,
        add: bool,
    ) -> Result<MembershipReceipt, SyncError> {
        let _turn = self.queue.acquire(membership_key(collection_id)).await;
        let mutation = OptimisticMutation::apply(&self.collections, collection_id, |collection| {
            collection.item_count = if add {
                collection.item_count.saturating_add(1)
            } else {
                collection.item_count.saturating_sub(1)
            };
        });
        debug!(collection_id, cat_id, add, "membership applied");

        match self.api.mutate_membership(collection_id, cat_id, add).await {
            Ok(receipt) => {
                let count = receipt.item_count;
                mutation.confirm(&self.collections, |collection| collection.item_count = count);
                self.report_patched(collection_id);
                Ok(receipt)
            }
            Err(err) => {
                mutation.rollback();
                self.report_failure(collection_id, &err);
                Err(err)
            }
        }
    }
}
