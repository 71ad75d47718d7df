use std::sync::Arc;

use tracing::warn;

use crate::api::RemoteApi;
use crate::cell::{EntityCell, EntityState};
use crate::error::SyncError;
use crate::model::Cat;

/// A single cat opened on its own, e.g. from a deep link.
pub struct CatDetail {
    api: Arc<dyn RemoteApi>,
    cell: Arc<EntityCell<Cat>>,
}

impl CatDetail {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            cell: Arc::new(EntityCell::new("cat_detail")),
        }
    }

    pub fn cell(&self) -> &Arc<EntityCell<Cat>> {
        &self.cell
    }

    pub fn state(&self) -> EntityState<Cat> {
        self.cell.state()
    }

    pub fn cat(&self) -> Option<Cat> {
        self.cell.value()
    }

    pub async fn load(&self, cat_id: &str) -> Result<Cat, SyncError> {
        let Some(_ticket) = self.cell.begin_load() else {
            return Err(SyncError::Rejected("Already loading.".into()));
        };
        let result = self.api.get_cat(cat_id).await;
        if let Err(err) = &result {
            warn!(cat_id, error = %err, "cat detail failed");
        }
        self.cell.settle(&result);
        result
    }

    pub fn clear(&self) {
        self.cell.clear();
    }
}
