//! The profile being viewed, plus edits to the viewer's own profile.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{MediaPayload, ProfileUpdate, RemoteApi};
use crate::cell::{EntityCell, EntityState};
use crate::error::SyncError;
use crate::model::UserSummary;

struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn claim(flag: &'a AtomicBool, what: &str) -> Result<Self, SyncError> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(SyncError::Rejected(format!("Already {}.", what)));
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Holds one profile. Loading, profile edits and avatar changes each have
/// their own in-progress guard; all three report into one error message.
pub struct ProfileStore {
    api: Arc<dyn RemoteApi>,
    cell: Arc<EntityCell<UserSummary>>,
    updating_profile: AtomicBool,
    updating_avatar: AtomicBool,
}

impl ProfileStore {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            cell: Arc::new(EntityCell::new("profile")),
            updating_profile: AtomicBool::new(false),
            updating_avatar: AtomicBool::new(false),
        }
    }

    /// The backing cell, tracked as a mirror so follows reach it.
    pub fn cell(&self) -> &Arc<EntityCell<UserSummary>> {
        &self.cell
    }

    pub fn state(&self) -> EntityState<UserSummary> {
        self.cell.state()
    }

    pub fn profile(&self) -> Option<UserSummary> {
        self.cell.value()
    }

    pub fn error_message(&self) -> Option<String> {
        self.cell.state().error_message()
    }

    pub fn is_loading(&self) -> bool {
        self.cell.state().is_loading
    }

    pub fn is_updating_profile(&self) -> bool {
        self.updating_profile.load(Ordering::SeqCst)
    }

    pub fn is_updating_avatar(&self) -> bool {
        self.updating_avatar.load(Ordering::SeqCst)
    }

    /// Load `username`'s profile, or the viewer's own when `None`.
    pub async fn load_profile(&self, username: Option<&str>) -> Result<UserSummary, SyncError> {
        let Some(_ticket) = self.cell.begin_load() else {
            return Err(SyncError::Rejected("Already loading.".into()));
        };
        debug!(username, "loading profile");
        let result = self.api.fetch_profile(username).await;
        self.finish("profile load", &result);
        result
    }

    /// Save bio and location on the viewer's profile.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserSummary, SyncError> {
        let _busy = BusyFlag::claim(&self.updating_profile, "saving your profile")?;
        let update = ProfileUpdate {
            bio: update.bio.map(|bio| bio.trim().to_string()),
            location: update.location.map(|location| location.trim().to_string()),
        };
        let result = self.api.update_profile(&update).await;
        self.finish("profile update", &result);
        result
    }

    /// Upload a new avatar for the viewer.
    pub async fn update_avatar(&self, media: MediaPayload) -> Result<UserSummary, SyncError> {
        if media.is_empty() {
            return Err(SyncError::Rejected("An avatar needs a photo.".into()));
        }
        let _busy = BusyFlag::claim(&self.updating_avatar, "uploading an avatar")?;
        let result = self.api.change_avatar(&media).await;
        self.finish("avatar change", &result);
        result
    }

    /// Forget the held profile and any error, e.g. on sign-out.
    pub fn clear(&self) {
        self.cell.clear();
    }

    fn finish(&self, what: &str, result: &Result<UserSummary, SyncError>) {
        if let Err(err) = result {
            warn!(error = %err, "{} failed", what);
        }
        self.cell.settle(result);
    }
}
