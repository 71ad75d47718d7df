//! A store holding at most one entity, e.g. an open profile or cat detail.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::SyncError;
use crate::model::Identified;
use crate::mutation::Mirror;

/// Published snapshot of an [`EntityCell`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<T> {
    pub value: Option<T>,
    pub is_loading: bool,
    pub last_error: Option<SyncError>,
}

impl<T> Default for EntityState<T> {
    fn default() -> Self {
        Self {
            value: None,
            is_loading: false,
            last_error: None,
        }
    }
}

impl<T> EntityState<T> {
    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().and_then(SyncError::display_message)
    }
}

pub struct EntityCell<T> {
    label: &'static str,
    inner: Mutex<EntityState<T>>,
    published: watch::Sender<EntityState<T>>,
}

impl<T: Identified> EntityCell<T> {
    pub fn new(label: &'static str) -> Self {
        let (published, _) = watch::channel(EntityState::default());
        Self {
            label,
            inner: Mutex::new(EntityState::default()),
            published,
        }
    }

    pub fn state(&self) -> EntityState<T> {
        self.lock().clone()
    }

    pub fn value(&self) -> Option<T> {
        self.lock().value.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EntityState<T>> {
        self.published.subscribe()
    }

    /// Mark a load as started. `None` if one is already running. The load
    /// ends when the returned ticket is dropped.
    pub(crate) fn begin_load(&self) -> Option<LoadTicket<'_, T>> {
        let mut inner = self.lock();
        if inner.is_loading {
            return None;
        }
        inner.is_loading = true;
        self.publish(&inner);
        Some(LoadTicket(self))
    }

    /// Record the outcome of a request that answers with the whole entity.
    /// A cancellation leaves both value and error untouched.
    pub(crate) fn settle(&self, result: &Result<T, SyncError>) {
        let mut inner = self.lock();
        match result {
            Ok(value) => {
                inner.value = Some(value.clone());
                inner.last_error = None;
            }
            Err(err) if err.is_cancellation() => {}
            Err(err) => inner.last_error = Some(err.clone()),
        }
        self.publish(&inner);
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        *inner = EntityState::default();
        self.publish(&inner);
    }

    fn publish(&self, inner: &EntityState<T>) {
        self.published.send_replace(inner.clone());
    }

    fn lock(&self) -> MutexGuard<'_, EntityState<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) struct LoadTicket<'a, T: Identified>(&'a EntityCell<T>);

impl<T: Identified> Drop for LoadTicket<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.0.lock();
        inner.is_loading = false;
        self.0.publish(&inner);
    }
}

impl<T: Identified> Mirror<T> for EntityCell<T> {
    fn label(&self) -> &str {
        self.label
    }

    fn find(&self, id: &str) -> Option<T> {
        self.lock().value.as_ref().filter(|value| value.id() == id).cloned()
    }

    fn patch(&self, id: &str, f: &mut dyn FnMut(&mut T)) -> bool {
        let mut inner = self.lock();
        match inner.value.as_mut() {
            Some(value) if value.id() == id => f(value),
            _ => return false,
        }
        self.publish(&inner);
        true
    }

    fn restore(&self, id: &str, item: T) -> bool {
        let mut inner = self.lock();
        match inner.value.as_ref() {
            Some(value) if value.id() == id => inner.value = Some(item),
            _ => return false,
        }
        self.publish(&inner);
        true
    }

    fn insert_at(&self, _index: usize, _item: T) -> bool {
        false
    }

    fn remove(&self, _id: &str) -> Option<(usize, T)> {
        None
    }
}
