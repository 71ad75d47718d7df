use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{Intent, ListState, LoadOutcome, PageSource};
use crate::config::Paging;
use crate::error::SyncError;
use crate::flight::{Flight, SingleFlight};
use crate::model::{Identified, Page};
use crate::mutation::Mirror;
use crate::observe::{ChangeEvent, ChangeFeed};

#[derive(Debug, Clone, Copy)]
enum Mode {
    Replace,
    Append,
}

struct Inner<T, K> {
    state: ListState<T>,
    target: Option<K>,
    /// Bumped whenever in-flight results must be ignored.
    epoch: u64,
    cancel: CancellationToken,
    closed: bool,
}

impl<T, K> Inner<T, K> {
    fn next_epoch(&mut self) -> u64 {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.epoch += 1;
        self.epoch
    }
}

/// An ordered, de-duplicated list of entities loaded page by page.
///
/// State is only mutated under a short synchronous lock, never across an
/// await, and every mutation publishes a complete snapshot.
pub struct PagedStore<S: PageSource> {
    source: S,
    paging: Paging,
    inner: Mutex<Inner<S::Item, S::Target>>,
    /// Keyed by epoch too, so a load from a superseded epoch is never joined.
    flight: SingleFlight<(Intent<S::Target>, u64)>,
    published: watch::Sender<ListState<S::Item>>,
    changes: Option<ChangeFeed>,
}

impl<S: PageSource> PagedStore<S> {
    pub fn new(source: S, target: Option<S::Target>, paging: Paging) -> Self {
        let (published, _) = watch::channel(ListState::default());
        Self {
            source,
            paging,
            inner: Mutex::new(Inner {
                state: ListState::default(),
                target,
                epoch: 0,
                cancel: CancellationToken::new(),
                closed: false,
            }),
            flight: SingleFlight::new(),
            published,
            changes: None,
        }
    }

    /// Announce commits on `changes` as [`ChangeEvent::ListCommitted`].
    pub fn with_changes(mut self, changes: ChangeFeed) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn state(&self) -> ListState<S::Item> {
        self.lock().state.clone()
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.lock().state.items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive a snapshot after every commit. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> watch::Receiver<ListState<S::Item>> {
        self.published.subscribe()
    }

    pub fn target(&self) -> Option<S::Target> {
        self.lock().target.clone()
    }

    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Reload the first page of the current target.
    pub async fn refresh(&self) -> LoadOutcome {
        match self.target() {
            Some(target) => self.refresh_inner(target).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Point the store at `target` and reload its first page.
    pub async fn refresh_target(&self, target: S::Target) -> LoadOutcome {
        self.retarget(target.clone());
        self.refresh_inner(target).await
    }

    /// Reload the first page of `target` only if it is still the store's
    /// target when the fetch starts.
    pub async fn refresh_if_target(&self, target: S::Target) -> LoadOutcome {
        self.refresh_inner(target).await
    }

    /// Switch target without clearing items. In-flight loads for the old
    /// target are cancelled and their results ignored, and the old cursor is
    /// dropped so no page of the old target is appended. Returns the epoch.
    pub fn retarget(&self, target: S::Target) -> u64 {
        let mut inner = self.lock();
        if inner.target.as_ref() == Some(&target) {
            return inner.epoch;
        }
        let epoch = inner.next_epoch();
        inner.target = Some(target);
        inner.state.is_loading = false;
        inner.state.cursor = None;
        inner.state.has_more = false;
        self.publish(&inner);
        epoch
    }

    /// Start a new epoch for `target` even if it is already the target.
    /// Everything in flight is cancelled and its result ignored. Items stay
    /// visible but the cursor is dropped. Returns the epoch.
    pub fn supersede(&self, target: S::Target) -> u64 {
        let mut inner = self.lock();
        let epoch = inner.next_epoch();
        inner.target = Some(target);
        inner.state.is_loading = false;
        inner.state.cursor = None;
        inner.state.has_more = false;
        self.publish(&inner);
        epoch
    }

    /// Empty the list and switch target. Nothing is fetched.
    pub fn reset(&self, target: Option<S::Target>) -> u64 {
        let mut inner = self.lock();
        let epoch = inner.next_epoch();
        inner.target = target;
        inner.state.clear();
        self.publish(&inner);
        epoch
    }

    /// Tear the store down: later results are ignored, later loads skipped.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.next_epoch();
        inner.closed = true;
        inner.state.is_loading = false;
        self.publish(&inner);
    }

    /// Infinite-scroll trigger: load the next page when `anchor_id` is within
    /// the trailing window, more pages exist, and nothing is loading.
    pub async fn load_more_if_needed(&self, anchor_id: &str) -> LoadOutcome {
        {
            let inner = self.lock();
            if !inner.state.trigger_armed(anchor_id, self.paging.prefetch_window) {
                return LoadOutcome::Skipped;
            }
        }
        self.load_next_page().await
    }

    /// Load the next page regardless of scroll position ("Load more" button).
    pub async fn load_next_page(&self) -> LoadOutcome {
        let (target, epoch) = {
            let inner = self.lock();
            if inner.closed || !inner.state.has_more || inner.state.is_loading {
                return LoadOutcome::Skipped;
            }
            match inner.target.clone() {
                Some(target) => (target, inner.epoch),
                None => return LoadOutcome::Skipped,
            }
        };

        let key = (Intent::LoadMore(target.clone()), epoch);
        self.flight
            .try_run(key, || self.fetch_and_commit(target, Mode::Append))
            .await
            .unwrap_or(LoadOutcome::Skipped)
    }

    pub fn find(&self, id: &str) -> Option<S::Item> {
        self.lock().state.get(id).cloned()
    }

    /// First item matching `matches`.
    pub fn find_where(&self, matches: &dyn Fn(&S::Item) -> bool) -> Option<S::Item> {
        self.lock().state.items.iter().find(|item| matches(item)).cloned()
    }

    /// Patch every item matching `matches`. Returns how many were patched.
    pub fn patch_where(
        &self,
        matches: &dyn Fn(&S::Item) -> bool,
        f: &mut dyn FnMut(&mut S::Item),
    ) -> usize {
        let mut inner = self.lock();
        let mut patched = 0;
        for item in inner.state.items.iter_mut().filter(|item| matches(item)) {
            f(item);
            patched += 1;
        }
        if patched > 0 {
            self.publish(&inner);
        }
        patched
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().state.position(id).is_some()
    }

    /// Patch the copy of `id` in place. Returns false if the list does not hold it.
    pub fn patch(&self, id: &str, f: &mut dyn FnMut(&mut S::Item)) -> bool {
        let mut inner = self.lock();
        let Some(index) = inner.state.position(id) else {
            return false;
        };
        f(&mut inner.state.items[index]);
        self.publish(&inner);
        true
    }

    /// Swap the item stored under `id` for `item` (whose id may differ).
    pub fn replace(&self, id: &str, item: S::Item) -> bool {
        let mut inner = self.lock();
        let Some(index) = inner.state.position(id) else {
            return false;
        };
        if item.id() != id && inner.state.position(item.id()).is_some() {
            inner.state.items.remove(index);
        } else {
            inner.state.items[index] = item;
        }
        self.publish(&inner);
        true
    }

    /// Insert at `index` (clamped). Returns false if the id is already present.
    pub fn insert_at(&self, index: usize, item: S::Item) -> bool {
        let mut inner = self.lock();
        if inner.state.position(item.id()).is_some() {
            return false;
        }
        let index = index.min(inner.state.items.len());
        inner.state.items.insert(index, item);
        self.publish(&inner);
        true
    }

    pub fn prepend(&self, item: S::Item) -> bool {
        self.insert_at(0, item)
    }

    pub fn remove(&self, id: &str) -> Option<(usize, S::Item)> {
        let mut inner = self.lock();
        let index = inner.state.position(id)?;
        let item = inner.state.items.remove(index);
        self.publish(&inner);
        Some((index, item))
    }

    async fn refresh_inner(&self, target: S::Target) -> LoadOutcome {
        let key = (Intent::Refresh(target.clone()), self.epoch());
        match self
            .flight
            .run_exclusive(key, || self.fetch_and_commit(target, Mode::Replace))
            .await
        {
            Flight::Led(outcome) => outcome,
            Flight::Joined => LoadOutcome::Coalesced,
        }
    }

    async fn fetch_and_commit(&self, target: S::Target, mode: Mode) -> LoadOutcome {
        let (epoch, cancel, cursor) = {
            let mut inner = self.lock();
            if inner.closed {
                return LoadOutcome::Skipped;
            }
            if inner.target.as_ref() != Some(&target) {
                return LoadOutcome::Discarded;
            }
            let cursor = match mode {
                Mode::Replace => None,
                Mode::Append => inner.state.cursor.clone(),
            };
            inner.state.is_loading = true;
            self.publish(&inner);
            (inner.epoch, inner.cancel.clone(), cursor)
        };

        debug!(store = self.source.label(), ?target, epoch, ?mode, "fetching page");
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SyncError::Cancelled),
            page = self.source.fetch(&target, cursor.as_ref(), self.paging.page_size) => page,
        };

        self.commit(epoch, mode, result)
    }

    fn commit(
        &self,
        epoch: u64,
        mode: Mode,
        result: Result<Page<S::Item>, SyncError>,
    ) -> LoadOutcome {
        let mut inner = self.lock();
        if inner.closed || inner.epoch != epoch {
            trace!(store = self.source.label(), epoch, current = inner.epoch, "discarding stale page");
            return LoadOutcome::Discarded;
        }

        inner.state.is_loading = false;
        let outcome = match result {
            Ok(page) => {
                let added = match mode {
                    Mode::Replace => inner.state.replace_page(page),
                    Mode::Append => inner.state.append_page(page),
                };
                inner.state.last_error = None;
                debug!(store = self.source.label(), epoch, added, has_more = inner.state.has_more, "page committed");
                LoadOutcome::Committed { added }
            }
            Err(err) if err.is_cancellation() => LoadOutcome::Discarded,
            Err(err) => {
                warn!(store = self.source.label(), epoch, error = %err, "page load failed");
                inner.state.last_error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        };
        self.publish(&inner);
        let len = inner.state.items.len();
        drop(inner);

        if outcome.is_committed() {
            if let Some(changes) = &self.changes {
                changes.emit(&ChangeEvent::ListCommitted {
                    store: self.source.label().to_string(),
                    len,
                });
            }
        }
        outcome
    }

    fn publish(&self, inner: &Inner<S::Item, S::Target>) {
        self.published.send_replace(inner.state.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S::Item, S::Target>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: PageSource> Mirror<S::Item> for PagedStore<S> {
    fn label(&self) -> &str {
        self.source.label()
    }

    fn find(&self, id: &str) -> Option<S::Item> {
        PagedStore::find(self, id)
    }

    fn patch(&self, id: &str, f: &mut dyn FnMut(&mut S::Item)) -> bool {
        PagedStore::patch(self, id, f)
    }

    fn restore(&self, id: &str, item: S::Item) -> bool {
        PagedStore::replace(self, id, item)
    }

    fn insert_at(&self, index: usize, item: S::Item) -> bool {
        PagedStore::insert_at(self, index, item)
    }

    fn remove(&self, id: &str) -> Option<(usize, S::Item)> {
        PagedStore::remove(self, id)
    }
}
