//! Debounced tag search over a paged result list.
//!
//! Each submitted query opens a new generation. Starting a generation
//! cancels the previous one's debounce wait and any fetch it has in flight,
//! so only the newest generation can ever commit into the result list.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::api::{RemoteApi, SearchMode};
use crate::config::SyncConfig;
use crate::model::Cat;
use crate::paged::{ListState, LoadOutcome, PagedStore};
use crate::sources::{SearchQuery, SearchSource};
use crate::wait::WaitMs;

/// Split free text into a de-duplicated, lower-cased tag list.
///
/// Separators are whitespace, `,` and `#`. The order of first occurrence
/// is kept.
pub fn normalize_tags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| c.is_whitespace() || c == ',' || c == '#')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_lowercase)
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

struct Session {
    raw_query: String,
    query: SearchQuery,
    generation: u64,
    pending: CancellationToken,
}

impl Session {
    fn next_generation(&mut self) -> (u64, CancellationToken) {
        self.pending.cancel();
        self.pending = CancellationToken::new();
        self.generation += 1;
        (self.generation, self.pending.clone())
    }
}

struct Inner {
    timer: Arc<dyn WaitMs>,
    debounce: Duration,
    results: Arc<PagedStore<SearchSource>>,
    session: Mutex<Session>,
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Turns keystrokes into at most one search request per pause in typing.
///
/// The controller is cheap to clone; clones share one session. Methods
/// that start work spawn onto the current tokio runtime and hand back the
/// task's handle.
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<Inner>,
}

impl SearchController {
    pub fn new(api: Arc<dyn RemoteApi>, timer: Arc<dyn WaitMs>, config: &SyncConfig) -> Self {
        let results = PagedStore::new(SearchSource::new(api), None, config.list_paging());
        Self::with_results(Arc::new(results), timer, config.debounce())
    }

    pub fn with_results(
        results: Arc<PagedStore<SearchSource>>,
        timer: Arc<dyn WaitMs>,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                timer,
                debounce,
                results,
                session: Mutex::new(Session {
                    raw_query: String::new(),
                    query: SearchQuery::default(),
                    generation: 0,
                    pending: CancellationToken::new(),
                }),
            }),
        }
    }

    /// Accept new query text.
    ///
    /// An empty tag set clears the session immediately and returns `None`.
    /// Otherwise the search is issued after the debounce interval unless a
    /// later call supersedes it first.
    pub fn set_query(&self, text: &str) -> Option<JoinHandle<LoadOutcome>> {
        let tags = normalize_tags(text);
        let mut session = self.inner.session();
        session.raw_query = text.to_string();
        if tags.is_empty() {
            drop(session);
            self.clear_search();
            return None;
        }

        let (generation, token) = session.next_generation();
        let query = SearchQuery::new(tags, session.query.mode);
        session.query = query.clone();
        self.inner.results.supersede(query.clone());
        drop(session);

        debug!(generation, tags = ?query.tags, "search debounced");
        let inner = self.inner.clone();
        let wait_ms = u64::try_from(inner.debounce.as_millis()).unwrap_or(u64::MAX);
        Some(tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    trace!(generation, "debounced search abandoned");
                    LoadOutcome::Discarded
                }
                _ = inner.timer.wait_ms(wait_ms) => {
                    if inner.session().generation != generation {
                        return LoadOutcome::Discarded;
                    }
                    inner.results.refresh_if_target(query).await
                }
            }
        }))
    }

    /// Search `tags` right away, skipping the debounce wait.
    pub fn search_now(&self, tags: &[String], mode: SearchMode) -> Option<JoinHandle<LoadOutcome>> {
        let tags = normalize_tags(&tags.join(" "));
        if tags.is_empty() {
            self.clear_search();
            return None;
        }

        let mut session = self.inner.session();
        let (generation, _) = session.next_generation();
        let query = SearchQuery::new(tags, mode);
        session.raw_query = query.tags.join(" ");
        session.query = query.clone();
        self.inner.results.supersede(query.clone());
        drop(session);

        debug!(generation, tags = ?query.tags, mode = mode.as_str(), "search issued");
        let results = self.inner.results.clone();
        Some(tokio::spawn(async move { results.refresh_if_target(query).await }))
    }

    /// Switch between any-tag and all-tag matching, re-running the active query.
    pub fn set_mode(&self, mode: SearchMode) -> Option<JoinHandle<LoadOutcome>> {
        let tags = {
            let mut session = self.inner.session();
            if session.query.mode == mode {
                return None;
            }
            session.query.mode = mode;
            session.query.tags.clone()
        };
        if tags.is_empty() {
            return None;
        }
        self.search_now(&tags, mode)
    }

    /// Drop the query and the result list. Nothing is fetched.
    pub fn clear_search(&self) {
        let mut session = self.inner.session();
        let (generation, _) = session.next_generation();
        session.query.tags.clear();
        self.inner.results.reset(None);
        trace!(generation, "search cleared");
    }

    pub async fn load_more_if_needed(&self, anchor_id: &str) -> LoadOutcome {
        self.inner.results.load_more_if_needed(anchor_id).await
    }

    pub fn generation(&self) -> u64 {
        self.inner.session().generation
    }

    /// Normalized tags of the active query.
    pub fn tags(&self) -> Vec<String> {
        self.inner.session().query.tags.clone()
    }

    pub fn mode(&self) -> SearchMode {
        self.inner.session().query.mode
    }

    pub fn raw_query(&self) -> String {
        self.inner.session().raw_query.clone()
    }

    pub fn state(&self) -> ListState<Cat> {
        self.inner.results.state()
    }

    pub fn results(&self) -> &Arc<PagedStore<SearchSource>> {
        &self.inner.results
    }
}
