//! Composition root: builds every store around one `RemoteApi` and wires
//! the mirrored lists into the mutation coordinator.

use std::sync::Arc;

use tracing::debug;

use crate::api::{FeedScope, Relationship, RemoteApi};
use crate::comments::CommentThreads;
use crate::compose::Composer;
use crate::config::SyncConfig;
use crate::follow_graph::FollowGraph;
use crate::detail::CatDetail;
use crate::model::{Cat, CollectionSummary, FollowEdge, UserSummary};
use crate::mutation::{AuthorMirror, Mirror, MutationCoordinator};
use crate::observe::ChangeFeed;
use crate::paged::PagedStore;
use crate::profile::ProfileStore;
use crate::search::SearchController;
use crate::sources::{
    CollectionDetailSource, CollectionListSource, EdgeScope, EdgeSource, FeedSource, SearchSource,
};
use crate::wait::WaitMs;

pub struct SyncRoot {
    config: SyncConfig,
    changes: ChangeFeed,
    feed: Arc<PagedStore<FeedSource>>,
    search: SearchController,
    collections: Arc<PagedStore<CollectionListSource>>,
    collection_detail: Arc<PagedStore<CollectionDetailSource>>,
    follow_graph: FollowGraph,
    viewer_following: Arc<PagedStore<EdgeSource>>,
    comments: CommentThreads,
    composer: Composer,
    profile: Arc<ProfileStore>,
    cat_detail: CatDetail,
    authors: Vec<Arc<dyn Mirror<UserSummary>>>,
    mutations: Arc<MutationCoordinator>,
}

impl SyncRoot {
    pub fn new(api: Arc<dyn RemoteApi>, timer: Arc<dyn WaitMs>, config: SyncConfig) -> Self {
        let config = config.normalized();
        let changes = ChangeFeed::new();
        let list = config.list_paging();

        let feed = Arc::new(
            PagedStore::new(FeedSource::new(api.clone()), Some(FeedScope::everyone()), list)
                .with_changes(changes.clone()),
        );
        let results = Arc::new(
            PagedStore::new(SearchSource::new(api.clone()), None, list).with_changes(changes.clone()),
        );
        let search = SearchController::with_results(results.clone(), timer, config.debounce());
        let collections = Arc::new(
            PagedStore::new(CollectionListSource::new(api.clone()), None, list)
                .with_changes(changes.clone()),
        );
        let collection_detail = Arc::new(
            PagedStore::new(
                CollectionDetailSource::new(api.clone()),
                None,
                config.detail_paging(),
            )
            .with_changes(changes.clone()),
        );
        let follow_graph = FollowGraph::new(api.clone(), list, changes.clone());
        let viewer_following = Arc::new(
            PagedStore::new(EdgeSource::new(api.clone(), Relationship::Following), None, list)
                .with_changes(changes.clone()),
        );
        let comments = CommentThreads::new(api.clone(), config.comment_paging(), changes.clone());
        let composer = Composer::new(api.clone(), feed.clone());
        let profile = Arc::new(ProfileStore::new(api.clone()));
        let cat_detail = CatDetail::new(api.clone());
        let authors = vec![
            Arc::new(AuthorMirror::new(feed.clone())) as Arc<dyn Mirror<UserSummary>>,
            Arc::new(AuthorMirror::new(results.clone())) as Arc<dyn Mirror<UserSummary>>,
            Arc::new(AuthorMirror::new(collection_detail.clone())) as Arc<dyn Mirror<UserSummary>>,
        ];

        let mutations = Arc::new(MutationCoordinator::new(api, changes.clone()));
        mutations.cats().track(feed.clone() as Arc<dyn Mirror<Cat>>);
        mutations.cats().track(results as Arc<dyn Mirror<Cat>>);
        mutations
            .cats()
            .track(collection_detail.clone() as Arc<dyn Mirror<Cat>>);
        mutations
            .cats()
            .track(cat_detail.cell().clone() as Arc<dyn Mirror<Cat>>);
        for author in &authors {
            mutations.users().track(author.clone());
        }
        mutations
            .users()
            .track(profile.cell().clone() as Arc<dyn Mirror<UserSummary>>);
        mutations
            .collections()
            .track(collections.clone() as Arc<dyn Mirror<CollectionSummary>>);
        mutations
            .edges()
            .track(follow_graph.followers().clone() as Arc<dyn Mirror<FollowEdge>>);
        mutations
            .edges()
            .track(follow_graph.following().clone() as Arc<dyn Mirror<FollowEdge>>);
        mutations.set_viewer_following(viewer_following.clone() as Arc<dyn Mirror<FollowEdge>>);
        debug!(?config, "sync root ready");

        Self {
            config,
            changes,
            feed,
            search,
            collections,
            collection_detail,
            follow_graph,
            viewer_following,
            comments,
            composer,
            profile,
            cat_detail,
            authors,
            mutations,
        }
    }

    /// Point the viewer-scoped lists at the signed-in user. Nothing is fetched.
    /// Switching to a different user empties both lists.
    pub fn set_viewer(&self, username: &str) {
        let scope = EdgeScope::following(username);
        if self.viewer_following.target().as_ref() != Some(&scope) {
            self.viewer_following.reset(Some(scope));
        }
        let owner = username.to_string();
        if self.collections.target().as_ref() != Some(&owner) {
            self.collections.reset(Some(owner));
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    pub fn feed(&self) -> &Arc<PagedStore<FeedSource>> {
        &self.feed
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn collections(&self) -> &Arc<PagedStore<CollectionListSource>> {
        &self.collections
    }

    pub fn collection_detail(&self) -> &Arc<PagedStore<CollectionDetailSource>> {
        &self.collection_detail
    }

    pub fn follow_graph(&self) -> &FollowGraph {
        &self.follow_graph
    }

    pub fn viewer_following(&self) -> &Arc<PagedStore<EdgeSource>> {
        &self.viewer_following
    }

    pub fn comments(&self) -> &CommentThreads {
        &self.comments
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn profile(&self) -> &Arc<ProfileStore> {
        &self.profile
    }

    pub fn cat_detail(&self) -> &CatDetail {
        &self.cat_detail
    }

    /// Author views over the cat lists, as tracked for follow mirroring.
    pub fn authors(&self) -> &[Arc<dyn Mirror<UserSummary>>] {
        &self.authors
    }

    pub fn mutations(&self) -> &Arc<MutationCoordinator> {
        &self.mutations
    }

    /// Tear down every store. Responses still in flight are ignored.
    pub fn close(&self) {
        self.search.clear_search();
        self.search.results().close();
        self.feed.close();
        self.collections.close();
        self.collection_detail.close();
        self.follow_graph.followers().close();
        self.follow_graph.following().close();
        self.viewer_following.close();
        self.comments.close_all();
        self.profile.clear();
        self.cat_detail.clear();
    }
}
