//! Scriptable in-memory `RemoteApi`.
//!
//! Replies are queued per endpoint and handed out in call order. A reply
//! may carry a gate: the call is logged and bound to its reply at once,
//! but does not return until the test opens the gate.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedsync::api::{
    CatDraft, CollectionPage, FeedScope, FollowAction, FollowReceipt, LikeReceipt, MediaPayload,
    MembershipReceipt, ProfileUpdate, Relationship, RemoteApi, SearchMode,
};
use feedsync::model::{Cat, CollectionSummary, Comment, Cursor, FollowEdge, Page, UserSummary};
use feedsync::SyncError;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FetchProfile,
    UpdateProfile,
    ChangeAvatar,
    GetCat,
    ListCats,
    SearchCats,
    MutateLike,
    MutateFollow,
    ListEdges,
    PostComment,
    ListComments,
    CreateCat,
    ListCollections,
    GetCollection,
    MutateMembership,
}

/// One logged request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub detail: String,
}

struct Scripted<T> {
    result: Result<T, SyncError>,
    gate: Option<Arc<Semaphore>>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    replies: HashMap<Endpoint, VecDeque<Box<dyn Any + Send>>>,
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push<T: Send + 'static>(&self, endpoint: Endpoint, result: Result<T, SyncError>) {
        self.enqueue(endpoint, Scripted { result, gate: None });
    }

    /// Queue a reply that is held back until the returned gate is opened.
    pub fn push_gated<T: Send + 'static>(
        &self,
        endpoint: Endpoint,
        result: Result<T, SyncError>,
    ) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.enqueue(
            endpoint,
            Scripted {
                result,
                gate: Some(gate.clone()),
            },
        );
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.endpoint == endpoint)
            .collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.calls_to(endpoint).len()
    }

    fn enqueue<T: Send + 'static>(&self, endpoint: Endpoint, scripted: Scripted<T>) {
        self.state
            .lock()
            .unwrap()
            .replies
            .entry(endpoint)
            .or_default()
            .push_back(Box::new(scripted));
    }

    async fn respond<T: Send + 'static>(
        &self,
        endpoint: Endpoint,
        detail: String,
    ) -> Result<T, SyncError> {
        let scripted = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call { endpoint, detail });
            state
                .replies
                .get_mut(&endpoint)
                .and_then(VecDeque::pop_front)
        };
        let Some(scripted) = scripted else {
            return Err(SyncError::Network(format!("no scripted reply for {:?}", endpoint)));
        };
        let Scripted { result, gate } = *scripted
            .downcast::<Scripted<T>>()
            .unwrap_or_else(|_| panic!("scripted reply for {:?} has the wrong type", endpoint));
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }
        result
    }
}

/// Let one gated call through.
pub fn open(gate: &Semaphore) {
    gate.add_permits(1);
}

fn cursor_detail(cursor: Option<&Cursor>) -> String {
    cursor.map_or_else(|| "-".to_string(), |c| c.to_string())
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn fetch_profile(&self, username: Option<&str>) -> Result<UserSummary, SyncError> {
        self.respond(Endpoint::FetchProfile, username.unwrap_or("-").to_string())
            .await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserSummary, SyncError> {
        let detail = format!(
            "{} {}",
            update.bio.as_deref().unwrap_or("-"),
            update.location.as_deref().unwrap_or("-")
        );
        self.respond(Endpoint::UpdateProfile, detail).await
    }

    async fn change_avatar(&self, media: &MediaPayload) -> Result<UserSummary, SyncError> {
        self.respond(Endpoint::ChangeAvatar, media.as_base64().to_string())
            .await
    }

    async fn get_cat(&self, cat_id: &str) -> Result<Cat, SyncError> {
        self.respond(Endpoint::GetCat, cat_id.to_string()).await
    }

    async fn list_cats(
        &self,
        limit: usize,
        cursor: Option<&Cursor>,
        scope: &FeedScope,
    ) -> Result<Page<Cat>, SyncError> {
        let user = scope.username.clone().unwrap_or_else(|| "*".into());
        let detail = format!("{} {} {}", user, cursor_detail(cursor), limit);
        self.respond(Endpoint::ListCats, detail).await
    }

    async fn search_cats(
        &self,
        tags: &[String],
        mode: SearchMode,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Cat>, SyncError> {
        let detail = format!("{} {} {} {}", tags.join(","), mode.as_str(), cursor_detail(cursor), limit);
        self.respond(Endpoint::SearchCats, detail).await
    }

    async fn mutate_like(&self, cat_id: &str, like: bool) -> Result<LikeReceipt, SyncError> {
        self.respond(Endpoint::MutateLike, format!("{} {}", cat_id, like)).await
    }

    async fn mutate_follow(
        &self,
        username: &str,
        action: FollowAction,
    ) -> Result<FollowReceipt, SyncError> {
        let detail = format!("{} {}", username, action.is_follow());
        self.respond(Endpoint::MutateFollow, detail).await
    }

    async fn list_edges(
        &self,
        username: &str,
        relationship: Relationship,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<FollowEdge>, SyncError> {
        let detail = format!("{} {} {} {}", username, relationship, cursor_detail(cursor), limit);
        self.respond(Endpoint::ListEdges, detail).await
    }

    async fn post_comment(&self, cat_id: &str, text: &str) -> Result<Comment, SyncError> {
        self.respond(Endpoint::PostComment, format!("{} {}", cat_id, text)).await
    }

    async fn list_comments(
        &self,
        cat_id: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Comment>, SyncError> {
        let detail = format!("{} {} {}", cat_id, cursor_detail(cursor), limit);
        self.respond(Endpoint::ListComments, detail).await
    }

    async fn create_cat(&self, draft: &CatDraft) -> Result<Cat, SyncError> {
        let detail = format!("{} {}", draft.name, draft.tag_field().unwrap_or_default());
        self.respond(Endpoint::CreateCat, detail).await
    }

    async fn list_collections(
        &self,
        owner: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<CollectionSummary>, SyncError> {
        let detail = format!("{} {} {}", owner, cursor_detail(cursor), limit);
        self.respond(Endpoint::ListCollections, detail).await
    }

    async fn get_collection(
        &self,
        collection_id: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<CollectionPage, SyncError> {
        let detail = format!("{} {} {}", collection_id, cursor_detail(cursor), limit);
        self.respond(Endpoint::GetCollection, detail).await
    }

    async fn mutate_membership(
        &self,
        collection_id: &str,
        cat_id: &str,
        add: bool,
    ) -> Result<MembershipReceipt, SyncError> {
        let detail = format!("{} {} {}", collection_id, cat_id, add);
        self.respond(Endpoint::MutateMembership, detail).await
    }
}
