mod support;

use std::sync::{Arc, Mutex};

use feedsync::api::{CollectionPage, FollowReceipt, MembershipReceipt, SearchMode};
use feedsync::api::LikeReceipt;
use feedsync::{ChangeEvent, SyncError, SyncRoot};
use feedsync::model::FollowEdge;
use support::*;

fn like_state(cat: Option<feedsync::Cat>) -> Option<(u64, bool)> {
    cat.map(|cat| (cat.like_count, cat.viewer_has_liked))
}

/// Feed and search results both holding `c1` with 24 likes.
async fn root_with_shared_cat(api: &Arc<MockApi>) -> SyncRoot {
    api.push(
        Endpoint::ListCats,
        Ok(page(vec![cat("c0", 1, false), cat("c1", 24, false)], None)),
    );
    api.push(Endpoint::SearchCats, Ok(page(vec![cat("c1", 24, false)], None)));
    let root = root(api);
    root.feed().refresh().await;
    root.search()
        .search_now(&["tabby".to_string()], SearchMode::Any)
        .unwrap()
        .await
        .unwrap();
    root
}

fn record(root: &SyncRoot) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    root.changes().on_any({
        let events = events.clone();
        move |event| {
            if !matches!(event, ChangeEvent::ListCommitted { .. }) {
                events.lock().unwrap().push(event.clone());
            }
        }
    });
    events
}

#[tokio::test]
async fn failed_like_rolls_back_every_copy() {
    let api = MockApi::new();
    let root = root_with_shared_cat(&api).await;
    let events = record(&root);
    let gate = api.push_gated::<LikeReceipt>(
        Endpoint::MutateLike,
        Err(SyncError::Http {
            status: 500,
            message: "boom".into(),
        }),
    );

    let mutations = root.mutations().clone();
    let pending = tokio::spawn(async move { mutations.toggle_like("c1").await });
    settle().await;
    assert_eq!(like_state(root.feed().find("c1")), Some((25, true)));
    assert_eq!(like_state(root.search().results().find("c1")), Some((25, true)));

    open(&gate);
    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "HTTP 500: boom");
    assert_eq!(like_state(root.feed().find("c1")), Some((24, false)));
    assert_eq!(like_state(root.search().results().find("c1")), Some((24, false)));
    assert_eq!(
        *events.lock().unwrap(),
        vec![ChangeEvent::MutationFailed {
            id: "c1".into(),
            message: "HTTP 500: boom".into()
        }]
    );
}

#[tokio::test]
async fn confirmed_like_takes_server_values_everywhere() {
    let api = MockApi::new();
    let root = root_with_shared_cat(&api).await;
    let events = record(&root);
    api.push(Endpoint::MutateLike, Ok(liked("c1", 30, true)));

    let receipt = root.mutations().set_like("c1", true).await.unwrap();
    assert_eq!(receipt.like_count, 30);
    assert_eq!(like_state(root.feed().find("c1")), Some((30, true)));
    assert_eq!(like_state(root.search().results().find("c1")), Some((30, true)));
    assert_eq!(like_state(root.feed().find("c0")), Some((1, false)));
    assert_eq!(
        *events.lock().unwrap(),
        vec![ChangeEvent::EntityPatched { id: "c1".into() }]
    );
    assert_eq!(api.calls_to(Endpoint::MutateLike)[0].detail, "c1 true");
}

#[tokio::test]
async fn second_toggle_waits_for_the_first() {
    let api = MockApi::new();
    let root = root_with_shared_cat(&api).await;
    let gate = api.push_gated(Endpoint::MutateLike, Ok(liked("c1", 25, true)));
    api.push(Endpoint::MutateLike, Ok(liked("c1", 24, false)));

    let first = tokio::spawn({
        let mutations = root.mutations().clone();
        async move { mutations.toggle_like("c1").await }
    });
    settle().await;
    let second = tokio::spawn({
        let mutations = root.mutations().clone();
        async move { mutations.toggle_like("c1").await }
    });
    settle().await;
    assert_eq!(api.count(Endpoint::MutateLike), 1);
    assert!(root.mutations().queue().is_pending("like:c1"));

    open(&gate);
    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());
    let details: Vec<String> = api
        .calls_to(Endpoint::MutateLike)
        .into_iter()
        .map(|call| call.detail)
        .collect();
    assert_eq!(details, vec!["c1 true", "c1 false"]);
    assert_eq!(like_state(root.feed().find("c1")), Some((24, false)));
}

#[tokio::test]
async fn toggling_an_unloaded_cat_is_refused() {
    let api = MockApi::new();
    let root = root(&api);

    let err = root.mutations().toggle_like("ghost").await.unwrap_err();
    assert_eq!(err, SyncError::UnknownEntity("ghost".into()));
    assert_eq!(api.count(Endpoint::MutateLike), 0);
}

#[tokio::test]
async fn cancelled_like_rolls_back_silently() {
    let api = MockApi::new();
    let root = root_with_shared_cat(&api).await;
    let events = record(&root);
    api.push::<LikeReceipt>(Endpoint::MutateLike, Err(SyncError::Cancelled));

    assert!(root.mutations().toggle_like("c1").await.is_err());
    assert_eq!(like_state(root.feed().find("c1")), Some((24, false)));
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn like_reaches_the_open_collection_and_rolls_back_there() {
    let api = MockApi::new();
    let root = root_with_shared_cat(&api).await;
    api.push(
        Endpoint::GetCollection,
        Ok(CollectionPage {
            collection: collection("k1", 2),
            cats: page(vec![cat("c1", 24, false), cat("c9", 3, true)], None),
        }),
    );
    root.collection_detail().refresh_target("k1".to_string()).await;
    api.push(Endpoint::MutateLike, Ok(liked("c1", 31, true)));
    let gate = api.push_gated::<LikeReceipt>(
        Endpoint::MutateLike,
        Err(SyncError::Network("offline".into())),
    );

    root.mutations().set_like("c1", true).await.unwrap();
    assert_eq!(like_state(root.collection_detail().find("c1")), Some((31, true)));
    assert_eq!(like_state(root.feed().find("c1")), Some((31, true)));
    assert_eq!(like_state(root.collection_detail().find("c9")), Some((3, true)));

    let pending = tokio::spawn({
        let mutations = root.mutations().clone();
        async move { mutations.toggle_like("c1").await }
    });
    settle().await;
    assert_eq!(like_state(root.collection_detail().find("c1")), Some((30, false)));
    assert_eq!(like_state(root.search().results().find("c1")), Some((30, false)));

    open(&gate);
    assert!(pending.await.unwrap().is_err());
    assert_eq!(like_state(root.collection_detail().find("c1")), Some((31, true)));
    assert_eq!(like_state(root.feed().find("c1")), Some((31, true)));
    assert_eq!(like_state(root.search().results().find("c1")), Some((31, true)));
}

/// zed posted `c1` in the feed and zed's profile is open. The viewer does not follow zed.
async fn root_with_author(api: &Arc<MockApi>) -> SyncRoot {
    let zed = profile("zed", Some(false), 5);
    api.push(
        Endpoint::ListCats,
        Ok(page(vec![cat_by("c1", zed.clone()), cat("c2", 0, false)], None)),
    );
    api.push(Endpoint::FetchProfile, Ok(zed));
    let root = root(api);
    root.feed().refresh().await;
    root.profile().load_profile(Some("zed")).await.unwrap();
    root
}

fn author_state(root: &SyncRoot, cat_id: &str) -> Option<(Option<bool>, u64)> {
    root.feed()
        .find(cat_id)
        .map(|cat| (cat.author.is_followed, cat.author.follower_count))
}

fn profile_state(root: &SyncRoot) -> Option<(Option<bool>, u64)> {
    root.profile()
        .profile()
        .map(|user| (user.is_followed, user.follower_count))
}

#[tokio::test]
async fn confirmed_follow_updates_cat_authors_and_the_open_profile() {
    let api = MockApi::new();
    let root = root_with_author(&api).await;
    let gate = api.push_gated(
        Endpoint::MutateFollow,
        Ok(FollowReceipt {
            status: "followed".into(),
        }),
    );

    let zed = root.feed().find("c1").unwrap().author;
    let pending = tokio::spawn({
        let mutations = root.mutations().clone();
        async move { mutations.set_follow(&zed, true).await }
    });
    settle().await;
    assert_eq!(author_state(&root, "c1"), Some((Some(true), 6)));
    assert_eq!(profile_state(&root), Some((Some(true), 6)));

    open(&gate);
    pending.await.unwrap().unwrap();
    assert_eq!(author_state(&root, "c1"), Some((Some(true), 6)));
    assert_eq!(profile_state(&root), Some((Some(true), 6)));
    assert_eq!(author_state(&root, "c2"), Some((None, 0)));
}

#[tokio::test]
async fn failed_follow_restores_cat_authors_and_the_open_profile() {
    let api = MockApi::new();
    let root = root_with_author(&api).await;
    api.push::<FollowReceipt>(Endpoint::MutateFollow, Err(SyncError::Network("offline".into())));

    let zed = root.profile().profile().unwrap();
    assert!(root.mutations().toggle_follow(&zed).await.is_err());
    assert_eq!(api.calls_to(Endpoint::MutateFollow)[0].detail, "zed true");
    assert_eq!(author_state(&root, "c1"), Some((Some(false), 5)));
    assert_eq!(profile_state(&root), Some((Some(false), 5)));
}

/// Viewer `me` follows zed; ana's followers list contains bo.
async fn root_with_follow_graph(api: &Arc<MockApi>) -> SyncRoot {
    api.push(Endpoint::ListEdges, Ok(page(vec![edge("zed", Some(true), 5)], None)));
    let root = root(api);
    root.set_viewer("me");
    root.viewer_following().refresh().await;

    api.push(Endpoint::ListEdges, Ok(page(vec![edge("bo", Some(false), 2)], None)));
    api.push(Endpoint::ListEdges, Ok(page(Vec::<FollowEdge>::new(), None)));
    root.follow_graph().refresh("ana").await;
    root
}

fn follow_state(root: &SyncRoot, username: &str) -> Option<(Option<bool>, u64)> {
    root.follow_graph()
        .followers()
        .find(username)
        .map(|edge| (edge.user.is_followed, edge.user.follower_count))
}

fn viewer_following(root: &SyncRoot) -> Vec<String> {
    root.viewer_following()
        .items()
        .into_iter()
        .map(|edge| edge.user.username)
        .collect()
}

#[tokio::test]
async fn follow_splices_into_viewer_list_and_rolls_back() {
    let api = MockApi::new();
    let root = root_with_follow_graph(&api).await;
    let bo = root.follow_graph().followers().find("bo").unwrap().user;
    let gate = api.push_gated::<FollowReceipt>(
        Endpoint::MutateFollow,
        Err(SyncError::Network("offline".into())),
    );

    let pending = tokio::spawn({
        let mutations = root.mutations().clone();
        async move { mutations.toggle_follow(&bo).await }
    });
    settle().await;
    assert_eq!(follow_state(&root, "bo"), Some((Some(true), 3)));
    assert_eq!(viewer_following(&root), vec!["bo", "zed"]);

    open(&gate);
    assert!(pending.await.unwrap().is_err());
    assert_eq!(follow_state(&root, "bo"), Some((Some(false), 2)));
    assert_eq!(viewer_following(&root), vec!["zed"]);
    assert_eq!(api.calls_to(Endpoint::MutateFollow)[0].detail, "bo true");
}

#[tokio::test]
async fn confirmed_unfollow_removes_from_viewer_list() {
    let api = MockApi::new();
    let root = root_with_follow_graph(&api).await;
    api.push(
        Endpoint::MutateFollow,
        Ok(FollowReceipt {
            status: "unfollowed".into(),
        }),
    );

    let zed = root.viewer_following().find("zed").unwrap().user;
    root.mutations().toggle_follow(&zed).await.unwrap();
    assert!(viewer_following(&root).is_empty());
    assert_eq!(api.calls_to(Endpoint::MutateFollow)[0].detail, "zed false");
}

#[tokio::test]
async fn failed_unfollow_restores_list_position() {
    let api = MockApi::new();
    api.push(
        Endpoint::ListEdges,
        Ok(page(
            vec![
                edge("a", Some(true), 1),
                edge("b", Some(true), 8),
                edge("c", Some(true), 1),
            ],
            None,
        )),
    );
    api.push::<FollowReceipt>(Endpoint::MutateFollow, Err(SyncError::Server(String::new())));
    let root = root(&api);
    root.set_viewer("me");
    root.viewer_following().refresh().await;

    let b = root.viewer_following().find("b").unwrap().user;
    let err = root.mutations().set_follow(&b, false).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error.");
    assert_eq!(viewer_following(&root), vec!["a", "b", "c"]);
    let restored = root.viewer_following().find("b").unwrap().user;
    assert_eq!((restored.is_followed, restored.follower_count), (Some(true), 8));
}

#[tokio::test]
async fn server_refusing_the_follow_reverts_it() {
    let api = MockApi::new();
    let root = root_with_follow_graph(&api).await;
    api.push(
        Endpoint::MutateFollow,
        Ok(FollowReceipt {
            status: "not_following".into(),
        }),
    );

    let bo = root.follow_graph().followers().find("bo").unwrap().user;
    let receipt = root.mutations().set_follow(&bo, true).await.unwrap();
    assert_eq!(receipt.is_following(), Some(false));
    assert_eq!(follow_state(&root, "bo"), Some((Some(false), 2)));
    assert_eq!(viewer_following(&root), vec!["zed"]);
}

#[tokio::test]
async fn switching_viewer_empties_the_viewer_lists() {
    let api = MockApi::new();
    let root = root_with_follow_graph(&api).await;
    assert_eq!(viewer_following(&root), vec!["zed"]);

    root.set_viewer("me");
    assert_eq!(viewer_following(&root), vec!["zed"]);

    root.set_viewer("other");
    assert!(viewer_following(&root).is_empty());
    let scope = root.viewer_following().target().unwrap();
    assert_eq!(scope.username, "other");
    assert_eq!(root.collections().target().as_deref(), Some("other"));

    let zed = user("zed");
    api.push(
        Endpoint::MutateFollow,
        Ok(FollowReceipt {
            status: "unfollowed".into(),
        }),
    );
    root.mutations().set_follow(&zed, false).await.unwrap();
    assert!(viewer_following(&root).is_empty());
}

#[tokio::test]
async fn membership_count_moves_before_the_call_resolves() {
    let api = MockApi::new();
    api.push(Endpoint::ListCollections, Ok(page(vec![collection("k1", 2)], None)));
    let gate = api.push_gated(
        Endpoint::MutateMembership,
        Ok(MembershipReceipt {
            collection_id: "k1".into(),
            item_count: 7,
        }),
    );
    api.push::<MembershipReceipt>(
        Endpoint::MutateMembership,
        Err(SyncError::Network("offline".into())),
    );
    let root = root(&api);
    root.set_viewer("me");
    root.collections().refresh().await;
    let count = |root: &SyncRoot| root.collections().find("k1").map(|c| c.item_count);

    let pending = tokio::spawn({
        let mutations = root.mutations().clone();
        async move { mutations.add_to_collection("k1", "c1").await }
    });
    settle().await;
    assert_eq!(count(&root), Some(3));

    open(&gate);
    assert_eq!(pending.await.unwrap().unwrap().item_count, 7);
    assert_eq!(count(&root), Some(7));

    assert!(root.mutations().remove_from_collection("k1", "c1").await.is_err());
    assert_eq!(count(&root), Some(7));
    assert_eq!(api.calls_to(Endpoint::MutateMembership)[1].detail, "k1 c1 false");
}
