use feedsync::api::{LikeReceipt, MediaPayload, CatDraft};
use feedsync::model::{Cat, CollectionSummary, Comment, Cursor, FollowEdge, Page, UserSummary};

pub fn user(username: &str) -> UserSummary {
    UserSummary::named(username)
}

pub fn cat(id: &str, likes: u64, liked: bool) -> Cat {
    Cat {
        id: id.to_string(),
        name: format!("cat {}", id),
        tags: vec!["cat".into()],
        created_at: None,
        description: None,
        location: None,
        image_url: None,
        author: user("poster"),
        like_count: likes,
        viewer_has_liked: liked,
    }
}

pub fn profile(username: &str, followed: Option<bool>, followers: u64) -> UserSummary {
    let mut user = user(username);
    user.is_followed = followed;
    user.follower_count = followers;
    user
}

pub fn cat_by(id: &str, author: UserSummary) -> Cat {
    Cat {
        author,
        ..cat(id, 0, false)
    }
}

/// Cats `c<from>` up to but excluding `c<to>`.
pub fn cats(from: usize, to: usize) -> Vec<Cat> {
    (from..to).map(|n| cat(&format!("c{}", n), 0, false)).collect()
}

pub fn page<T>(items: Vec<T>, next: Option<&str>) -> Page<T> {
    Page::new(items, next.map(Cursor::from))
}

pub fn ids(items: &[Cat]) -> Vec<String> {
    items.iter().map(|cat| cat.id.clone()).collect()
}

pub fn liked(cat_id: &str, likes: u64, liked: bool) -> LikeReceipt {
    LikeReceipt {
        cat_id: cat_id.to_string(),
        like_count: likes,
        viewer_has_liked: liked,
    }
}

pub fn edge(username: &str, followed: Option<bool>, followers: u64) -> FollowEdge {
    let mut user = user(username);
    user.is_followed = followed;
    user.follower_count = followers;
    FollowEdge {
        user,
        followed_at: None,
    }
}

pub fn collection(id: &str, items: u64) -> CollectionSummary {
    CollectionSummary {
        id: id.to_string(),
        owner: user("viewer"),
        name: format!("collection {}", id),
        description: None,
        item_count: items,
        created_at: None,
    }
}

pub fn comment(id: &str, cat_id: &str, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        cat_id: cat_id.to_string(),
        body: body.to_string(),
        created_at: chrono::Utc::now(),
        author: user("viewer"),
        is_owner: true,
        pending: false,
    }
}

pub fn draft(name: &str, tags: &[&str]) -> CatDraft {
    CatDraft {
        name: name.to_string(),
        description: None,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        location: None,
        media: MediaPayload::from_bytes(b"jpeg"),
    }
}
