use std::sync::Arc;

use super::Mirror;
use crate::model::{Cat, UserSummary};
use crate::paged::{PageSource, PagedStore};

/// Exposes the `author` of every cat in a list as a [`UserSummary`] copy,
/// so follow changes reach the posts of the followed user.
pub struct AuthorMirror<S: PageSource<Item = Cat>> {
    store: Arc<PagedStore<S>>,
}

impl<S: PageSource<Item = Cat>> AuthorMirror<S> {
    pub fn new(store: Arc<PagedStore<S>>) -> Self {
        Self { store }
    }
}

fn by(username: &str) -> impl Fn(&Cat) -> bool + '_ {
    move |cat: &Cat| cat.author.username == username
}

impl<S: PageSource<Item = Cat>> Mirror<UserSummary> for AuthorMirror<S> {
    fn label(&self) -> &str {
        self.store.source().label()
    }

    fn find(&self, id: &str) -> Option<UserSummary> {
        self.store.find_where(&by(id)).map(|cat| cat.author)
    }

    fn patch(&self, id: &str, f: &mut dyn FnMut(&mut UserSummary)) -> bool {
        self.store.patch_where(&by(id), &mut |cat: &mut Cat| f(&mut cat.author)) > 0
    }

    fn restore(&self, id: &str, item: UserSummary) -> bool {
        self.store
            .patch_where(&by(id), &mut |cat: &mut Cat| cat.author = item.clone())
            > 0
    }

    fn insert_at(&self, _index: usize, _item: UserSummary) -> bool {
        false
    }

    fn remove(&self, _id: &str) -> Option<(usize, UserSummary)> {
        None
    }
}
