use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::model::Identified;

/// A list that may hold copies of `T`, patchable by id.
pub trait Mirror<T>: Send + Sync {
    fn label(&self) -> &str;

    fn find(&self, id: &str) -> Option<T>;

    fn patch(&self, id: &str, f: &mut dyn FnMut(&mut T)) -> bool;

    /// Put a previously captured copy back.
    fn restore(&self, id: &str, item: T) -> bool;

    fn insert_at(&self, index: usize, item: T) -> bool;

    fn remove(&self, id: &str) -> Option<(usize, T)>;
}

/// Every list currently holding copies of one entity type.
///
/// Lists are held weakly: a store dropped by its view simply disappears.
pub struct MirrorSet<T> {
    mirrors: RwLock<Vec<Weak<dyn Mirror<T>>>>,
}

impl<T> Default for MirrorSet<T> {
    fn default() -> Self {
        Self {
            mirrors: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Identified> MirrorSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, mirror: Arc<dyn Mirror<T>>) {
        let weak = Arc::downgrade(&mirror);
        let mut mirrors = self.mirrors.write().unwrap_or_else(PoisonError::into_inner);
        mirrors.retain(|existing| existing.strong_count() > 0);
        if !mirrors.iter().any(|existing| Weak::ptr_eq(existing, &weak)) {
            mirrors.push(weak);
        }
    }

    pub fn untrack(&self, mirror: &Arc<dyn Mirror<T>>) {
        let weak = Arc::downgrade(mirror);
        let mut mirrors = self.mirrors.write().unwrap_or_else(PoisonError::into_inner);
        mirrors.retain(|existing| existing.strong_count() > 0 && !Weak::ptr_eq(existing, &weak));
    }

    pub fn live(&self) -> Vec<Arc<dyn Mirror<T>>> {
        self.mirrors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first held copy of `id`.
    pub fn find(&self, id: &str) -> Option<T> {
        self.live().iter().find_map(|mirror| mirror.find(id))
    }

    /// Every held copy of `id`, with the label of the list holding it.
    pub fn copies(&self, id: &str) -> Vec<(String, T)> {
        self.live()
            .iter()
            .filter_map(|mirror| mirror.find(id).map(|item| (mirror.label().to_string(), item)))
            .collect()
    }

    /// Patch every held copy of `id`. Returns how many lists held one.
    pub fn patch_all(&self, id: &str, f: &mut dyn FnMut(&mut T)) -> usize {
        let mut held = 0;
        for mirror in self.live() {
            if mirror.patch(id, &mut *f) {
                held += 1;
            }
        }
        held
    }
}

/// One in-flight optimistic change to an entity.
pub struct OptimisticMutation<T> {
    id: String,
    snapshots: Vec<(Arc<dyn Mirror<T>>, T)>,
}

impl<T: Identified> OptimisticMutation<T> {
    /// Snapshot every held copy of `id`, then apply `delta` to each.
    pub fn apply(mirrors: &MirrorSet<T>, id: &str, mut delta: impl FnMut(&mut T)) -> Self {
        let mut snapshots = Vec::new();
        for mirror in mirrors.live() {
            if let Some(before) = mirror.find(id) {
                mirror.patch(id, &mut delta);
                snapshots.push((mirror, before));
            }
        }
        Self {
            id: id.to_string(),
            snapshots,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The entity as it was before the mutation.
    pub fn target(&self) -> Option<&T> {
        self.snapshots.first().map(|(_, before)| before)
    }

    pub fn copies(&self) -> usize {
        self.snapshots.len()
    }

    /// Reconcile every copy now held, including copies loaded mid-flight.
    pub fn confirm(self, mirrors: &MirrorSet<T>, mut resolve: impl FnMut(&mut T)) -> usize {
        mirrors.patch_all(&self.id, &mut resolve)
    }

    /// Restore each patched copy to its snapshot.
    pub fn rollback(self) {
        for (mirror, before) in self.snapshots {
            mirror.restore(&self.id, before);
        }
    }
}
