use std::sync::{Arc, PoisonError, RwLock};

use super::{ChangeEvent, ChangeKind};

pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    kind: Option<ChangeKind>,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: ListenerId,
    listeners: Vec<Registration>,
}

/// Subscribe/unsubscribe registry for [`ChangeEvent`]s. Clones share listeners.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Arc<RwLock<Registry>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one kind of event.
    pub fn on<F>(&self, kind: ChangeKind, listener: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(listener))
    }

    /// Listen for every event.
    pub fn on_any<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(listener))
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let before = registry.listeners.len();
        registry.listeners.retain(|registration| registration.id != id);
        registry.listeners.len() != before
    }

    pub fn emit(&self, event: &ChangeEvent) {
        // Listeners run outside the lock so they may subscribe or unsubscribe.
        let listeners: Vec<Listener> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .listeners
                .iter()
                .filter(|registration| {
                    registration.kind.map_or(true, |kind| kind == event.kind())
                })
                .map(|registration| registration.listener.clone())
                .collect()
        };
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    fn register(&self, kind: Option<ChangeKind>, listener: Listener) -> ListenerId {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push(Registration { id, kind, listener });
        id
    }
}
