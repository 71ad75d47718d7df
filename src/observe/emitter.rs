use std::sync::{Arc, Mutex, PoisonError};

use event_emitter_rs::EventEmitter;

use super::{ChangeEvent, ChangeFeed, ChangeKind, ListenerId};

/// Forwards [`ChangeEvent`]s into an `EventEmitter` under each event's name,
/// for hosts that already consume string-keyed in-process events.
#[derive(Clone)]
pub struct EmitterBridge {
    emitter: Arc<Mutex<EventEmitter>>,
}

impl EmitterBridge {
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            emitter: Arc::new(Mutex::new(emitter)),
        }
    }

    /// Start forwarding every event published on `feed`.
    pub fn attach(&self, feed: &ChangeFeed) -> ListenerId {
        let emitter = Arc::clone(&self.emitter);
        feed.on_any(move |event| {
            let mut emitter = emitter.lock().unwrap_or_else(PoisonError::into_inner);
            emitter.emit(event.name(), event.clone());
        })
    }

    /// Register an emitter-side listener for one kind of event.
    pub fn on<F>(&self, kind: ChangeKind, listener: F)
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        let mut emitter = self.emitter.lock().unwrap_or_else(PoisonError::into_inner);
        emitter.on(kind.name(), listener);
    }
}
