//! Event-target sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use riffle_core::PurityMarked;

use crate::sink::Sink;
use crate::stream::Stream;
use crate::sync::lock;

pub type Listener<E> = Arc<dyn Fn(E) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Something that dispatches named events to registered listeners.
pub trait EventTarget<E>: Send + Sync {
    fn add_listener(&self, name: &str, listener: Listener<E>) -> ListenerId;

    fn remove_listener(&self, name: &str, id: ListenerId);
}

/// In-process event target.
pub struct EventEmitter<E> {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Vec<(ListenerId, Listener<E>)>>>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(HashMap::new()),
        }
    }
}

impl<E: Clone> EventEmitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every listener registered under `name`; returns how
    /// many were called. Listeners run outside the registry lock, so they may
    /// add or remove listeners.
    pub fn emit(&self, name: &str, event: E) -> usize {
        let targets: Vec<Listener<E>> = lock(&self.listeners)
            .get(name)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        for listener in &targets {
            listener(event.clone());
        }
        targets.len()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        lock(&self.listeners).get(name).map_or(0, Vec::len)
    }
}

impl<E: Send> EventTarget<E> for EventEmitter<E> {
    fn add_listener(&self, name: &str, listener: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners)
            .entry(name.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    fn remove_listener(&self, name: &str, id: ListenerId) {
        let mut listeners = lock(&self.listeners);
        if let Some(entries) = listeners.get_mut(name) {
            entries.retain(|(existing, _)| *existing != id);
            if entries.is_empty() {
                listeners.remove(name);
            }
        }
    }
}

impl<E: Send + 'static> Stream<E> {
    /// Emit every `name` event dispatched by `target`. Never completes; the
    /// listener is removed on unsubscribe.
    pub fn from_event<T>(target: Arc<T>, name: impl Into<String>) -> Self
    where
        T: EventTarget<E> + ?Sized + 'static,
    {
        let name = name.into();
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            let listener_sink = Arc::clone(&sink);
            let id = target.add_listener(&name, Arc::new(move |event| listener_sink.next(event)));
            let target = Arc::clone(&target);
            let name = name.clone();
            sink.add_fn(move || target.remove_listener(&name, id));
            sink.subscription()
        })
        .stamped("fromEvent")
    }
}
