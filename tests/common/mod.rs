//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use riffle::observable::{Observer, Stream, Unsubscribe};
use riffle::core::StreamError;

#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    Next(T),
    Error(StreamError),
    Complete,
}

/// Observer that records every signal it receives, in order.
#[derive(Clone)]
pub struct Recorder<T> {
    events: Arc<Mutex<Vec<Event<T>>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn observer(&self) -> Observer<T> {
        let next = Arc::clone(&self.events);
        let error = Arc::clone(&self.events);
        let complete = Arc::clone(&self.events);
        Observer::new(move |v| next.lock().unwrap().push(Event::Next(v)))
            .with_error(move |e| error.lock().unwrap().push(Event::Error(e)))
            .with_complete(move || complete.lock().unwrap().push(Event::Complete))
    }

    pub fn events(&self) -> Vec<Event<T>> {
        self.events.lock().unwrap().clone()
    }

    pub fn values(&self) -> Vec<T> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Next(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> bool {
        self.events().iter().any(|e| matches!(e, Event::Complete))
    }

    pub fn error(&self) -> Option<StreamError> {
        self.events().into_iter().find_map(|e| match e {
            Event::Error(err) => Some(err),
            _ => None,
        })
    }

    pub fn terminal_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| !matches!(e, Event::Next(_)))
            .count()
    }
}

/// Subscribe a fresh recorder to `stream`.
pub fn record<T: Clone + Send + 'static>(stream: &Stream<T>) -> (Recorder<T>, Unsubscribe) {
    let recorder = Recorder::new();
    let handle = stream.subscribe(recorder.observer());
    (recorder, handle)
}

/// Synchronously collect a stream that terminates during `subscribe`.
pub fn collect_sync<T: Clone + Send + 'static>(stream: &Stream<T>) -> Vec<T> {
    let (recorder, _handle) = record(stream);
    assert!(recorder.completed(), "stream did not complete synchronously");
    recorder.values()
}
