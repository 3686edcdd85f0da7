//! Buffering operators: collect the whole source, then replay a transformed
//! buffer at completion.
//!
//! These turn a push stream into "emit everything at completion" and must not
//! be used on sources that never complete.

use std::cmp::Ordering;
use std::ops::{Bound, RangeBounds};
use std::sync::{Arc, Mutex};

use crate::observer::Observer;
use crate::stream::Stream;
use crate::sync::lock;

impl<T: Send + 'static> Stream<T> {
    fn buffered<F>(&self, op: &'static str, transform: F) -> Stream<T>
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        self.operate(op, move |sink| {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            let transform = Arc::clone(&transform);
            let collect = Arc::clone(&buffer);
            let for_error = Arc::clone(sink);
            let for_complete = Arc::clone(sink);
            Observer::new(move |value| lock(&collect).push(value))
                .with_error(move |err| for_error.error(err))
                .with_complete(move || {
                    let collected = std::mem::take(&mut *lock(&buffer));
                    for value in transform(collected) {
                        if for_complete.is_closed() {
                            return;
                        }
                        for_complete.next(value);
                    }
                    for_complete.complete();
                })
        })
    }

    pub fn sort_by<C>(&self, compare: C) -> Stream<T>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.buffered("sortBy", move |mut values| {
            values.sort_by(&compare);
            values
        })
    }

    pub fn sort_by_key<K, F>(&self, key: F) -> Stream<T>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_by(move |a, b| key(a).cmp(&key(b)))
    }

    pub fn reverse(&self) -> Stream<T> {
        self.buffered("reverse", |mut values| {
            values.reverse();
            values
        })
    }

    /// Replay only the buffered values whose positions fall in `range`;
    /// bounds past the end are clamped.
    pub fn slice<R>(&self, range: R) -> Stream<T>
    where
        R: RangeBounds<usize>,
    {
        let start = range.start_bound().cloned();
        let end = range.end_bound().cloned();
        self.buffered("slice", move |values| {
            let len = values.len();
            let from = match start {
                Bound::Included(s) => s,
                Bound::Excluded(s) => s.saturating_add(1),
                Bound::Unbounded => 0,
            }
            .min(len);
            let to = match end {
                Bound::Included(e) => e.saturating_add(1),
                Bound::Excluded(e) => e,
                Bound::Unbounded => len,
            }
            .min(len);
            if from >= to {
                return Vec::new();
            }
            values.into_iter().skip(from).take(to - from).collect()
        })
    }
}
