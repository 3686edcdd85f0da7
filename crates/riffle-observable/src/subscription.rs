//! Cancellation handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::sync::lock;

type Teardown = Box<dyn FnOnce() + Send>;

struct Inner {
    closed: AtomicBool,
    teardowns: Mutex<Vec<Teardown>>,
}

/// Idempotent cancellation handle returned by `subscribe`.
///
/// It doubles as a container: teardowns added with `add`/`add_fn` run when the
/// handle is first invoked, and teardowns added afterwards run immediately.
/// Operators rely on the latter when a source terminates synchronously before
/// its own handle has been returned.
#[derive(Clone)]
pub struct Unsubscribe {
    inner: Arc<Inner>,
}

impl Unsubscribe {
    /// An open handle with nothing to tear down yet.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Inner {
                closed: AtomicBool::new(false),
                teardowns: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = Self::empty();
        handle.add_fn(teardown);
        handle
    }

    /// Tear down everything registered so far. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        self.close();
    }

    /// Like `unsubscribe`, but reports whether this call was the one that
    /// closed the handle.
    pub(crate) fn close(&self) -> bool {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let teardowns = std::mem::take(&mut *lock(&self.inner.teardowns));
        for teardown in teardowns {
            teardown();
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn add_fn<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut pending = lock(&self.inner.teardowns);
            if !self.inner.closed.load(Ordering::Acquire) {
                pending.push(Box::new(teardown));
                return;
            }
        }
        teardown();
    }

    /// Tie `other` to this handle's lifetime.
    pub fn add(&self, other: Unsubscribe) {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return;
        }
        self.add_fn(move || other.unsubscribe());
    }
}

impl Default for Unsubscribe {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("closed", &self.is_closed())
            .finish()
    }
}
