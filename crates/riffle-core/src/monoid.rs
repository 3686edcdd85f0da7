//! Monoid capability record used by `fold_map`.
//!
//! A record rather than a trait: the same carrier type routinely has more than
//! one lawful monoid (sum vs. product), and the caller picks one per call.

use std::sync::Arc;

pub struct Monoid<M> {
    empty: M,
    combine: Arc<dyn Fn(M, M) -> M + Send + Sync>,
}

impl<M: Clone> Clone for Monoid<M> {
    fn clone(&self) -> Self {
        Self {
            empty: self.empty.clone(),
            combine: Arc::clone(&self.combine),
        }
    }
}

impl<M: Clone> Monoid<M> {
    /// `combine` must be associative with `empty` as identity; nothing here
    /// checks that.
    pub fn new<F>(empty: M, combine: F) -> Self
    where
        F: Fn(M, M) -> M + Send + Sync + 'static,
    {
        Self {
            empty,
            combine: Arc::new(combine),
        }
    }

    pub fn empty(&self) -> M {
        self.empty.clone()
    }

    pub fn combine(&self, a: M, b: M) -> M {
        (self.combine)(a, b)
    }

    pub fn concat_all<I>(&self, items: I) -> M
    where
        I: IntoIterator<Item = M>,
    {
        items
            .into_iter()
            .fold(self.empty(), |acc, m| self.combine(acc, m))
    }
}

impl<M> Monoid<M>
where
    M: Clone + std::ops::Add<Output = M> + Default + Send + Sync + 'static,
{
    pub fn sum() -> Self {
        Monoid::new(M::default(), |a, b| a + b)
    }
}

impl<T: Clone + Send + Sync + 'static> Monoid<Vec<T>> {
    pub fn vec() -> Self {
        Monoid::new(Vec::new(), |mut a, b| {
            a.extend(b);
            a
        })
    }
}

impl Monoid<String> {
    pub fn string() -> Self {
        Monoid::new(String::new(), |a, b| a + &b)
    }
}

impl Monoid<bool> {
    /// Conjunction: identity `true`.
    pub fn all() -> Self {
        Monoid::new(true, |a, b| a && b)
    }

    /// Disjunction: identity `false`.
    pub fn any() -> Self {
        Monoid::new(false, |a, b| a || b)
    }
}
