//! Optic capability consumed by the `focus`/`over` operators.
//!
//! The three shapes are a closed variant and are dispatched by `match`.

use std::sync::Arc;

type Getter<S, A> = Arc<dyn Fn(&S) -> A + Send + Sync>;
type PartialGetter<S, A> = Arc<dyn Fn(&S) -> Option<A> + Send + Sync>;
type Setter<S, A> = Arc<dyn Fn(S, A) -> S + Send + Sync>;
type Builder<S, A> = Arc<dyn Fn(A) -> S + Send + Sync>;

pub enum Optic<S, A> {
    /// Total focus: always present.
    Lens { get: Getter<S, A>, set: Setter<S, A> },
    /// Focus on one case of a sum type; `build` constructs that case.
    Prism {
        matcher: PartialGetter<S, A>,
        build: Builder<S, A>,
    },
    /// Focus that may be absent; `set` is a no-op when it is.
    Optional {
        get_option: PartialGetter<S, A>,
        set: Setter<S, A>,
    },
}

impl<S, A> Clone for Optic<S, A> {
    fn clone(&self) -> Self {
        match self {
            Optic::Lens { get, set } => Optic::Lens {
                get: Arc::clone(get),
                set: Arc::clone(set),
            },
            Optic::Prism { matcher, build } => Optic::Prism {
                matcher: Arc::clone(matcher),
                build: Arc::clone(build),
            },
            Optic::Optional { get_option, set } => Optic::Optional {
                get_option: Arc::clone(get_option),
                set: Arc::clone(set),
            },
        }
    }
}

impl<S, A> Optic<S, A> {
    pub fn lens<G, St>(get: G, set: St) -> Self
    where
        G: Fn(&S) -> A + Send + Sync + 'static,
        St: Fn(S, A) -> S + Send + Sync + 'static,
    {
        Optic::Lens {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn prism<M, B>(matcher: M, build: B) -> Self
    where
        M: Fn(&S) -> Option<A> + Send + Sync + 'static,
        B: Fn(A) -> S + Send + Sync + 'static,
    {
        Optic::Prism {
            matcher: Arc::new(matcher),
            build: Arc::new(build),
        }
    }

    pub fn optional<G, St>(get_option: G, set: St) -> Self
    where
        G: Fn(&S) -> Option<A> + Send + Sync + 'static,
        St: Fn(S, A) -> S + Send + Sync + 'static,
    {
        Optic::Optional {
            get_option: Arc::new(get_option),
            set: Arc::new(set),
        }
    }

    /// Read the focus, if present.
    pub fn preview(&self, source: &S) -> Option<A> {
        match self {
            Optic::Lens { get, .. } => Some(get(source)),
            Optic::Prism { matcher, .. } => matcher(source),
            Optic::Optional { get_option, .. } => get_option(source),
        }
    }

    /// Replace the focus. A prism whose case does not match leaves `source`
    /// untouched, as does an optional whose focus is absent.
    pub fn set(&self, source: S, value: A) -> S {
        match self {
            Optic::Lens { set, .. } => set(source, value),
            Optic::Prism { matcher, build } => {
                if matcher(&source).is_some() {
                    build(value)
                } else {
                    source
                }
            }
            Optic::Optional { get_option, set } => {
                if get_option(&source).is_some() {
                    set(source, value)
                } else {
                    source
                }
            }
        }
    }

    /// Apply `f` to the focus, when present.
    pub fn modify<F>(&self, source: S, f: F) -> S
    where
        F: FnOnce(A) -> A,
    {
        match self.preview(&source) {
            Some(a) => self.set(source, f(a)),
            None => source,
        }
    }
}
