//! Plan stages: one per operator, each carrying its own closures.

use std::cmp::Ordering;
use std::hash::Hash;
use std::sync::Arc;

use riffle_core::{get_operation_purity, PurityTag, StreamError};
use riffle_observable::Stream;

/// Bound shared by every value type a plan can carry.
pub trait Element: Clone + Eq + Hash + Send + Sync + 'static {}

impl<T: Clone + Eq + Hash + Send + Sync + 'static> Element for T {}

pub type Transform<T> = Arc<dyn Fn(T) -> T + Send + Sync>;
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type Reducer<T> = Arc<dyn Fn(T, T) -> T + Send + Sync>;
pub type Expand<T> = Arc<dyn Fn(T) -> Stream<T> + Send + Sync>;
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;
pub type Recovery<T> = Arc<dyn Fn(StreamError) -> Stream<T> + Send + Sync>;

#[derive(Clone)]
pub enum Stage<T> {
    Map { label: String, f: Transform<T> },
    Filter { label: String, pred: Predicate<T> },
    Take(usize),
    Skip(usize),
    Distinct,
    Scan {
        label: String,
        init: T,
        reducer: Reducer<T>,
    },
    FlatMap { label: String, f: Expand<T> },
    Sort { label: String, cmp: Comparator<T> },
    Reverse,
    Slice { start: usize, end: Option<usize> },
    CatchError { label: String, handler: Recovery<T> },
    Concat(Stream<T>),
    Merge(Stream<T>),
    /// A run of per-element pure stages executed as one pass.
    Fused(Vec<Stage<T>>),
}

impl<T> Stage<T> {
    pub fn map<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Stage::Map {
            label: label.into(),
            f: Arc::new(f),
        }
    }

    pub fn filter<P>(label: impl Into<String>, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Stage::Filter {
            label: label.into(),
            pred: Arc::new(pred),
        }
    }

    pub fn scan<R>(label: impl Into<String>, init: T, reducer: R) -> Self
    where
        R: Fn(T, T) -> T + Send + Sync + 'static,
    {
        Stage::Scan {
            label: label.into(),
            init,
            reducer: Arc::new(reducer),
        }
    }

    pub fn flat_map<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(T) -> Stream<T> + Send + Sync + 'static,
    {
        Stage::FlatMap {
            label: label.into(),
            f: Arc::new(f),
        }
    }

    pub fn sort_by<C>(label: impl Into<String>, cmp: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Stage::Sort {
            label: label.into(),
            cmp: Arc::new(cmp),
        }
    }

    pub fn catch_error<H>(label: impl Into<String>, handler: H) -> Self
    where
        H: Fn(StreamError) -> Stream<T> + Send + Sync + 'static,
    {
        Stage::CatchError {
            label: label.into(),
            handler: Arc::new(handler),
        }
    }

    /// Operator name as listed in the purity table.
    pub fn op_name(&self) -> &'static str {
        match self {
            Stage::Map { .. } => "map",
            Stage::Filter { .. } => "filter",
            Stage::Take(_) => "take",
            Stage::Skip(_) => "skip",
            Stage::Distinct => "distinct",
            Stage::Scan { .. } => "scan",
            Stage::FlatMap { .. } => "flatMap",
            Stage::Sort { .. } => "sortBy",
            Stage::Reverse => "reverse",
            Stage::Slice { .. } => "slice",
            Stage::CatchError { .. } => "catchError",
            Stage::Concat(_) => "concat",
            Stage::Merge(_) => "merge",
            Stage::Fused(_) => "fused",
        }
    }

    pub fn purity(&self) -> PurityTag {
        match self {
            Stage::Fused(inner) => inner
                .iter()
                .fold(PurityTag::Pure, |tag, stage| tag.join(stage.purity())),
            other => get_operation_purity(other.op_name()),
        }
    }

    /// Per-element pure stages: the ones a fused pass can absorb. Buffering
    /// stages are pure too but need the whole input, so they act as barriers.
    pub fn is_fusible(&self) -> bool {
        matches!(
            self,
            Stage::Map { .. } | Stage::Filter { .. } | Stage::Take(_) | Stage::Skip(_) | Stage::Distinct
        )
    }

    /// Short human-readable form used in plan summaries.
    pub fn describe(&self) -> String {
        match self {
            Stage::Map { label, .. }
            | Stage::Filter { label, .. }
            | Stage::Scan { label, .. }
            | Stage::FlatMap { label, .. }
            | Stage::Sort { label, .. }
            | Stage::CatchError { label, .. } => format!("{}({label})", self.op_name()),
            Stage::Take(n) => format!("take({n})"),
            Stage::Skip(n) => format!("skip({n})"),
            Stage::Slice { start, end } => match end {
                Some(end) => format!("slice({start}..{end})"),
                None => format!("slice({start}..)"),
            },
            Stage::Fused(inner) => {
                let parts: Vec<String> = inner.iter().map(Stage::describe).collect();
                format!("fused[{}]", parts.join(" > "))
            }
            other => other.op_name().to_string(),
        }
    }
}

impl<T> std::fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}
