//! Static side-effect classification of stream operators.
//!
//! Every operator name maps to one of three tags:
//! - `Pure`: depends only on the value (or its arrival position) and touches
//!   nothing outside the subscription.
//! - `State`: threads accumulated state between values.
//! - `Async`: driven by timers, deferred values, external events, or error
//!   recovery.
//!
//! The tag decides whether two adjacent stages may be swapped (`can_reorder`)
//! and whether a run of stages may be fused into a single pass.

use serde::{Deserialize, Serialize};

/// Side-effect class of an operator or of a stream produced by one.
///
/// Ordered from most to least reorderable: `Pure < State < Async`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurityTag {
    Pure,
    State,
    Async,
}

impl PurityTag {
    /// The tag of a composition of two stages: the less pure one wins.
    pub fn join(self, other: PurityTag) -> PurityTag {
        self.max(other)
    }

    pub fn is_pure(self) -> bool {
        matches!(self, PurityTag::Pure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PurityTag::Pure => "pure",
            PurityTag::State => "state",
            PurityTag::Async => "async",
        }
    }
}

impl std::fmt::Display for PurityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator name → tag. Names follow the public operator surface.
static OPERATION_PURITY: &[(&str, PurityTag)] = &[
    // Per-element or positional; buffering operators are pure as well.
    ("map", PurityTag::Pure),
    ("filter", PurityTag::Pure),
    ("filterMap", PurityTag::Pure),
    ("take", PurityTag::Pure),
    ("skip", PurityTag::Pure),
    ("distinct", PurityTag::Pure),
    ("slice", PurityTag::Pure),
    ("reverse", PurityTag::Pure),
    ("sortBy", PurityTag::Pure),
    ("bimap", PurityTag::Pure),
    ("focus", PurityTag::Pure),
    ("over", PurityTag::Pure),
    ("fused", PurityTag::Pure),
    // Synchronous, deterministic sources.
    ("of", PurityTag::Pure),
    ("fromArray", PurityTag::Pure),
    ("empty", PurityTag::Pure),
    ("never", PurityTag::Pure),
    ("throwError", PurityTag::Pure),
    // Accumulating or subscription-juggling.
    ("scan", PurityTag::State),
    ("flatMap", PurityTag::State),
    ("chain", PurityTag::State),
    ("concat", PurityTag::State),
    ("merge", PurityTag::State),
    ("combine", PurityTag::State),
    // Timing, external effects, recovery.
    ("fromPromise", PurityTag::Async),
    ("fromEvent", PurityTag::Async),
    ("interval", PurityTag::Async),
    ("timer", PurityTag::Async),
    ("catchError", PurityTag::Async),
    ("bichain", PurityTag::Async),
    ("create", PurityTag::Async),
];

/// Look up an operator name in the static table.
pub fn lookup(name: &str) -> Option<PurityTag> {
    OPERATION_PURITY
        .iter()
        .find(|(op, _)| *op == name)
        .map(|(_, tag)| *tag)
}

/// Tag for `name`; names missing from the table are treated as `Async` so the
/// optimizer never moves them.
pub fn get_operation_purity(name: &str) -> PurityTag {
    lookup(name).unwrap_or(PurityTag::Async)
}

/// Whether two adjacent stages tagged `first` and `second` may swap places.
///
/// - Pure/Pure: always.
/// - Pure/State (either order): a pure transform can neither observe nor
///   affect accumulated state, so it may be hoisted.
/// - State/State: never; that would require dependency analysis.
/// - Anything involving Async: never.
pub fn can_reorder(first: PurityTag, second: PurityTag) -> bool {
    use PurityTag::*;
    match (first, second) {
        (Async, _) | (_, Async) => false,
        (State, State) => false,
        (Pure, Pure) | (Pure, State) | (State, Pure) => true,
    }
}

/// Attach/extract pair for the purity marker carried by stream values.
///
/// Every derived stream is stamped with the tag of the operator that produced
/// it, so later composition reads the marker instead of re-deriving it.
pub trait PurityMarked {
    fn purity(&self) -> PurityTag;

    fn with_purity(self, tag: PurityTag) -> Self;

    /// Stamp with the table entry for `op`.
    fn stamped(self, op: &str) -> Self
    where
        Self: Sized,
    {
        self.with_purity(get_operation_purity(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_documented_classes() {
        for op in ["map", "filter", "take", "skip", "distinct", "slice", "reverse", "sortBy"] {
            assert_eq!(get_operation_purity(op), PurityTag::Pure, "{op}");
        }
        for op in ["scan", "flatMap", "chain", "concat", "merge"] {
            assert_eq!(get_operation_purity(op), PurityTag::State, "{op}");
        }
        for op in ["fromPromise", "fromEvent", "interval", "timer", "catchError"] {
            assert_eq!(get_operation_purity(op), PurityTag::Async, "{op}");
        }
    }

    #[test]
    fn unknown_names_are_never_reordered() {
        assert_eq!(lookup("retryWhen"), None);
        let tag = get_operation_purity("retryWhen");
        assert!(!can_reorder(tag, PurityTag::Pure));
    }

    #[test]
    fn reorder_rule() {
        use PurityTag::*;
        assert!(can_reorder(Pure, Pure));
        assert!(can_reorder(Pure, State));
        assert!(can_reorder(State, Pure));
        assert!(!can_reorder(State, State));
        assert!(!can_reorder(Async, Pure));
        assert!(!can_reorder(Pure, Async));
        assert!(!can_reorder(Async, Async));
    }

    #[test]
    fn join_picks_less_pure() {
        assert_eq!(PurityTag::Pure.join(PurityTag::State), PurityTag::State);
        assert_eq!(PurityTag::Async.join(PurityTag::Pure), PurityTag::Async);
        assert_eq!(PurityTag::Pure.join(PurityTag::Pure), PurityTag::Pure);
    }
}
