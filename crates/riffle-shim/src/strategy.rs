//! Dispatch strategy: which implementation of an operator runs on which
//! substrate.
//!
//! A table is immutable data. `derive` computes the default from the
//! substrates' declared native hooks; callers build variants with
//! `with_native`/`without_native` and hand them to a `Shim`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use riffle_core::{get_operation_purity, EngineConfig, PurityTag};
use riffle_observable::Stream;
use riffle_stateful::StatefulStream;

use crate::substrate::Substrate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstrateId {
    Observable,
    Stateful,
}

/// Operators on the shim surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Op {
    Map,
    Filter,
    FilterMap,
    Scan,
    Chain,
    Bichain,
    Bimap,
    Take,
    Skip,
    Distinct,
}

impl Op {
    pub const ALL: [Op; 10] = [
        Op::Map,
        Op::Filter,
        Op::FilterMap,
        Op::Scan,
        Op::Chain,
        Op::Bichain,
        Op::Bimap,
        Op::Take,
        Op::Skip,
        Op::Distinct,
    ];

    /// Name in the purity table.
    pub fn name(self) -> &'static str {
        match self {
            Op::Map => "map",
            Op::Filter => "filter",
            Op::FilterMap => "filterMap",
            Op::Scan => "scan",
            Op::Chain => "chain",
            Op::Bichain => "bichain",
            Op::Bimap => "bimap",
            Op::Take => "take",
            Op::Skip => "skip",
            Op::Distinct => "distinct",
        }
    }

    pub fn purity(self) -> PurityTag {
        get_operation_purity(self.name())
    }

    /// Operators with a generic formula. The rest are substrate primitives
    /// with a single implementation.
    pub fn has_generic_path(self) -> bool {
        matches!(self, Op::Filter | Op::FilterMap | Op::Bimap | Op::Bichain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dispatch {
    Native,
    Generic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTable {
    native: BTreeSet<(SubstrateId, Op)>,
}

impl StrategyTable {
    /// Native hooks declared by both cores.
    pub fn derive() -> Self {
        Self::generic_only()
            .with_substrate::<Stream<()>>()
            .with_substrate::<StatefulStream<(), (), ()>>()
    }

    /// Every overridable operator runs its generic formula.
    pub fn generic_only() -> Self {
        Self::default()
    }

    /// `derive()` unless `config.prefer_native` is off.
    pub fn from_config(config: &EngineConfig) -> Self {
        if config.prefer_native {
            Self::derive()
        } else {
            Self::generic_only()
        }
    }

    pub fn with_substrate<S: Substrate>(self) -> Self {
        S::NATIVE
            .iter()
            .fold(self, |table, op| table.with_native(S::ID, *op))
    }

    pub fn with_native(mut self, substrate: SubstrateId, op: Op) -> Self {
        if op.has_generic_path() {
            self.native.insert((substrate, op));
        }
        self
    }

    pub fn without_native(mut self, substrate: SubstrateId, op: Op) -> Self {
        self.native.remove(&(substrate, op));
        self
    }

    pub fn resolve(&self, substrate: SubstrateId, op: Op) -> Dispatch {
        if !op.has_generic_path() || self.native.contains(&(substrate, op)) {
            Dispatch::Native
        } else {
            Dispatch::Generic
        }
    }

    /// Every (substrate, operator) pair with its resolved dispatch.
    pub fn entries(&self) -> impl Iterator<Item = (SubstrateId, Op, Dispatch)> + '_ {
        [SubstrateId::Observable, SubstrateId::Stateful]
            .into_iter()
            .flat_map(move |id| Op::ALL.into_iter().map(move |op| (id, op, self.resolve(id, op))))
    }
}
