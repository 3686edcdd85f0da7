//! Ordered stage lists, explicit reordering, and serializable summaries.

use serde::{Deserialize, Serialize};

use riffle_core::{can_reorder, PurityTag};

use crate::error::PlanError;
use crate::stage::Stage;

#[derive(Clone, Debug)]
pub struct Plan<T> {
    stages: Vec<Stage<T>>,
}

impl<T> Default for Plan<T> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<T> Plan<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stages(stages: Vec<Stage<T>>) -> Self {
        Self { stages }
    }

    /// Append a stage (builder style).
    pub fn then(mut self, stage: Stage<T>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn push(&mut self, stage: Stage<T>) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage<T>] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<Stage<T>> {
        self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The tag of the plan as a whole: the least pure of its stages.
    pub fn purity(&self) -> PurityTag {
        self.stages
            .iter()
            .fold(PurityTag::Pure, |tag, stage| tag.join(stage.purity()))
    }

    /// Indices `i` such that stages `i` and `i + 1` may legally swap.
    pub fn reorder_candidates(&self) -> Vec<usize> {
        self.stages
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| can_reorder(pair[0].purity(), pair[1].purity()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Swap stage `index + 1` in front of stage `index`.
    ///
    /// Legality is the classifier's: the swap is refused when either stage is
    /// async or both carry state.
    pub fn hoist(mut self, index: usize) -> Result<Self, PlanError> {
        let Some(next) = index.checked_add(1).filter(|&n| n < self.stages.len()) else {
            return Err(PlanError::InvalidStep {
                step: index,
                reason: format!(
                    "no stage after index {index} in a plan of {} stages",
                    self.stages.len()
                ),
            });
        };
        let first = self.stages[index].purity();
        let second = self.stages[next].purity();
        if !can_reorder(first, second) {
            return Err(PlanError::IllegalReorder {
                index,
                first,
                second,
            });
        }
        self.stages.swap(index, next);
        Ok(self)
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            purity: self.purity(),
            stages: self.stages.iter().map(StageSummary::of).collect(),
        }
    }
}

/// EXPLAIN view of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub purity: PurityTag,
    pub stages: Vec<StageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub op: String,
    pub purity: PurityTag,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fused: Vec<StageSummary>,
}

impl StageSummary {
    fn of<T>(stage: &Stage<T>) -> Self {
        let fused = match stage {
            Stage::Fused(inner) => inner.iter().map(StageSummary::of).collect(),
            _ => Vec::new(),
        };
        Self {
            op: stage.op_name().to_string(),
            purity: stage.purity(),
            detail: stage.describe(),
            fused,
        }
    }
}

impl PlanSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
