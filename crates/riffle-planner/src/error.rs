use thiserror::Error;

use riffle_core::PurityTag;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("step {step}: unknown {op} function '{name}'")]
    UnknownFunction {
        step: usize,
        op: &'static str,
        name: String,
    },

    #[error("step {step}: {reason}")]
    InvalidStep { step: usize, reason: String },

    #[error("cannot swap stage {index} ({first}) with the stage after it ({second})")]
    IllegalReorder {
        index: usize,
        first: PurityTag,
        second: PurityTag,
    },

    #[error(transparent)]
    Config(#[from] riffle_core::Error),
}
