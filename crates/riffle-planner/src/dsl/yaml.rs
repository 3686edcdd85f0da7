//! Minimal YAML → `Plan<i64>` parser for linear integer pipelines.
//!
//! Example:
//! ```yaml
//! config: { fusion: true, max_fused_stages: 8 }
//! steps:
//!   - { op: map, fn: mul, value: 2 }
//!   - { op: filter, fn: gt, value: 3 }
//!   - { op: scan, fn: sum }
//!   - { op: take, count: 5 }
//! ```
//!
//! Arithmetic wraps on overflow.

use serde::{Deserialize, Serialize};

use riffle_core::EngineConfig;
use riffle_observable::Stream;

use crate::error::PlanError;
use crate::plan::Plan;
use crate::stage::Stage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    pub config: Option<PipelineConfig>,
    pub steps: Vec<StepDef>,
}

/// Overrides applied on top of the base `EngineConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fusion: Option<bool>,
    pub max_fused_stages: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum StepDef {
    Map {
        #[serde(rename = "fn")]
        func: String,
        #[serde(default)]
        value: Option<i64>,
    },
    Filter {
        #[serde(rename = "fn")]
        func: String,
        #[serde(default)]
        value: Option<i64>,
    },
    Take {
        count: usize,
    },
    Skip {
        count: usize,
    },
    Distinct,
    Scan {
        #[serde(rename = "fn")]
        func: String,
        #[serde(default)]
        init: Option<i64>,
    },
    FlatMap {
        #[serde(rename = "fn")]
        func: String,
        #[serde(default)]
        value: Option<i64>,
    },
    Sort {
        #[serde(default)]
        descending: bool,
    },
    Reverse,
    Slice {
        start: usize,
        #[serde(default)]
        end: Option<usize>,
    },
}

#[derive(Debug, Clone)]
pub struct ParsedPipeline {
    pub plan: Plan<i64>,
    pub config: EngineConfig,
}

/// Parse a pipeline against the default engine configuration.
pub fn parse_yaml_pipeline(yaml_src: &str) -> Result<ParsedPipeline, PlanError> {
    parse_yaml_pipeline_with(yaml_src, EngineConfig::default())
}

/// Parse a pipeline; its `config:` block overrides fields of `base`.
pub fn parse_yaml_pipeline_with(
    yaml_src: &str,
    base: EngineConfig,
) -> Result<ParsedPipeline, PlanError> {
    let doc: Pipeline = serde_yaml::from_str(yaml_src)?;

    let mut config = base;
    if let Some(overrides) = doc.config {
        if let Some(fusion) = overrides.fusion {
            config.fusion_enabled = fusion;
        }
        if let Some(max) = overrides.max_fused_stages {
            config.max_fused_stages = max;
        }
    }
    config.validate()?;

    let mut plan = Plan::new();
    for (index, step) in doc.steps.into_iter().enumerate() {
        plan.push(build_stage(index, step)?);
    }
    Ok(ParsedPipeline { plan, config })
}

fn required(step: usize, func: &str, value: Option<i64>) -> Result<i64, PlanError> {
    value.ok_or_else(|| PlanError::InvalidStep {
        step,
        reason: format!("function '{func}' needs a `value`"),
    })
}

fn build_stage(step: usize, def: StepDef) -> Result<Stage<i64>, PlanError> {
    let stage = match def {
        StepDef::Map { func, value } => {
            let label = label_for(&func, value);
            match func.as_str() {
                "add" => {
                    let v = required(step, &func, value)?;
                    Stage::map(label, move |x: i64| x.wrapping_add(v))
                }
                "sub" => {
                    let v = required(step, &func, value)?;
                    Stage::map(label, move |x: i64| x.wrapping_sub(v))
                }
                "mul" => {
                    let v = required(step, &func, value)?;
                    Stage::map(label, move |x: i64| x.wrapping_mul(v))
                }
                "neg" => Stage::map(label, |x: i64| x.wrapping_neg()),
                "square" => Stage::map(label, |x: i64| x.wrapping_mul(x)),
                "abs" => Stage::map(label, |x: i64| x.wrapping_abs()),
                _ => return Err(unknown(step, "map", &func)),
            }
        }
        StepDef::Filter { func, value } => {
            let label = label_for(&func, value);
            match func.as_str() {
                "even" => Stage::filter(label, |x: &i64| x % 2 == 0),
                "odd" => Stage::filter(label, |x: &i64| x % 2 != 0),
                "gt" | "ge" | "lt" | "le" | "eq" | "ne" => {
                    let v = required(step, &func, value)?;
                    match func.as_str() {
                        "gt" => Stage::filter(label, move |x: &i64| *x > v),
                        "ge" => Stage::filter(label, move |x: &i64| *x >= v),
                        "lt" => Stage::filter(label, move |x: &i64| *x < v),
                        "le" => Stage::filter(label, move |x: &i64| *x <= v),
                        "eq" => Stage::filter(label, move |x: &i64| *x == v),
                        _ => Stage::filter(label, move |x: &i64| *x != v),
                    }
                }
                _ => return Err(unknown(step, "filter", &func)),
            }
        }
        StepDef::Take { count } => Stage::Take(count),
        StepDef::Skip { count } => Stage::Skip(count),
        StepDef::Distinct => Stage::Distinct,
        StepDef::Scan { func, init } => match func.as_str() {
            "sum" => Stage::scan("sum", init.unwrap_or(0), |a: i64, b: i64| a.wrapping_add(b)),
            "product" => {
                Stage::scan("product", init.unwrap_or(1), |a: i64, b: i64| a.wrapping_mul(b))
            }
            "max" => Stage::scan("max", init.unwrap_or(i64::MIN), |a: i64, b: i64| a.max(b)),
            "min" => Stage::scan("min", init.unwrap_or(i64::MAX), |a: i64, b: i64| a.min(b)),
            _ => return Err(unknown(step, "scan", &func)),
        },
        StepDef::FlatMap { func, value } => {
            let label = label_for(&func, value);
            match func.as_str() {
                "repeat" => {
                    let times = required(step, &func, value)?;
                    let times = usize::try_from(times).map_err(|_| PlanError::InvalidStep {
                        step,
                        reason: format!("repeat count must be non-negative, got {times}"),
                    })?;
                    Stage::flat_map(label, move |x: i64| Stream::from_array(vec![x; times]))
                }
                "spread" => {
                    let factor = value.unwrap_or(10);
                    Stage::flat_map(label, move |x: i64| {
                        Stream::from_array(vec![x, x.wrapping_mul(factor)])
                    })
                }
                _ => return Err(unknown(step, "flat_map", &func)),
            }
        }
        StepDef::Sort { descending } => {
            if descending {
                Stage::sort_by("desc", |a: &i64, b: &i64| b.cmp(a))
            } else {
                Stage::sort_by("asc", |a: &i64, b: &i64| a.cmp(b))
            }
        }
        StepDef::Reverse => Stage::Reverse,
        StepDef::Slice { start, end } => {
            if matches!(end, Some(end) if end < start) {
                return Err(PlanError::InvalidStep {
                    step,
                    reason: format!("slice end {end:?} is before start {start}"),
                });
            }
            Stage::Slice { start, end }
        }
    };
    Ok(stage)
}

fn label_for(func: &str, value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{func} {v}"),
        None => func.to_string(),
    }
}

fn unknown(step: usize, op: &'static str, name: &str) -> PlanError {
    PlanError::UnknownFunction {
        step,
        op,
        name: name.to_string(),
    }
}
