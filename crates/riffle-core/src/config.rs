//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What an interval source does when the runtime falls behind its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissedTick {
    /// Fire the missed ticks back to back until caught up.
    #[default]
    Burst,
    /// Restart the schedule from the late tick.
    Delay,
    /// Drop missed ticks and wait for the next aligned one.
    Skip,
}

impl std::str::FromStr for MissedTick {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "burst" => Ok(MissedTick::Burst),
            "delay" => Ok(MissedTick::Delay),
            "skip" => Ok(MissedTick::Skip),
            other => Err(Error::Config(format!("unknown missed-tick policy '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Collapse runs of pure per-element stages into a single pass.
    pub fusion_enabled: bool,

    /// Upper bound on the number of stages folded into one fused pass.
    pub max_fused_stages: usize,

    /// Let the shim use substrate-specific optimized operators where present.
    pub prefer_native: bool,

    /// Policy for `interval_with` when ticks are missed.
    pub missed_tick: MissedTick,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fusion_enabled: true,
            max_fused_stages: 16,
            prefer_native: true,
            missed_tick: MissedTick::Burst,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RIFFLE_FUSION_ENABLED`: `true`/`false`
    /// - `RIFFLE_MAX_FUSED_STAGES`: positive integer
    /// - `RIFFLE_PREFER_NATIVE`: `true`/`false`
    /// - `RIFFLE_MISSED_TICK`: `burst`, `delay`, or `skip`
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RIFFLE_FUSION_ENABLED") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.fusion_enabled = v;
            }
        }

        if let Ok(s) = std::env::var("RIFFLE_MAX_FUSED_STAGES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_fused_stages = v;
            }
        }

        if let Ok(s) = std::env::var("RIFFLE_PREFER_NATIVE") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.prefer_native = v;
            }
        }

        if let Ok(s) = std::env::var("RIFFLE_MISSED_TICK") {
            if let Ok(v) = s.parse::<MissedTick>() {
                cfg.missed_tick = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_fused_stages == 0 {
            return Err(Error::Config("max_fused_stages must be at least 1".into()));
        }
        Ok(())
    }
}
