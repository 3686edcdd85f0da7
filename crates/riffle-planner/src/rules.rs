//! Fusion rules.

use riffle_core::trace::emit_event;
use riffle_core::EngineConfig;

use crate::plan::Plan;
use crate::stage::Stage;

/// Collapse maximal runs of adjacent per-element pure stages into
/// `Stage::Fused`, at most `config.max_fused_stages` per pass.
///
/// Stage order is never changed. Runs of a single stage are left alone, and
/// nothing happens when `config.fusion_enabled` is false.
pub fn optimize<T>(plan: Plan<T>, config: &EngineConfig) -> Plan<T> {
    if !config.fusion_enabled {
        return plan;
    }
    let cap = config.max_fused_stages.max(1);

    let before = plan.len();
    let mut out = Vec::with_capacity(before);
    let mut run: Vec<Stage<T>> = Vec::new();
    for stage in plan.into_stages() {
        if stage.is_fusible() {
            run.push(stage);
            if run.len() == cap {
                flush(&mut run, &mut out);
            }
        } else {
            flush(&mut run, &mut out);
            out.push(stage);
        }
    }
    flush(&mut run, &mut out);

    emit_event(
        "optimize",
        &[
            ("stages_before", before.to_string()),
            ("stages_after", out.len().to_string()),
        ],
    );
    #[cfg(feature = "tracing")]
    tracing::debug!(before, after = out.len(), cap, "fused pure stage runs");

    Plan::from_stages(out)
}

fn flush<T>(run: &mut Vec<Stage<T>>, out: &mut Vec<Stage<T>>) {
    match run.len() {
        0 => {}
        1 => out.append(run),
        _ => out.push(Stage::Fused(std::mem::take(run))),
    }
}
