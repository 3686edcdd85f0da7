//! Lowering: Plan → Stream over the observable core.

use std::collections::HashSet;
use std::sync::Arc;

use riffle_core::PurityMarked;
use riffle_observable::{Step, Stream};

use crate::plan::Plan;
use crate::stage::{Element, Predicate, Stage, Transform};

/// Apply every stage of `plan` to `source`, in order.
///
/// The result is cold like its source: each subscription gets fresh counters,
/// seen-sets, and accumulators.
pub fn lower<T: Element>(plan: &Plan<T>, source: &Stream<T>) -> Stream<T> {
    plan.stages()
        .iter()
        .fold(source.clone(), |stream, stage| lower_stage(&stream, stage))
}

fn lower_stage<T: Element>(stream: &Stream<T>, stage: &Stage<T>) -> Stream<T> {
    match stage {
        Stage::Map { f, .. } => {
            let f = Arc::clone(f);
            stream.map(move |value| f(value))
        }
        Stage::Filter { pred, .. } => {
            let pred = Arc::clone(pred);
            stream.filter(move |value| pred(value))
        }
        Stage::Take(n) => stream.take(*n),
        Stage::Skip(n) => stream.skip(*n),
        Stage::Distinct => stream.distinct(),
        Stage::Scan { init, reducer, .. } => {
            let reducer = Arc::clone(reducer);
            stream.scan(move |acc, value| reducer(acc, value), init.clone())
        }
        Stage::FlatMap { f, .. } => {
            let f = Arc::clone(f);
            stream.flat_map(move |value| f(value))
        }
        Stage::Sort { cmp, .. } => {
            let cmp = Arc::clone(cmp);
            stream.sort_by(move |a, b| cmp(a, b))
        }
        Stage::Reverse => stream.reverse(),
        Stage::Slice { start, end } => match end {
            Some(end) => stream.slice(*start..*end),
            None => stream.slice(*start..),
        },
        Stage::CatchError { handler, .. } => {
            let handler = Arc::clone(handler);
            stream.catch_error(move |err| handler(err))
        }
        Stage::Concat(other) => stream.concat(other),
        Stage::Merge(other) => stream.merge(other),
        Stage::Fused(inner) => lower_fused(stream, inner),
    }
}

/// Per-run state of one stage inside a fused pass.
enum Kernel<T> {
    Map(Transform<T>),
    Filter(Predicate<T>),
    Take { limit: usize, seen: usize },
    Skip { count: usize, seen: usize },
    Distinct(HashSet<T>),
}

impl<T: Element> Kernel<T> {
    fn fresh(stage: &Stage<T>) -> Option<Self> {
        Some(match stage {
            Stage::Map { f, .. } => Kernel::Map(Arc::clone(f)),
            Stage::Filter { pred, .. } => Kernel::Filter(Arc::clone(pred)),
            Stage::Take(limit) => Kernel::Take {
                limit: *limit,
                seen: 0,
            },
            Stage::Skip(count) => Kernel::Skip {
                count: *count,
                seen: 0,
            },
            Stage::Distinct => Kernel::Distinct(HashSet::new()),
            _ => return None,
        })
    }

    fn step(&mut self, value: T) -> Step<T> {
        match self {
            Kernel::Map(f) => Step::Yield(f(value)),
            Kernel::Filter(pred) => {
                if pred(&value) {
                    Step::Yield(value)
                } else {
                    Step::Discard
                }
            }
            Kernel::Take { limit, seen } => {
                *seen += 1;
                match (*seen).cmp(limit) {
                    std::cmp::Ordering::Less => Step::Yield(value),
                    std::cmp::Ordering::Equal => Step::Finish(value),
                    std::cmp::Ordering::Greater => Step::Stop,
                }
            }
            Kernel::Skip { count, seen } => {
                if *seen < *count {
                    *seen += 1;
                    Step::Discard
                } else {
                    Step::Yield(value)
                }
            }
            Kernel::Distinct(seen) => {
                if seen.insert(value.clone()) {
                    Step::Yield(value)
                } else {
                    Step::Discard
                }
            }
        }
    }
}

/// Push one value through every kernel. A `take` that reaches its limit marks
/// the pass as finishing; later kernels still see the value.
fn run_pass<T: Element>(kernels: &mut [Kernel<T>], value: T) -> Step<T> {
    let mut current = value;
    let mut finishing = false;
    for kernel in kernels.iter_mut() {
        match kernel.step(current) {
            Step::Yield(next) => current = next,
            Step::Finish(next) => {
                current = next;
                finishing = true;
            }
            Step::Discard if finishing => return Step::Stop,
            Step::Discard => return Step::Discard,
            Step::Stop => return Step::Stop,
        }
    }
    if finishing {
        Step::Finish(current)
    } else {
        Step::Yield(current)
    }
}

fn lower_fused<T: Element>(stream: &Stream<T>, inner: &[Stage<T>]) -> Stream<T> {
    // Non-fusible stages never end up here via `optimize`; a hand-built fused
    // stage holding one is lowered stage by stage instead.
    if !inner.iter().all(Stage::is_fusible) {
        return inner
            .iter()
            .fold(stream.clone(), |s, stage| lower_stage(&s, stage));
    }
    if inner.iter().any(|stage| matches!(stage, Stage::Take(0))) {
        return Stream::empty().stamped("fused");
    }

    let template: Arc<[Stage<T>]> = inner.iter().cloned().collect();
    stream.step_with("fused", move || {
        let mut kernels: Vec<Kernel<T>> = template.iter().filter_map(Kernel::fresh).collect();
        move |value| run_pass(&mut kernels, value)
    })
}
