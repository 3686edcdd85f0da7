//! Fusion engine: rules, lowering, reorder legality, and the YAML DSL.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{collect_sync, record, Event};
use proptest::prelude::*;
use riffle::core::{EngineConfig, PurityMarked, PurityTag, StreamError};
use riffle::observable::{Observer, Stream, Unsubscribe};
use riffle::planner::{lower, optimize, parse_yaml_pipeline, Plan, PlanError, Stage};

fn pure_chain() -> Plan<i64> {
    Plan::new()
        .then(Stage::map("double", |x: i64| x * 2))
        .then(Stage::filter("gt3", |x: &i64| *x > 3))
        .then(Stage::Distinct)
        .then(Stage::Skip(1))
        .then(Stage::Take(3))
}

fn op_names(plan: &Plan<i64>) -> Vec<&'static str> {
    plan.stages().iter().map(Stage::op_name).collect()
}

#[test]
fn optimize_collapses_adjacent_pure_stages() {
    let plan = pure_chain()
        .then(Stage::scan("sum", 0, |a: i64, b: i64| a + b))
        .then(Stage::map("neg", |x: i64| -x));
    let optimized = optimize(plan, &EngineConfig::default());
    assert_eq!(op_names(&optimized), vec!["fused", "scan", "map"]);
    match &optimized.stages()[0] {
        Stage::Fused(inner) => assert_eq!(inner.len(), 5),
        other => panic!("expected fused stage, got {other:?}"),
    }
    assert_eq!(optimized.stages()[0].purity(), PurityTag::Pure);
}

#[test]
fn buffering_stages_are_barriers() {
    let plan = Plan::new()
        .then(Stage::map("inc", |x: i64| x + 1))
        .then(Stage::map("inc", |x: i64| x + 1))
        .then(Stage::Reverse)
        .then(Stage::filter("odd", |x: &i64| x % 2 != 0))
        .then(Stage::Take(1));
    let optimized = optimize(plan, &EngineConfig::default());
    assert_eq!(op_names(&optimized), vec!["fused", "reverse", "fused"]);
}

#[test]
fn fusion_respects_config() {
    let disabled = EngineConfig {
        fusion_enabled: false,
        ..EngineConfig::default()
    };
    assert_eq!(op_names(&optimize(pure_chain(), &disabled)).len(), 5);

    let capped = EngineConfig {
        max_fused_stages: 2,
        ..EngineConfig::default()
    };
    assert_eq!(
        op_names(&optimize(pure_chain(), &capped)),
        vec!["fused", "fused", "take"]
    );
}

#[test]
fn fused_plan_matches_unfused_plan() {
    let source = Stream::from_array(vec![1, 2, 2, 3, 4, 4, 5, 6, 7]);
    let unfused = lower(&pure_chain(), &source);
    let fused = lower(&optimize(pure_chain(), &EngineConfig::default()), &source);
    assert_eq!(collect_sync(&fused), collect_sync(&unfused));
    assert_eq!(collect_sync(&fused), vec![6, 8, 10]);
    // Per-run state is fresh on every subscription.
    assert_eq!(collect_sync(&fused), vec![6, 8, 10]);
    assert_eq!(fused.purity(), PurityTag::Pure);
}

#[test]
fn fused_take_cancels_upstream() {
    let feed = Arc::new(riffle::observable::EventEmitter::<i64>::new());
    let source = Stream::from_event(Arc::clone(&feed), "v");
    let plan = Plan::new()
        .then(Stage::map("inc", |x: i64| x + 1))
        .then(Stage::Take(2));
    let stream = lower(&optimize(plan, &EngineConfig::default()), &source);
    let (recorder, _) = record(&stream);
    feed.emit("v", 1);
    feed.emit("v", 2);
    assert_eq!(
        recorder.events(),
        vec![Event::Next(2), Event::Next(3), Event::Complete]
    );
    assert_eq!(feed.listener_count("v"), 0);
}

#[test]
fn fused_take_zero_never_subscribes() {
    let subscribed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&subscribed);
    let source = Stream::create(move |observer: Observer<i64>| {
        counter.fetch_add(1, Ordering::SeqCst);
        observer.complete();
        Unsubscribe::empty()
    });
    let plan = Plan::new()
        .then(Stage::map("inc", |x: i64| x + 1))
        .then(Stage::Take(0));
    let stream = lower(&optimize(plan, &EngineConfig::default()), &source);
    let (recorder, _) = record(&stream);
    assert_eq!(recorder.events(), vec![Event::Complete]);
    assert_eq!(subscribed.load(Ordering::SeqCst), 0);
}

#[test]
fn errors_pass_through_fused_stages() {
    let source = Stream::from_array(vec![1]).concat(&Stream::throw_error(StreamError::producer("x")));
    let stream = lower(&optimize(pure_chain(), &EngineConfig::default()), &source);
    let (recorder, _) = record(&stream);
    assert_eq!(recorder.error(), Some(StreamError::producer("x")));
}

#[test]
fn reorder_candidates_follow_the_classifier() {
    let plan = Plan::new()
        .then(Stage::map("inc", |x: i64| x + 1))
        .then(Stage::scan("sum", 0, |a: i64, b: i64| a + b))
        .then(Stage::flat_map("dup", |x: i64| Stream::from_array(vec![x, x])))
        .then(Stage::catch_error("empty", |_| Stream::empty()));
    assert_eq!(plan.reorder_candidates(), vec![0]);

    match plan.clone().hoist(1) {
        Err(PlanError::IllegalReorder { index, first, second }) => {
            assert_eq!((index, first, second), (1, PurityTag::State, PurityTag::State));
        }
        other => panic!("expected illegal reorder, got {other:?}"),
    }
    assert!(matches!(plan.clone().hoist(2), Err(PlanError::IllegalReorder { .. })));
    assert!(matches!(plan.clone().hoist(3), Err(PlanError::InvalidStep { .. })));
    assert!(matches!(plan.clone().hoist(usize::MAX), Err(PlanError::InvalidStep { .. })));

    let hoisted = plan.hoist(0).unwrap();
    assert_eq!(
        op_names(&hoisted),
        vec!["scan", "map", "flatMap", "catchError"]
    );
}

#[test]
fn optimize_never_reorders() {
    let plan = Plan::new()
        .then(Stage::scan("sum", 0, |a: i64, b: i64| a + b))
        .then(Stage::map("inc", |x: i64| x + 1));
    let optimized = optimize(plan, &EngineConfig::default());
    assert_eq!(op_names(&optimized), vec!["scan", "map"]);
}

#[test]
fn yaml_pipeline_runs_end_to_end() {
    let yaml = r#"
config: { max_fused_stages: 8 }
steps:
  - { op: map, fn: mul, value: 2 }
  - { op: filter, fn: gt, value: 3 }
  - { op: take, count: 3 }
  - { op: scan, fn: sum }
  - { op: flat_map, fn: repeat, value: 2 }
  - { op: sort, descending: true }
  - { op: slice, start: 0, end: 3 }
"#;
    let parsed = parse_yaml_pipeline(yaml).unwrap();
    assert_eq!(parsed.config.max_fused_stages, 8);
    let source = Stream::from_array(vec![1, 2, 3, 4, 5]);
    let optimized = optimize(parsed.plan.clone(), &parsed.config);
    assert_eq!(
        op_names(&optimized),
        vec!["fused", "scan", "flatMap", "sortBy", "slice"]
    );
    // 2,4,6,8,10 → >3 → 4,6,8 → scan 0,4,10,18 → doubled → sorted desc → first 3
    assert_eq!(collect_sync(&lower(&optimized, &source)), vec![18, 18, 10]);
    assert_eq!(
        collect_sync(&lower(&optimized, &source)),
        collect_sync(&lower(&parsed.plan, &source))
    );
}

#[test]
fn summaries_serialize_for_explain() {
    let optimized = optimize(pure_chain(), &EngineConfig::default());
    let summary = optimized.summary();
    assert_eq!(summary.purity, PurityTag::Pure);
    assert_eq!(summary.stages.len(), 1);
    assert_eq!(summary.stages[0].fused.len(), 5);
    let json = summary.to_json().unwrap();
    assert!(json.contains("\"op\": \"fused\""));
    assert!(json.contains("map(double)"));
}

fn arb_stage() -> impl Strategy<Value = Stage<i64>> {
    prop_oneof![
        (-3i64..=3).prop_map(|k| Stage::map(format!("add {k}"), move |x: i64| x.wrapping_add(k))),
        (1i64..=3).prop_map(|k| Stage::map(format!("mul {k}"), move |x: i64| x.wrapping_mul(k))),
        (2i64..=4).prop_map(|m| Stage::filter(format!("mod {m}"), move |x: &i64| x % m != 0)),
        (0usize..5).prop_map(Stage::Take),
        (0usize..5).prop_map(Stage::Skip),
        Just(Stage::Distinct),
    ]
}

proptest! {
    #[test]
    fn fusion_is_observationally_transparent(
        stages in prop::collection::vec(arb_stage(), 0..8),
        input in prop::collection::vec(-20i64..20, 0..30),
        cap in 1usize..6,
    ) {
        let plan = Plan::from_stages(stages);
        let config = EngineConfig { max_fused_stages: cap, ..EngineConfig::default() };
        let source = Stream::from_array(input);
        let unfused = collect_sync(&lower(&plan, &source));
        let fused = collect_sync(&lower(&optimize(plan, &config), &source));
        prop_assert_eq!(fused, unfused);
    }
}
