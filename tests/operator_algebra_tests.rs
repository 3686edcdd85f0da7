//! Operator semantics over synchronous sources.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{collect_sync, record, Event};
use riffle::core::{Optic, StreamError};
use riffle::observable::{EventEmitter, Observer, Stream, Unsubscribe};

#[test]
fn scenario_map_doubles() {
    let doubled = Stream::from_array(vec![1, 2, 3]).map(|x| x * 2);
    assert_eq!(collect_sync(&doubled), vec![2, 4, 6]);
}

#[test]
fn scenario_filter_even() {
    let evens = Stream::from_array(vec![1, 2, 3]).filter(|x| x % 2 == 0);
    assert_eq!(collect_sync(&evens), vec![2]);
}

#[test]
fn scenario_flat_map_with_sync_inners() {
    let spread = Stream::from_array(vec![1, 2]).flat_map(|x| Stream::from_array(vec![x, x * 10]));
    assert_eq!(collect_sync(&spread), vec![1, 10, 2, 20]);
}

#[test]
fn scenario_scan_emits_initial_then_accumulations() {
    let running = Stream::of(5).scan(|acc, x| acc + x, 0);
    assert_eq!(collect_sync(&running), vec![0, 5]);
}

#[test]
fn filter_map_drops_none() {
    let parsed = Stream::from_array(vec!["1", "x", "3"]).filter_map(|s| s.parse::<i32>().ok());
    assert_eq!(collect_sync(&parsed), vec![1, 3]);
}

#[test]
fn take_boundaries() {
    let source = Stream::from_array(vec![1, 2, 3, 4]);
    assert_eq!(collect_sync(&source.take(2)), vec![1, 2]);
    assert_eq!(collect_sync(&source.take(10)), vec![1, 2, 3, 4]);
}

#[test]
fn take_zero_completes_without_subscribing() {
    let subscribed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&subscribed);
    let source = Stream::create(move |observer: Observer<i32>| {
        counter.fetch_add(1, Ordering::SeqCst);
        observer.complete();
        Unsubscribe::empty()
    });
    let (recorder, _) = record(&source.take(0));
    assert_eq!(recorder.events(), vec![Event::Complete]);
    assert_eq!(subscribed.load(Ordering::SeqCst), 0);
}

#[test]
fn take_cancels_an_infinite_source() {
    let emitter = Arc::new(EventEmitter::<i32>::new());
    let (recorder, _) = record(&Stream::from_event(Arc::clone(&emitter), "n").take(2));
    emitter.emit("n", 1);
    emitter.emit("n", 2);
    assert_eq!(recorder.events(), vec![Event::Next(1), Event::Next(2), Event::Complete]);
    assert_eq!(emitter.listener_count("n"), 0);
}

#[test]
fn take_stops_a_synchronous_upstream_mid_emission() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let counted = Stream::from_array(vec![1, 2, 3, 4, 5]).map(move |x| {
        counter.fetch_add(1, Ordering::SeqCst);
        x
    });
    assert_eq!(collect_sync(&counted.take(1)), vec![1]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concat_does_not_start_the_second_source_once_closed() {
    let subscriptions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&subscriptions);
    let second = Stream::create(move |observer: Observer<i32>| {
        counter.fetch_add(1, Ordering::SeqCst);
        observer.next(99);
        observer.complete();
        Unsubscribe::empty()
    });
    let joined = Stream::from_array(vec![1, 2]).concat(&second).take(1);
    assert_eq!(collect_sync(&joined), vec![1]);
    assert_eq!(subscriptions.load(Ordering::SeqCst), 0);
}

#[test]
fn take_stops_a_synchronous_inner_of_flat_map() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let spread = Stream::from_array(vec![7]).flat_map(move |x| {
        let counter = Arc::clone(&counter);
        Stream::from_array(vec![x; 5]).map(move |v| {
            counter.fetch_add(1, Ordering::SeqCst);
            v
        })
    });
    assert_eq!(collect_sync(&spread.take(2)), vec![7, 7]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn raw_producer_can_see_downstream_close() {
    let emitted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&emitted);
    let naturals = Stream::create(move |observer: Observer<usize>| {
        for n in 0..1_000 {
            if observer.is_closed() {
                break;
            }
            counter.fetch_add(1, Ordering::SeqCst);
            observer.next(n);
        }
        observer.complete();
        Unsubscribe::empty()
    });
    assert_eq!(collect_sync(&naturals.take(3)), vec![0, 1, 2]);
    assert_eq!(emitted.load(Ordering::SeqCst), 3);
}

#[test]
fn skip_boundaries() {
    let source = Stream::from_array(vec![1, 2, 3]);
    assert_eq!(collect_sync(&source.skip(0)), vec![1, 2, 3]);
    assert_eq!(collect_sync(&source.skip(2)), vec![3]);
    assert!(collect_sync(&source.skip(5)).is_empty());
}

#[test]
fn distinct_is_per_subscription() {
    let deduped = Stream::from_array(vec![1, 2, 1, 3, 2]).distinct();
    assert_eq!(collect_sync(&deduped), vec![1, 2, 3]);
    assert_eq!(collect_sync(&deduped), vec![1, 2, 3]);
}

#[test]
fn switch_latest_drops_superseded_inner() {
    let outer = Arc::new(EventEmitter::<i32>::new());
    let inner = Arc::new(EventEmitter::<i32>::new());
    let inner_for_map = Arc::clone(&inner);
    let switched = Stream::from_event(Arc::clone(&outer), "outer").flat_map(move |key| {
        Stream::from_event(Arc::clone(&inner_for_map), "inner").map(move |v| key * 100 + v)
    });

    let (recorder, handle) = record(&switched);
    outer.emit("outer", 1);
    inner.emit("inner", 1);
    outer.emit("outer", 2);
    // Only the inner subscription for key 2 may still be listening.
    assert_eq!(inner.listener_count("inner"), 1);
    inner.emit("inner", 2);

    assert_eq!(recorder.values(), vec![101, 202]);
    handle.unsubscribe();
    assert_eq!(inner.listener_count("inner"), 0);
    assert_eq!(outer.listener_count("outer"), 0);
}

#[test]
fn flat_map_outer_completion_completes_immediately() {
    let events = Arc::new(EventEmitter::<i32>::new());
    let held = Stream::from_array(vec![1]).flat_map(move |_| Stream::from_event(Arc::clone(&events), "x"));
    let (recorder, _) = record(&held);
    assert_eq!(recorder.events(), vec![Event::Complete]);
}

#[test]
fn flat_map_inner_error_terminates() {
    let failing = Stream::from_array(vec![1, 2]).flat_map(|x| {
        if x == 1 {
            Stream::throw_error(StreamError::producer("inner"))
        } else {
            Stream::of(x)
        }
    });
    let (recorder, _) = record(&failing);
    assert_eq!(
        recorder.events(),
        vec![Event::Error(StreamError::producer("inner"))]
    );
}

#[test]
fn concat_orders_sources() {
    let first = Stream::from_array(vec![1, 2]);
    let second = Stream::from_array(vec![3]);
    assert_eq!(collect_sync(&first.concat(&second)), vec![1, 2, 3]);
}

#[test]
fn concat_does_not_start_second_after_error() {
    let started = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&started);
    let second = Stream::create(move |observer: Observer<i32>| {
        counter.fetch_add(1, Ordering::SeqCst);
        observer.complete();
        Unsubscribe::empty()
    });
    let (recorder, _) = record(&Stream::throw_error(StreamError::producer("first")).concat(&second));
    assert!(recorder.error().is_some());
    assert_eq!(started.load(Ordering::SeqCst), 0);
}

#[test]
fn merge_completes_after_both() {
    let a = Arc::new(EventEmitter::<i32>::new());
    let left = Stream::from_event(Arc::clone(&a), "v").take(2);
    let right = Stream::from_array(vec![10]);
    let (recorder, _) = record(&left.merge(&right));
    assert_eq!(recorder.values(), vec![10]);
    assert!(!recorder.completed());
    a.emit("v", 1);
    a.emit("v", 2);
    assert_eq!(recorder.values(), vec![10, 1, 2]);
    assert!(recorder.completed());
}

#[test]
fn merge_error_cancels_the_other_side() {
    let a = Arc::new(EventEmitter::<i32>::new());
    let left = Stream::from_event(Arc::clone(&a), "v");
    let right = Stream::throw_error(StreamError::producer("right"));
    let (recorder, _) = record(&left.merge(&right));
    assert_eq!(recorder.error(), Some(StreamError::producer("right")));
    assert_eq!(a.listener_count("v"), 0);
}

#[test]
fn combine_treats_none_items_as_arrived() {
    let left = Arc::new(EventEmitter::<Option<i32>>::new());
    let right = Arc::new(EventEmitter::<i32>::new());
    let joined: Stream<(Option<i32>, i32)> = Stream::combine(
        &Stream::from_event(Arc::clone(&left), "l"),
        &Stream::from_event(Arc::clone(&right), "r"),
        |a: &Option<i32>, b: &i32| (*a, *b),
    );
    let (recorder, _) = record(&joined);
    left.emit("l", None);
    right.emit("r", 1);
    left.emit("l", Some(5));
    assert_eq!(recorder.values(), vec![(None, 1), (Some(5), 1)]);
}

#[test]
fn combine_completes_early_when_a_side_never_produced() {
    let right = Arc::new(EventEmitter::<i32>::new());
    let joined: Stream<i32> = Stream::combine(
        &Stream::<i32>::empty(),
        &Stream::from_event(Arc::clone(&right), "r"),
        |a, b| a + b,
    );
    let (recorder, _) = record(&joined);
    assert_eq!(recorder.events(), vec![Event::Complete]);
    assert_eq!(right.listener_count("r"), 0);
}

#[test]
fn catch_error_switches_to_replacement() {
    let recovered = Stream::from_array(vec![1])
        .concat(&Stream::throw_error(StreamError::producer("x")))
        .catch_error(|err| {
            assert_eq!(err, StreamError::producer("x"));
            Stream::from_array(vec![7, 8])
        });
    assert_eq!(collect_sync(&recovered), vec![1, 7, 8]);
}

#[test]
fn bimap_and_map_err_touch_both_channels() {
    let failing: Stream<i32> = Stream::throw_error(StreamError::producer("raw"));
    let (recorder, _) = record(&failing.map_err(|e| StreamError::Unhandled(e.to_string())));
    assert_eq!(
        recorder.error(),
        Some(StreamError::Unhandled("producer error: raw".into()))
    );

    let mapped = Stream::from_array(vec![1, 2]).bimap(|e| e, |x| x.to_string());
    assert_eq!(collect_sync(&mapped), vec!["1".to_string(), "2".to_string()]);
}

#[test]
fn buffering_operators_replay_at_completion() {
    let source = Stream::from_array(vec![3, 1, 2, 5, 4]);
    assert_eq!(collect_sync(&source.sort_by(|a, b| a.cmp(b))), vec![1, 2, 3, 4, 5]);
    assert_eq!(collect_sync(&source.sort_by_key(|x| -x)), vec![5, 4, 3, 2, 1]);
    assert_eq!(collect_sync(&source.reverse()), vec![4, 5, 2, 1, 3]);
    assert_eq!(collect_sync(&source.slice(1..3)), vec![1, 2]);
    assert_eq!(collect_sync(&source.slice(3..)), vec![5, 4]);
    assert!(collect_sync(&source.slice(7..9)).is_empty());
}

#[test]
fn buffering_operators_emit_nothing_before_completion() {
    let feed = Arc::new(EventEmitter::<i32>::new());
    let (recorder, _) = record(&Stream::from_event(Arc::clone(&feed), "v").reverse());
    feed.emit("v", 1);
    feed.emit("v", 2);
    assert!(recorder.events().is_empty());
}

#[derive(Debug, Clone, PartialEq)]
enum Reading {
    Celsius(f64),
    Missing,
}

#[test]
fn focus_and_over_use_the_optic() {
    let celsius: Optic<Reading, f64> = Optic::prism(
        |r: &Reading| match r {
            Reading::Celsius(c) => Some(*c),
            Reading::Missing => None,
        },
        Reading::Celsius,
    );
    let source = Stream::from_array(vec![
        Reading::Celsius(10.0),
        Reading::Missing,
        Reading::Celsius(20.0),
    ]);

    assert_eq!(collect_sync(&source.focus(celsius.clone())), vec![10.0, 20.0]);
    assert_eq!(
        collect_sync(&source.over(celsius, |c| c + 1.0)),
        vec![
            Reading::Celsius(11.0),
            Reading::Missing,
            Reading::Celsius(21.0)
        ]
    );
}

#[test]
fn step_with_runs_a_fresh_stepper_per_subscription() {
    use riffle::observable::Step;

    let firsts = Stream::from_array(vec![1, 2, 3]).step_with("firstTwo", || {
        let mut seen = 0;
        move |x: i32| {
            seen += 1;
            if seen < 2 {
                Step::Yield(x)
            } else {
                Step::Finish(x)
            }
        }
    });
    assert_eq!(collect_sync(&firsts), vec![1, 2]);
    assert_eq!(collect_sync(&firsts), vec![1, 2]);
}
