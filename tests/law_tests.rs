//! Algebraic laws, checked over generated inputs.

mod common;

use common::collect_sync;
use proptest::prelude::*;
use riffle::core::Monoid;
use riffle::observable::Stream;
use riffle::stateful::{compose, StatefulStream};

fn counter(step: i64) -> StatefulStream<i64, i64, i64> {
    StatefulStream::lift_stateful(move |x: i64, n: i64| {
        (n.wrapping_add(step), x.wrapping_mul(3).wrapping_add(n))
    })
}

fn offset(k: i64) -> StatefulStream<i64, i64, i64> {
    StatefulStream::lift_stateless(move |x: i64| x.wrapping_sub(k))
}

proptest! {
    #[test]
    fn map_identity(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let source = Stream::from_array(values.clone());
        prop_assert_eq!(collect_sync(&source.map(|x| x)), values);
    }

    #[test]
    fn map_composition(values in prop::collection::vec(-1000i64..1000, 0..20), a in -5i64..5, b in -5i64..5) {
        let source = Stream::from_array(values);
        let f = move |x: i64| x * a;
        let g = move |x: i64| x + b;
        let chained = source.map(f).map(g);
        let composed = source.map(move |x| g(f(x)));
        prop_assert_eq!(collect_sync(&chained), collect_sync(&composed));
    }

    #[test]
    fn chain_left_identity(x in -1000i64..1000, n in 0usize..4) {
        let f = move |v: i64| Stream::from_array(vec![v; n]);
        prop_assert_eq!(collect_sync(&Stream::of(x).chain(f)), collect_sync(&f(x)));
    }

    #[test]
    fn chain_right_identity(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let source = Stream::from_array(values.clone());
        prop_assert_eq!(collect_sync(&source.chain(Stream::of)), values);
    }

    #[test]
    fn chain_associativity(values in prop::collection::vec(-100i64..100, 0..10)) {
        let source = Stream::from_array(values);
        let f = |v: i64| Stream::from_array(vec![v, v + 1]);
        let g = |v: i64| Stream::from_array(vec![v * 10]);
        let left = source.chain(f).chain(g);
        let right = source.chain(move |v| f(v).chain(g));
        prop_assert_eq!(collect_sync(&left), collect_sync(&right));
    }

    #[test]
    fn stateful_composition_is_associative(
        inputs in prop::collection::vec(-1000i64..1000, 0..10),
        seed in -100i64..100,
        a in -3i64..3,
        b in -3i64..3,
    ) {
        let (f, g, h) = (counter(a), offset(b), counter(b));
        let left = compose(&compose(&f, &g), &h);
        let right = compose(&f, &compose(&g, &h));
        prop_assert_eq!(left.run_all(inputs.clone(), seed), right.run_all(inputs, seed));
    }

    #[test]
    fn stateful_identity_is_a_unit(input in any::<i64>(), seed in any::<i64>(), a in -3i64..3) {
        let f = counter(a);
        let id = StatefulStream::identity();
        prop_assert_eq!(compose(&id, &f).run(input, seed), f.run(input, seed));
        prop_assert_eq!(compose(&f, &id).run(input, seed), f.run(input, seed));
    }

    #[test]
    fn sum_monoid_laws(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        let m = Monoid::<i64>::sum();
        prop_assert_eq!(m.combine(m.empty(), a), a);
        prop_assert_eq!(m.combine(a, m.empty()), a);
        prop_assert_eq!(m.combine(m.combine(a, b), c), m.combine(a, m.combine(b, c)));
    }

    #[test]
    fn vec_monoid_concat_all_flattens(parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..6)) {
        let m = Monoid::<Vec<u8>>::vec();
        let flat: Vec<u8> = parts.iter().flatten().copied().collect();
        prop_assert_eq!(m.concat_all(parts), flat);
    }
}

#[tokio::test]
async fn fold_map_agrees_with_concat_all() {
    let values = vec!["ab", "", "c", "de"];
    let m = Monoid::string();
    let folded = Stream::from_array(values.clone())
        .fold_map(m.clone(), |s: &str| s.to_string())
        .await
        .unwrap();
    assert_eq!(folded, m.concat_all(values.into_iter().map(String::from)));
    assert_eq!(folded, "abcde");
}
