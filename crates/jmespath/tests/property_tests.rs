//! Property-based tests for the interpreter.
//!
//! 1. Identity: `@` returns its input unchanged.
//! 2. Determinism: evaluating a compiled expression twice gives equal results.
//! 3. Slices: `[start:stop:step]` picks the same indices as a naive model.

use jmespath::{compile, evaluate, search_json, EvalCtx, Runtime, ScopeChain, Value};
use proptest::prelude::*;
use serde_json::{json, Value as Json};

fn json_strategy() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::from),
        any::<i64>().prop_map(Json::from),
        (-1.0e6..1.0e6f64).prop_map(Json::from),
        "[a-z]{0,6}".prop_map(Json::from),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..6)
                .prop_map(|pairs| Json::Object(pairs.into_iter().collect())),
        ]
    })
}

/// Indices a slice should select, found by scanning every position rather
/// than stepping from a computed start.
fn model_slice(len: i64, start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<i64> {
    let normalize = |bound: i64, low: i64, high: i64| {
        let shifted = if bound < 0 { bound + len } else { bound };
        shifted.clamp(low, high)
    };
    if step > 0 {
        let start = start.map_or(0, |s| normalize(s, 0, len));
        let stop = stop.map_or(len, |s| normalize(s, 0, len));
        (0..len)
            .filter(|i| *i >= start && *i < stop && (i - start) % step == 0)
            .collect()
    } else {
        let start = start.map_or(len - 1, |s| normalize(s, -1, len - 1));
        let stop = stop.map_or(-1, |s| normalize(s, -1, len - 1));
        (0..len)
            .rev()
            .filter(|i| *i <= start && *i > stop && (start - i) % (-step) == 0)
            .collect()
    }
}

fn bound_text(bound: Option<i64>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_default()
}

proptest! {
    #[test]
    fn identity_returns_input(data in json_strategy()) {
        prop_assert_eq!(search_json(&data, "@").unwrap(), data);
    }

    #[test]
    fn evaluation_is_deterministic(data in json_strategy()) {
        let ast = compile("[*].* | [0] || keys(@) || sort_by(@, &to_string(@))").unwrap();
        let value = Value::from(&data);
        let mut scope = ScopeChain::new();
        let mut ctx = EvalCtx::new(&mut scope, Runtime::shared());
        let first = evaluate(&ast, &value, &mut ctx);
        let second = evaluate(&ast, &value, &mut ctx);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn slices_match_model(
        len in 0i64..12,
        start in prop::option::of(-15i64..15),
        stop in prop::option::of(-15i64..15),
        step in prop_oneof![-4i64..=-1, 1i64..=4],
    ) {
        let data = Json::Array((0..len).map(Json::from).collect());
        let expr = format!("[{}:{}:{}]", bound_text(start), bound_text(stop), step);
        let got = search_json(&data, &expr).unwrap();
        let expected: Vec<Json> = model_slice(len, start, stop, step)
            .into_iter()
            .map(Json::from)
            .collect();
        prop_assert_eq!(got, Json::Array(expected));
    }
}

#[test]
fn model_agrees_with_known_slices() {
    assert_eq!(model_slice(6, Some(1), Some(4), 1), vec![1, 2, 3]);
    assert_eq!(model_slice(6, None, None, -1), vec![5, 4, 3, 2, 1, 0]);
    assert_eq!(model_slice(6, Some(-2), None, 1), vec![4, 5]);
    assert_eq!(model_slice(0, None, None, -2), Vec::<i64>::new());
    assert_eq!(search_json(&json!([0, 1, 2, 3]), "[::-2]").unwrap(), json!([3, 1]));
}
