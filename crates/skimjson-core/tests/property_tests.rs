//! Property-based tests for lookup invariants
//!
//! Uses proptest to check that the scanner, the cached and uncached path
//! routes, and the fallback oracle agree on arbitrary documents.

use proptest::prelude::*;
use serde_json::{Map, Value};
use skimjson::parser::parse;
use skimjson::{FallbackOracle, Getter, Plan, PlanCache, SerdeOracle, materialize};

/// Arbitrary JSON values with unique keys and escape-free strings
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Every dotted path that addresses a value of `value`
fn paths_of(value: &Value, prefix: &str, out: &mut Vec<String>) {
    let join = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}.{segment}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = join(key);
                out.push(path.clone());
                paths_of(child, &path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = join(&index.to_string());
                out.push(path.clone());
                paths_of(child, &path, out);
            }
        }
        _ => {}
    }
}

/// Bracket form of a dotted path for the fallback route
fn bracketed(path: &str) -> String {
    path.split('.')
        .map(|token| {
            if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
                format!("[{token}]")
            } else {
                format!(".{token}")
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

proptest! {
    /// Parsing a serialized document spans exactly the trimmed document
    #[test]
    fn parse_spans_whole_document(value in json_value(), pad in 0usize..4) {
        let text = format!("{}{}{}", " ".repeat(pad), value, "\n".repeat(pad));
        let node = parse(text.as_bytes());
        prop_assert!(node.is_valid());
        prop_assert_eq!(node.span(), pad..pad + value.to_string().len());
    }

    /// Materializing the root gives back the original value
    #[test]
    fn materialize_matches_serde(value in json_value()) {
        let text = value.to_string();
        let materialized = materialize(parse(text.as_bytes()));
        prop_assert_eq!(materialized.map(|v| v.to_string()), Some(text));
    }

    /// Cached and uncached plans resolve every path to the same span
    #[test]
    fn cache_hit_and_miss_agree(value in json_value()) {
        let text = value.to_string();
        let root = parse(text.as_bytes());
        let cache = PlanCache::with_capacity(4);
        let mut paths = Vec::new();
        paths_of(&value, "", &mut paths);

        for _ in 0..2 {
            for path in &paths {
                let cached = cache.compile(path).resolve(root);
                let fresh = Plan::tokenize(path).resolve(root);
                prop_assert!(fresh.is_valid());
                prop_assert_eq!(cached.span(), fresh.span());
            }
        }
    }

    /// Every path found by the fast route agrees with the fallback oracle
    #[test]
    fn fast_route_matches_oracle(value in json_value()) {
        let text = value.to_string();
        let buf = text.as_bytes();
        let getter = Getter::new();
        let mut paths = Vec::new();
        paths_of(&value, "", &mut paths);

        for path in &paths {
            let fast = getter.get(buf, path).unwrap();
            let slow = SerdeOracle.lookup(buf, &bracketed(path));
            prop_assert_eq!(fast.span(), slow.span(), "path {}", path);
            prop_assert_eq!(fast.kind(), slow.kind());
        }
    }

    /// Plans re-join to the path they were tokenized from
    #[test]
    fn plan_display_round_trips(path in "[a-z]{1,3}(\\.([a-z]{0,3}|[1-9][0-9]{0,3}))*") {
        prop_assert_eq!(Plan::tokenize(&path).to_string(), path);
    }
}
