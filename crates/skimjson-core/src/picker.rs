//! Envelope drilling
//!
//! API responses often wrap the payload (`{"code":0,"data":{...}}`). A drill
//! picker tries candidate keys in order, each as given and then with its
//! first letter capitalized, and falls back to the whole value.

use std::borrow::Cow;

use serde_json::Value;
use skimjson_record::{FieldValue, Record, SchemaRegistry};

use crate::parser::Node;

/// Default candidate keys
pub const DEFAULT_DRILL_KEYS: &[&str] = &["data"];

/// First candidate member of `root`, or `root` itself
pub fn pick_node<'a, S: AsRef<str>>(root: Node<'a>, keys: &[S]) -> Node<'a> {
    for key in keys {
        for variant in variants(key.as_ref()) {
            let node = root.object_get(&variant);
            if node.is_valid() {
                return node;
            }
        }
    }
    root
}

/// First candidate member of an owned object, or `value` itself
pub fn pick_value<'v, S: AsRef<str>>(value: &'v Value, keys: &[S]) -> &'v Value {
    let Value::Object(map) = value else {
        return value;
    };
    for key in keys {
        for variant in variants(key.as_ref()) {
            if let Some(found) = map.get(variant.as_ref()) {
                return found;
            }
        }
    }
    value
}

/// First candidate field of a record, matched by exported name or tag alias
///
/// Null pointer fields are skipped. Returns `None` if no candidate matches.
pub fn pick_record<'r, R: Record, S: AsRef<str>>(
    registry: &SchemaRegistry,
    record: &'r R,
    keys: &[S],
) -> Option<FieldValue<'r>> {
    let schema = registry.schema_for::<R>();
    keys.iter()
        .flat_map(|key| variants(key.as_ref()).into_iter())
        .filter_map(|variant| schema.field(&variant))
        .filter_map(|field| field.read(record))
        .find(|value| !value.is_null())
}

/// The key as given, then with an ASCII-lowercase first letter capitalized
fn variants(key: &str) -> Vec<Cow<'_, str>> {
    let mut out = vec![Cow::Borrowed(key)];
    if let Some(first) = key.bytes().next()
        && first.is_ascii_lowercase()
    {
        let mut capitalized = String::with_capacity(key.len());
        capitalized.push(first.to_ascii_uppercase() as char);
        capitalized.push_str(&key[1..]);
        out.push(Cow::Owned(capitalized));
    }
    out
}
