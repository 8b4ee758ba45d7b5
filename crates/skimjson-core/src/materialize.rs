//! Owned value trees from resolved nodes

use serde_json::{Map, Number, Value};

use crate::parser::{Node, NodeKind, number, unescape};

/// Deepest container nesting [`materialize`] descends into
pub const MAX_DEPTH: usize = 128;

/// Convert `node` into an owned [`serde_json::Value`]
///
/// Integer literals keep their exact value (`i64`, then `u64`); other numbers
/// go through float parsing. Strings are unescaped. With duplicate object
/// keys the first occurrence is kept. Returns `None` for invalid nodes, for
/// anything unreadable below them and for containers nested more than
/// [`MAX_DEPTH`] levels deep.
pub fn materialize(node: Node<'_>) -> Option<Value> {
    materialize_at(node, 0)
}

fn materialize_at(node: Node<'_>, depth: usize) -> Option<Value> {
    let nested = matches!(node.kind(), NodeKind::Array | NodeKind::Object);
    if nested && depth >= MAX_DEPTH {
        return None;
    }

    match node.kind() {
        NodeKind::Null => Some(Value::Null),
        NodeKind::Bool => node.as_bool().map(Value::Bool),
        NodeKind::String => node.unescaped_string().map(Value::String),
        NodeKind::Number => number_value(node.raw()),
        NodeKind::Array => {
            let mut elements = node.elements();
            let items = elements
                .by_ref()
                .map(|element| materialize_at(element, depth + 1))
                .collect::<Option<Vec<_>>>()?;
            (!elements.is_malformed()).then_some(Value::Array(items))
        }
        NodeKind::Object => {
            let mut members = node.members();
            let mut map = Map::new();
            for (key, value) in members.by_ref() {
                let value = materialize_at(value, depth + 1)?;
                map.entry(unescape(key)).or_insert(value);
            }
            (!members.is_malformed()).then_some(Value::Object(map))
        }
        NodeKind::Invalid => None,
    }
}

fn number_value(raw: &[u8]) -> Option<Value> {
    if number::is_integer_literal(raw) {
        if let Some(n) = number::parse_i64(raw) {
            return Some(Value::Number(n.into()));
        }
        if let Some(n) = number::parse_u64(raw) {
            return Some(Value::Number(n.into()));
        }
    }
    number::parse_f64(raw)
        .and_then(Number::from_f64)
        .map(Value::Number)
}
