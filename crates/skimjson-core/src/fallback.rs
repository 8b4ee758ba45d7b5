//! General path lookups for syntax the fast scanner does not handle
//!
//! Paths containing `[`, `]`, `*`, `?`, `#`, `\`, `|` or `@` are routed to a
//! [`FallbackOracle`]. The bundled [`SerdeOracle`] understands escaped dots
//! (`a\.b` is the single key `a.b`) and bracket indexes (`list[0].name`);
//! wildcard, query and modifier forms resolve to nothing.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;

use crate::parser::Node;

/// Bytes that switch a path to the fallback route
pub const EXTENDED_SYNTAX: &[u8] = b"[]*?#\\|@";

/// Check if `path` needs the fallback route
pub fn uses_extended_syntax(path: &str) -> bool {
    path.bytes().any(|b| EXTENDED_SYNTAX.contains(&b))
}

/// A general JSON path getter
///
/// Must return a node spanning a value of `buf`, or an invalid node, so that
/// its results are interchangeable with the fast scanner's.
pub trait FallbackOracle: Send + Sync {
    /// Resolve `path` in `buf`
    fn lookup<'a>(&self, buf: &'a [u8], path: &str) -> Node<'a>;
}

/// Oracle built on `serde_json` borrowed raw values
///
/// Each level walked is fully validated by `serde_json`. Object keys are
/// compared after escape decoding; with duplicate keys the first one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeOracle;

impl FallbackOracle for SerdeOracle {
    fn lookup<'a>(&self, buf: &'a [u8], path: &str) -> Node<'a> {
        self.find(buf, path).unwrap_or_else(Node::invalid)
    }
}

impl SerdeOracle {
    fn find<'a>(&self, buf: &'a [u8], path: &str) -> Option<Node<'a>> {
        let steps = parse_steps(path)?;
        let text = std::str::from_utf8(buf).ok()?;
        let mut current: &'a str = serde_json::from_str::<&'a RawValue>(text).ok()?.get();

        for step in &steps {
            current = descend(current, step)?;
        }

        let offset = current.as_ptr() as usize - text.as_ptr() as usize;
        let node = Node::at(buf, offset);
        node.is_valid().then_some(node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// Dotted token: a member name, or an index when applied to an array
    Name(String),
    /// Bracketed index
    Index(usize),
}

fn parse_steps(path: &str) -> Option<Vec<Step>> {
    let mut steps = Vec::new();
    if path.is_empty() {
        return Some(steps);
    }

    let mut token = String::new();
    let mut after_bracket = false;
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                token.push(chars.next()?);
                after_bracket = false;
            }
            '.' => {
                if !after_bracket {
                    steps.push(Step::Name(std::mem::take(&mut token)));
                }
                after_bracket = false;
            }
            '[' => {
                if !token.is_empty() {
                    steps.push(Step::Name(std::mem::take(&mut token)));
                }
                let mut digits = String::new();
                loop {
                    match chars.next()? {
                        ']' => break,
                        d if d.is_ascii_digit() => digits.push(d),
                        _ => return None,
                    }
                }
                steps.push(Step::Index(digits.parse().ok()?));
                after_bracket = true;
            }
            '*' | '?' | '#' | '|' | '@' | ']' => return None,
            _ => {
                token.push(c);
                after_bracket = false;
            }
        }
    }
    if !after_bracket {
        steps.push(Step::Name(token));
    }
    Some(steps)
}

fn descend<'a>(raw: &'a str, step: &Step) -> Option<&'a str> {
    match raw.as_bytes().first()? {
        b'{' => {
            let members = serde_json::from_str::<RawMembers<'a>>(raw).ok()?;
            let found = match step {
                Step::Name(name) => members.0.into_iter().find(|(k, _)| k == name),
                Step::Index(index) => {
                    let key = index.to_string();
                    members.0.into_iter().find(|(k, _)| *k == key)
                }
            };
            found.map(|(_, value)| value.get())
        }
        b'[' => {
            let index = match step {
                Step::Index(index) => *index,
                Step::Name(name) if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) => {
                    name.parse().ok()?
                }
                Step::Name(_) => return None,
            };
            let elements = serde_json::from_str::<Vec<&'a RawValue>>(raw).ok()?;
            elements.get(index).map(|value| value.get())
        }
        _ => None,
    }
}

/// Object members in document order, values left unparsed
struct RawMembers<'a>(Vec<(String, &'a RawValue)>);

impl<'de> Deserialize<'de> for RawMembers<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = RawMembers<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, &'de RawValue>()? {
                    members.push((key, value));
                }
                Ok(RawMembers(members))
            }
        }
        deserializer.deserialize_map(V)
    }
}
