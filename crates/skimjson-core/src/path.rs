//! Dotted paths compiled into segment plans
//!
//! `users.0.name` compiles to `[Key("users"), Index(0), Key("name")]`. A token
//! made only of ASCII digits is always an index, even when the value it is
//! applied to turns out to be an object; walking an index over an object
//! matches the member whose key is that number.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::cache::PlanCache;
use crate::parser::{Node, NodeKind};

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member
    Key(String),
    /// Array element
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Compiled, immutable sequence of path segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Plan {
    segments: SmallVec<[Segment; 8]>,
}

impl Plan {
    /// Tokenize `path` without consulting any cache
    ///
    /// The empty path yields an empty plan, which resolves to the root. Empty
    /// tokens between dots become empty keys.
    pub fn tokenize(path: &str) -> Self {
        if path.is_empty() {
            return Self::default();
        }
        let segments = path
            .split('.')
            .map(|token| match parse_index(token) {
                Some(index) => Segment::Index(index),
                None => Segment::Key(token.to_owned()),
            })
            .collect();
        Self { segments }
    }

    /// Segments in path order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the plan resolves to the root
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walk the plan from `root`
    pub fn resolve<'a>(&self, root: Node<'a>) -> Node<'a> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                Segment::Key(key) => current.object_get(key),
                Segment::Index(index) => match current.kind() {
                    NodeKind::Array => current.array_index(*index),
                    NodeKind::Object => current
                        .members()
                        .find(|(key, _)| is_decimal_of(key, *index))
                        .map_or_else(Node::invalid, |(_, value)| value),
                    _ => Node::invalid(),
                },
            };
            if !current.is_valid() {
                break;
            }
        }
        current
    }
}

impl fmt::Display for Plan {
    /// Re-joins the segments with `.`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Compile `path` through the process-wide plan cache
pub fn compile(path: &str) -> Arc<Plan> {
    PlanCache::global().compile(path)
}

/// Compile each of `paths` through the process-wide plan cache
pub fn compile_many<I, S>(paths: I) -> Vec<Arc<Plan>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PlanCache::global().compile_many(paths)
}

/// Index value of an all-digit token
///
/// Tokens too long for `usize` stay keys.
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Check if a raw object key is the canonical decimal form of `index`
fn is_decimal_of(key: &[u8], index: usize) -> bool {
    if key.is_empty() || (key.len() > 1 && key[0] == b'0') {
        return false;
    }
    let mut n: usize = 0;
    for &c in key {
        if !c.is_ascii_digit() {
            return false;
        }
        n = match n
            .checked_mul(10)
            .and_then(|n| n.checked_add(usize::from(c - b'0')))
        {
            Some(n) => n,
            None => return false,
        };
    }
    n == index
}
