//! Zero-copy JSON value references
//!
//! A [`Node`] is a byte span plus a kind inside a caller-owned buffer. Nothing
//! is decoded until a typed reader asks for it, and lookups that fail return
//! an invalid node rather than an error.

use std::fmt;

use super::number;
use super::scan::{classify, skip_ws, string_end, value_end};
use super::unescape::unescape;

/// Kind of a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
    /// `"..."`
    String,
    /// Number literal
    Number,
    /// `true` or `false`
    Bool,
    /// `null`
    Null,
    /// Absent, out of range or unreadable
    Invalid,
}

impl NodeKind {
    /// Lowercase name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Bool => "bool",
            NodeKind::Null => "null",
            NodeKind::Invalid => "invalid",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed reference to one JSON value within a buffer
///
/// `buf[start..end]` is exactly one complete value with no surrounding
/// whitespace, or the node is [`NodeKind::Invalid`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    buf: &'a [u8],
    start: usize,
    end: usize,
    kind: NodeKind,
}

/// Parse the root value of `buf`
pub fn parse(buf: &[u8]) -> Node<'_> {
    Node::from_bytes(buf)
}

impl<'a> Node<'a> {
    /// Node that refers to nothing
    pub const fn invalid() -> Self {
        Self {
            buf: &[],
            start: 0,
            end: 0,
            kind: NodeKind::Invalid,
        }
    }

    /// Parse the root value of `buf`
    ///
    /// Leading whitespace is skipped; bytes after the root value are ignored.
    pub fn from_bytes(buf: &'a [u8]) -> Self {
        Self::at(buf, skip_ws(buf, 0))
    }

    /// Value starting exactly at `start`, or invalid
    pub(crate) fn at(buf: &'a [u8], start: usize) -> Self {
        let Some(&first) = buf.get(start) else {
            return Self::invalid();
        };
        let kind = classify(first);
        let Some(end) = value_end(buf, start, kind) else {
            return Self::invalid();
        };

        let raw = &buf[start..end];
        let literal_ok = match kind {
            NodeKind::Bool => raw == b"true" || raw == b"false",
            NodeKind::Null => raw == b"null",
            _ => true,
        };
        if !literal_ok {
            return Self::invalid();
        }

        Self {
            buf,
            start,
            end,
            kind,
        }
    }

    /// Kind of this value
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Check if this node refers to a value
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.kind != NodeKind::Invalid
    }

    /// Byte range of the value within its buffer
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Raw bytes of the value, quotes and delimiters included
    pub fn raw(&self) -> &'a [u8] {
        &self.buf[self.start..self.end]
    }

    /// Raw text of the value, if the span is valid UTF-8
    pub fn raw_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.raw()).ok()
    }

    // ------------------------------------------------------------------
    // Typed readers
    // ------------------------------------------------------------------

    /// String contents without the quotes, escapes left verbatim
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.as_bytes()?).ok()
    }

    /// String contents without the quotes, as bytes
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        (self.kind == NodeKind::String).then(|| &self.buf[self.start + 1..self.end - 1])
    }

    /// String contents with escapes decoded (allocates)
    pub fn unescaped_string(&self) -> Option<String> {
        self.as_bytes().map(unescape)
    }

    /// Integer value of an integer literal
    ///
    /// Fails for fractional or exponent literals and on `i64` overflow.
    pub fn as_i64(&self) -> Option<i64> {
        let raw = self.number_raw()?;
        if number::is_integer_literal(raw) {
            number::parse_i64(raw)
        } else {
            None
        }
    }

    /// Unsigned value of a non-negative integer literal
    pub fn as_u64(&self) -> Option<u64> {
        let raw = self.number_raw()?;
        if number::is_integer_literal(raw) {
            number::parse_u64(raw)
        } else {
            None
        }
    }

    /// Floating-point value of any number literal
    pub fn as_f64(&self) -> Option<f64> {
        number::parse_f64(self.number_raw()?)
    }

    /// Check if the value is an integer literal
    pub fn is_integer(&self) -> bool {
        self.number_raw().is_some_and(number::is_integer_literal)
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        (self.kind == NodeKind::Bool).then(|| self.buf[self.start] == b't')
    }

    /// Check if the value is `null`
    pub fn is_null(&self) -> bool {
        self.kind == NodeKind::Null
    }

    fn number_raw(&self) -> Option<&'a [u8]> {
        (self.kind == NodeKind::Number).then(|| self.raw())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Direct member `key` of an object
    ///
    /// Keys are compared as raw bytes, escapes undecoded. The first matching
    /// member wins.
    pub fn object_get(&self, key: &str) -> Node<'a> {
        self.object_get_bytes(key.as_bytes())
    }

    /// Direct member whose raw key bytes equal `key`
    pub fn object_get_bytes(&self, key: &[u8]) -> Node<'a> {
        self.members()
            .find(|(k, _)| *k == key)
            .map_or_else(Node::invalid, |(_, v)| v)
    }

    /// Element `index` of an array
    pub fn array_index(&self, index: usize) -> Node<'a> {
        self.elements().nth(index).unwrap_or_else(Node::invalid)
    }

    /// Chained [`object_get`](Self::object_get)
    pub fn get_path<I, S>(&self, keys: I) -> Node<'a>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = *self;
        for key in keys {
            current = current.object_get(key.as_ref());
            if !current.is_valid() {
                break;
            }
        }
        current
    }

    /// Iterator over `(raw key, value)` members of an object
    ///
    /// Empty for any other kind; stops at the first unreadable member.
    pub fn members(&self) -> Members<'a> {
        Members {
            cursor: Cursor::open(self, NodeKind::Object),
        }
    }

    /// Iterator over the elements of an array
    ///
    /// Empty for any other kind; stops at the first unreadable element.
    pub fn elements(&self) -> Elements<'a> {
        Elements {
            cursor: Cursor::open(self, NodeKind::Array),
        }
    }

    /// Visit each member of an object until `f` returns `false`
    pub fn for_each_object<F>(&self, mut f: F)
    where
        F: FnMut(&'a [u8], Node<'a>) -> bool,
    {
        for (key, value) in self.members() {
            if !f(key, value) {
                break;
            }
        }
    }

    /// Visit each element of an array until `f` returns `false`
    pub fn for_each_array<F>(&self, mut f: F)
    where
        F: FnMut(usize, Node<'a>) -> bool,
    {
        for (index, value) in self.elements().enumerate() {
            if !f(index, value) {
                break;
            }
        }
    }

    /// Number of direct children of an object or array
    pub fn len(&self) -> usize {
        match self.kind {
            NodeKind::Object => self.members().count(),
            NodeKind::Array => self.elements().count(),
            _ => 0,
        }
    }

    /// Check if an object or array has no children
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Node<'_> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl PartialEq for Node<'_> {
    /// Nodes are equal when they have the same kind and raw bytes
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.raw() == other.raw()
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("span", &self.span())
            .field("raw", &String::from_utf8_lossy(self.raw()))
            .finish()
    }
}

/// Shared walking state for object members and array elements
#[derive(Clone)]
struct Cursor<'a> {
    /// Buffer cut at the container's closing delimiter
    buf: &'a [u8],
    pos: usize,
    done: bool,
    malformed: bool,
}

impl<'a> Cursor<'a> {
    fn open(node: &Node<'a>, kind: NodeKind) -> Self {
        if node.kind != kind {
            return Self {
                buf: &[],
                pos: 0,
                done: true,
                malformed: false,
            };
        }
        Self {
            buf: &node.buf[..node.end - 1],
            pos: node.start + 1,
            done: false,
            malformed: false,
        }
    }

    /// Position of the next child, or `None` at the end of the container
    fn next_child(&mut self) -> Option<usize> {
        if self.done {
            return None;
        }
        self.pos = skip_ws(self.buf, self.pos);
        if self.pos >= self.buf.len() {
            self.done = true;
            return None;
        }
        Some(self.pos)
    }

    /// Read the value at `pos` and step past it and its separator
    fn value(&mut self, pos: usize) -> Option<Node<'a>> {
        let node = Node::at(self.buf, pos);
        if !node.is_valid() {
            return self.stop();
        }
        let mut next = skip_ws(self.buf, node.end);
        if self.buf.get(next) == Some(&b',') {
            next += 1;
        }
        self.pos = next;
        Some(node)
    }

    /// End the walk at an unreadable child
    fn stop<T>(&mut self) -> Option<T> {
        self.done = true;
        self.malformed = true;
        None
    }
}

/// Iterator over the members of an object node
#[derive(Clone)]
pub struct Members<'a> {
    cursor: Cursor<'a>,
}

impl Members<'_> {
    /// Check if iteration ended at an unreadable member
    pub fn is_malformed(&self) -> bool {
        self.cursor.malformed
    }
}

impl<'a> Iterator for Members<'a> {
    type Item = (&'a [u8], Node<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let buf = self.cursor.buf;
        let pos = self.cursor.next_child()?;
        if buf[pos] != b'"' {
            return self.cursor.stop();
        }
        let Some(key_end) = string_end(buf, pos) else {
            return self.cursor.stop();
        };
        let colon = skip_ws(buf, key_end);
        if buf.get(colon) != Some(&b':') {
            return self.cursor.stop();
        }
        let value_pos = skip_ws(buf, colon + 1);
        let value = self.cursor.value(value_pos)?;
        Some((&buf[pos + 1..key_end - 1], value))
    }
}

/// Iterator over the elements of an array node
#[derive(Clone)]
pub struct Elements<'a> {
    cursor: Cursor<'a>,
}

impl Elements<'_> {
    /// Check if iteration ended at an unreadable element
    pub fn is_malformed(&self) -> bool {
        self.cursor.malformed
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.cursor.next_child()?;
        self.cursor.value(pos)
    }
}
