//! Byte-level scanning primitives
//!
//! All positions are absolute indexes into the scanned buffer. Callers bound a
//! scan by slicing the buffer to the enclosing value's end, never by copying.

use super::node::NodeKind;

/// JSON insignificant whitespace
#[inline]
pub(crate) fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t')
}

/// First non-whitespace position at or after `i`
#[inline]
pub(crate) fn skip_ws(buf: &[u8], mut i: usize) -> usize {
    while i < buf.len() && is_ws(buf[i]) {
        i += 1;
    }
    i
}

/// Kind of the value starting with byte `b`
#[inline]
pub(crate) fn classify(b: u8) -> NodeKind {
    match b {
        b'{' => NodeKind::Object,
        b'[' => NodeKind::Array,
        b'"' => NodeKind::String,
        b't' | b'f' => NodeKind::Bool,
        b'n' => NodeKind::Null,
        b'-' | b'0'..=b'9' => NodeKind::Number,
        _ => NodeKind::Invalid,
    }
}

/// End (exclusive) of the value of `kind` starting at `start`
///
/// Returns `None` when the value is unterminated within `buf`.
pub(crate) fn value_end(buf: &[u8], start: usize, kind: NodeKind) -> Option<usize> {
    match kind {
        NodeKind::Object | NodeKind::Array => container_end(buf, start),
        NodeKind::String => string_end(buf, start),
        NodeKind::Number | NodeKind::Bool | NodeKind::Null => {
            let end = scalar_end(buf, start);
            (end > start).then_some(end)
        }
        NodeKind::Invalid => None,
    }
}

/// End of the string whose opening quote is at `start`
pub(crate) fn string_end(buf: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < buf.len() {
        match buf[i] {
            b'"' => return Some(i + 1),
            b'\\' => i += 2,
            _ => i += 1,
        }
    }
    None
}

/// End of the object or array whose opening delimiter is at `start`
///
/// Delimiters inside strings are not counted.
fn container_end(buf: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < buf.len() {
        match buf[i] {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            b'"' => {
                i = string_end(buf, i)?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// End of a number or literal: the next delimiter or whitespace
fn scalar_end(buf: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < buf.len() {
        match buf[i] {
            b',' | b'}' | b']' => break,
            b if is_ws(b) => break,
            _ => i += 1,
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_ws() {
        assert_eq!(skip_ws(b"  \n\t x", 0), 5);
        assert_eq!(skip_ws(b"   ", 0), 3);
        assert_eq!(skip_ws(b"x", 0), 0);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(b'{'), NodeKind::Object);
        assert_eq!(classify(b'['), NodeKind::Array);
        assert_eq!(classify(b'"'), NodeKind::String);
        assert_eq!(classify(b'-'), NodeKind::Number);
        assert_eq!(classify(b'7'), NodeKind::Number);
        assert_eq!(classify(b't'), NodeKind::Bool);
        assert_eq!(classify(b'n'), NodeKind::Null);
        assert_eq!(classify(b'x'), NodeKind::Invalid);
    }

    #[test]
    fn test_container_end_skips_strings() {
        let buf = br#"{"a":"}]","b":[1,{"c":2}]} tail"#;
        assert_eq!(value_end(buf, 0, NodeKind::Object), Some(26));
    }

    #[test]
    fn test_string_end_escapes() {
        let buf = br#""a\"b\\" rest"#;
        assert_eq!(string_end(buf, 0), Some(8));
        assert_eq!(string_end(br#""open"#, 0), None);
    }

    #[test]
    fn test_scalar_end() {
        assert_eq!(value_end(b"123,", 0, NodeKind::Number), Some(3));
        assert_eq!(value_end(b"true }", 0, NodeKind::Bool), Some(4));
        assert_eq!(value_end(b"-1.5e3", 0, NodeKind::Number), Some(6));
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(value_end(b"[1,2", 0, NodeKind::Array), None);
        assert_eq!(value_end(b"{]}", 0, NodeKind::Object), Some(2));
        assert_eq!(value_end(b"x", 0, NodeKind::Invalid), None);
    }
}
