//! Number literal parsing
//!
//! Integer literals are accumulated digit by digit and fail on `i64`
//! overflow instead of wrapping. Everything else goes through the standard
//! float parser.

/// Check if a number literal is an integer
///
/// A literal is an integer iff it has no `.`, `e`, `E` or `+`, and `-`
/// appears at most as its first byte.
pub fn is_integer_literal(raw: &[u8]) -> bool {
    raw.iter()
        .enumerate()
        .all(|(i, &c)| !matches!(c, b'.' | b'e' | b'E' | b'+') && (c != b'-' || i == 0))
}

/// Parse an integer literal, failing on overflow or stray bytes
pub fn parse_i64(raw: &[u8]) -> Option<i64> {
    let (negative, digits) = match raw.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some(_) => (false, raw),
        None => return None,
    };
    if digits.is_empty() {
        return None;
    }

    // Accumulate on the negative side so i64::MIN is representable
    let mut n: i64 = 0;
    for &c in digits {
        let d = c.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_sub(i64::from(d))?;
    }
    if negative { Some(n) } else { n.checked_neg() }
}

/// Parse an unsigned integer literal, failing on overflow or stray bytes
pub fn parse_u64(raw: &[u8]) -> Option<u64> {
    if raw.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &c in raw {
        let d = c.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(u64::from(d))?;
    }
    Some(n)
}

/// Parse any JSON number literal as `f64`
///
/// Integer literals convert from their exact `i64` value when it fits.
pub fn parse_f64(raw: &[u8]) -> Option<f64> {
    if is_integer_literal(raw) {
        if let Some(n) = parse_i64(raw) {
            return Some(n as f64);
        }
    }
    if raw.is_empty()
        || !raw
            .iter()
            .all(|c| matches!(c, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    std::str::from_utf8(raw).ok()?.parse::<f64>().ok()
}
