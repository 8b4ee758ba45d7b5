//! String escape decoding

/// Decode the escapes of a raw string body (the bytes between the quotes)
///
/// `\uXXXX` is decoded one code unit at a time; surrogate pairs are not
/// composed, so each surrogate half becomes U+FFFD. Unknown escapes keep the
/// escaped byte. Invalid UTF-8 is replaced lossily.
pub fn unescape(raw: &[u8]) -> String {
    if !raw.contains(&b'\\') {
        return String::from_utf8_lossy(raw).into_owned();
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let c = raw[i];
        i += 1;
        if c != b'\\' {
            out.push(c);
            continue;
        }
        let Some(&esc) = raw.get(i) else { break };
        i += 1;
        match esc {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'u' => {
                let ch = raw
                    .get(i..i + 4)
                    .and_then(decode_hex4)
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                i = (i + 4).min(raw.len());
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            other => out.push(other),
        }
    }

    match String::from_utf8(out) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn decode_hex4(hex: &[u8]) -> Option<u32> {
    hex.iter().try_fold(0u32, |acc, &c| {
        let digit = (c as char).to_digit(16)?;
        Some(acc << 4 | digit)
    })
}
