//! Quote-aware string escaping.
//!
//! Used when rendering string literals inside paths (`['a b']`), scripts
//! (`'x'`) and JSON output (`"x"`). Escapes are the ones the parser reads
//! back, so rendering then parsing gives back the same string.

// Byte classes: '.' passes through, 'u' becomes \u00XX, 'o' starts a
// multi-byte sequence, anything else is the letter written after a backslash.
const CLASS: [u8; 256] = build_class_table();

const fn build_class_table() -> [u8; 256] {
    let mut table = [b'.'; 256];
    let mut i = 0;
    while i < 0x20 {
        table[i] = b'u';
        i += 1;
    }
    table[0x08] = b'b';
    table[0x09] = b't';
    table[0x0a] = b'n';
    table[0x0c] = b'f';
    table[0x0d] = b'r';
    table[b'"' as usize] = b'"';
    table[b'\'' as usize] = b'\'';
    table[b'/' as usize] = b'/';
    table[b'\\' as usize] = b'\\';
    let mut i = 0x80;
    while i < 0x100 {
        table[i] = b'o';
        i += 1;
    }
    table
}

/// Appends `s` wrapped in `quote`, escaping control characters, backslash,
/// the quote character itself, U+2028 and U+2029.
///
/// `"`, `'` and `/` are only escaped when they are the quote.
///
/// # Examples
///
/// ```
/// use jsonpath_engine::encode::append_string;
///
/// let mut buf = String::new();
/// append_string(&mut buf, "it's\n", '\'');
/// assert_eq!(buf, r"'it\'s\n'");
/// ```
pub fn append_string(buf: &mut String, s: &str, quote: char) {
    buf.push(quote);
    escape_into(buf, s, quote);
    buf.push(quote);
}

/// Like [`append_string`] but accepts arbitrary bytes. Invalid UTF-8
/// sequences are replaced with U+FFFD.
pub fn append_bytes(buf: &mut String, bytes: &[u8], quote: char) {
    buf.push(quote);
    for chunk in bytes.utf8_chunks() {
        escape_into(buf, chunk.valid(), quote);
        if !chunk.invalid().is_empty() {
            buf.push(char::REPLACEMENT_CHARACTER);
        }
    }
    buf.push(quote);
}

fn escape_into(buf: &mut String, s: &str, quote: char) {
    let bytes = s.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match CLASS[b as usize] {
            b'.' => i += 1,
            b'o' => {
                let Some(c) = s[i..].chars().next() else {
                    break;
                };
                let width = c.len_utf8();
                if c == '\u{2028}' || c == '\u{2029}' {
                    buf.push_str(&s[start..i]);
                    buf.push_str(&format!("\\u{:04x}", c as u32));
                    start = i + width;
                }
                i += width;
            }
            b'u' => {
                buf.push_str(&s[start..i]);
                buf.push_str(&format!("\\u{:04x}", b));
                i += 1;
                start = i;
            }
            esc => {
                if matches!(b, b'"' | b'\'' | b'/') && char::from(b) != quote {
                    i += 1;
                    continue;
                }
                buf.push_str(&s[start..i]);
                buf.push('\\');
                buf.push(char::from(esc));
                i += 1;
                start = i;
            }
        }
    }
    buf.push_str(&s[start..]);
}

/// Appends a float so that it reads back as a float (`2.0`, `1e21`).
pub fn append_float(buf: &mut String, f: f64) {
    buf.push_str(&format!("{:?}", f));
}
