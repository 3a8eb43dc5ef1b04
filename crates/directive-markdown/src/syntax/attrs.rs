//! Attribute group parsing.
//!
//! Parses `{#id .class key="value" key='value' key=value}` groups. Several
//! groups may follow each other; they merge into one attribute list.

use directive_core::DirectiveAttrs;

/// Parse consecutive attribute groups starting at `pos`.
///
/// With `allow_space`, whitespace between groups is skipped. Parsing stops at
/// the first malformed group, which is not consumed. Returns `None` if the
/// first group is missing or malformed, otherwise the merged attributes and
/// the offset just past the last consumed group.
pub(crate) fn parse_groups(
    src: &str,
    pos: usize,
    end: usize,
    allow_space: bool,
) -> Option<(DirectiveAttrs, usize)> {
    let mut attrs = DirectiveAttrs::new();
    let mut consumed = parse_group(src, pos, end, &mut attrs)?;

    loop {
        let next = if allow_space {
            skip_spaces(src.as_bytes(), consumed, end)
        } else {
            consumed
        };
        let mut group = attrs.clone();
        match parse_group(src, next, end, &mut group) {
            Some(after) => {
                attrs = group;
                consumed = after;
            }
            None => return Some((attrs, consumed)),
        }
    }
}

/// Parse one `{...}` group into `attrs`.
///
/// Returns the offset just past the closing brace. `attrs` may be partially
/// updated when `None` is returned.
fn parse_group(src: &str, pos: usize, end: usize, attrs: &mut DirectiveAttrs) -> Option<usize> {
    let bytes = src.as_bytes();
    if pos >= end || bytes[pos] != b'{' {
        return None;
    }

    let mut i = pos + 1;
    loop {
        i = skip_whitespace(bytes, i, end);
        if i >= end {
            return None;
        }

        match bytes[i] {
            b'}' => return Some(i + 1),
            b'#' => {
                let (id, next) = word(src, i + 1, end)?;
                attrs.insert("id", id);
                i = next;
            }
            b'.' => {
                let (class, next) = word(src, i + 1, end)?;
                let merged = match attrs.get("class") {
                    Some(existing) => format!("{existing} {class}"),
                    None => class.to_owned(),
                };
                attrs.insert("class", merged);
                i = next;
            }
            _ => {
                let (key, value, next) = key_value(src, i, end)?;
                attrs.insert(key, value);
                i = next;
            }
        }
    }
}

/// Read an id or class word: up to whitespace, `.`, `#` or `}`.
fn word(src: &str, pos: usize, end: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut i = pos;
    while i < end && !matches!(bytes[i], b'.' | b'#' | b'}') && !bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    (i > pos).then(|| (&src[pos..i], i))
}

/// Parse `key="value"`, `key='value'` or `key=value`.
///
/// A bare key without `=` is not valid attribute syntax.
fn key_value(src: &str, pos: usize, end: usize) -> Option<(&str, &str, usize)> {
    let bytes = src.as_bytes();
    let mut i = pos;
    while i < end && is_key_byte(bytes[i]) {
        i += 1;
    }
    if i == pos || i >= end || bytes[i] != b'=' {
        return None;
    }
    let key = &src[pos..i];
    i += 1;

    if i < end && (bytes[i] == b'"' || bytes[i] == b'\'') {
        let quote = bytes[i];
        let start = i + 1;
        let close = start + bytes[start..end].iter().position(|&b| b == quote)?;
        return Some((key, &src[start..close], close + 1));
    }

    let start = i;
    while i < end && bytes[i] != b'}' && !bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    (i > start).then(|| (key, &src[start..i], i))
}

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

fn skip_whitespace(bytes: &[u8], mut i: usize, end: usize) -> usize {
    while i < end && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Skip spaces and tabs only; attribute groups never span a line break
/// between groups.
pub(crate) fn skip_spaces(bytes: &[u8], mut i: usize, end: usize) -> usize {
    while i < end && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    i
}
