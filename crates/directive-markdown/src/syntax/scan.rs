//! Directive occurrence scanning.
//!
//! Recognizes `:name[content](dests){attrs}` inside inline text and
//! `::name` / `:::name` headers at block level. Every optional part is
//! recorded only if it was written, so `:dir` and `:dir{}` produce different
//! records.

use directive_core::raw::{RawDest, RawInlineDirective, RawInlineSlice};

use super::attrs::{parse_groups, skip_spaces};
use super::fence::FenceTracker;

/// Header of a block directive occurrence, without its body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    /// Number of leading colons; 2 for leaf blocks, 3 or more for containers.
    pub colons: usize,
    pub name: String,
    pub attrs: Option<Vec<(String, String)>>,
    pub dests: Option<Vec<RawDest>>,
    pub inline_content: Option<RawInlineSlice>,
}

/// Optional parts following a directive name.
#[derive(Default)]
struct Parts {
    content: Option<RawInlineSlice>,
    dests: Option<Vec<RawDest>>,
    attrs: Option<Vec<(String, String)>>,
}

/// Scan an inline directive starting at the colon at `pos`.
///
/// Offsets in the result are absolute offsets into `src`.
pub(crate) fn scan_inline(src: &str, pos: usize, end: usize) -> Option<RawInlineDirective> {
    let bytes = src.as_bytes();
    if pos >= end || bytes[pos] != b':' {
        return None;
    }

    let name_end = name_end(bytes, pos + 1, end);
    if name_end == pos + 1 {
        return None;
    }

    let (parts, directive_end) = scan_parts(src, name_end, end, false);

    Some(RawInlineDirective {
        name: src[pos + 1..name_end].to_owned(),
        directive_start: pos,
        directive_end,
        attrs: parts.attrs,
        dests: parts.dests,
        content: parts.content,
    })
}

/// Scan a block directive header spanning `src[start..end]`.
///
/// `start` must point at the first non-space character of the line. The
/// header has to consume the whole line except trailing whitespace. Spaces
/// are allowed after the colons and between the parts.
pub(crate) fn scan_block_header(src: &str, start: usize, end: usize) -> Option<BlockHeader> {
    let bytes = src.as_bytes();
    let colons = colon_run(bytes, start, end);
    if colons < 2 {
        return None;
    }

    let name_start = skip_spaces(bytes, start + colons, end);
    let name_end = name_end(bytes, name_start, end);
    if name_end == name_start {
        return None;
    }

    let (parts, consumed) = scan_parts(src, name_end, end, true);
    if !src[consumed..end].trim().is_empty() {
        return None;
    }

    Some(BlockHeader {
        colons,
        name: src[name_start..name_end].to_owned(),
        attrs: parts.attrs,
        dests: parts.dests,
        inline_content: parts.content,
    })
}

/// Colon count of a closing fence line: three or more colons and nothing
/// else but whitespace.
pub(crate) fn closing_fence(text: &str) -> Option<usize> {
    let colons = colon_run(text.as_bytes(), 0, text.len());
    (colons >= 3 && text[colons..].trim().is_empty()).then_some(colons)
}

/// Find the line closing a container opened with `colons` colons.
///
/// `lines` yields the text of each following line with indentation stripped.
/// Lines inside code fences are skipped. Nested containers are balanced: a
/// closing fence first closes the innermost open nested container it is
/// long enough for. Returns the index of the closing line within `lines`.
pub(crate) fn find_closing<'s>(
    lines: impl IntoIterator<Item = &'s str>,
    colons: usize,
) -> Option<usize> {
    let mut fences = FenceTracker::new();
    let mut nested: Vec<usize> = Vec::new();

    for (index, text) in lines.into_iter().enumerate() {
        if fences.update(text) || fences.in_fence() {
            continue;
        }

        if let Some(count) = closing_fence(text) {
            match nested.last() {
                Some(&inner) if count >= inner => {
                    nested.pop();
                }
                Some(_) => {}
                None if count >= colons => return Some(index),
                None => {}
            }
            continue;
        }

        if let Some(header) = scan_block_header(text, 0, text.len())
            && header.colons >= 3
        {
            nested.push(header.colons);
        }
    }

    None
}

fn scan_parts(src: &str, pos: usize, end: usize, allow_space: bool) -> (Parts, usize) {
    let bytes = src.as_bytes();
    let mut parts = Parts::default();
    let mut consumed = pos;

    let gap = |at: usize| {
        if allow_space {
            skip_spaces(bytes, at, end)
        } else {
            at
        }
    };

    let at = gap(consumed);
    if let Some((slice, next)) = parse_label(src, at, end) {
        parts.content = Some(slice);
        consumed = next;
    }

    let at = gap(consumed);
    if let Some((dests, next)) = parse_dests(src, at, end) {
        parts.dests = Some(dests);
        consumed = next;
    }

    let at = gap(consumed);
    if let Some((attrs, next)) = parse_groups(src, at, end, allow_space) {
        parts.attrs = Some(attrs.to_pairs());
        consumed = next;
    }

    (parts, consumed)
}

fn colon_run(bytes: &[u8], start: usize, end: usize) -> usize {
    bytes[start..end].iter().take_while(|&&b| b == b':').count()
}

fn name_end(bytes: &[u8], mut i: usize, end: usize) -> usize {
    while i < end && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b'_') {
        i += 1;
    }
    i
}

/// Parse `[content]` with balanced brackets and backslash escapes.
fn parse_label(src: &str, pos: usize, end: usize) -> Option<(RawInlineSlice, usize)> {
    let bytes = src.as_bytes();
    if pos >= end || bytes[pos] != b'[' {
        return None;
    }

    let mut depth = 0usize;
    let mut i = pos;
    while i < end {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    let slice = RawInlineSlice {
                        text: src[pos + 1..i].to_owned(),
                        start: pos + 1,
                        end: i,
                    };
                    return Some((slice, i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Parse `(dests)`: whitespace separated items, quoted items are strings and
/// everything else is a link.
fn parse_dests(src: &str, pos: usize, end: usize) -> Option<(Vec<RawDest>, usize)> {
    let bytes = src.as_bytes();
    if pos >= end || bytes[pos] != b'(' {
        return None;
    }

    let mut dests = Vec::new();
    let mut i = pos + 1;
    loop {
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= end {
            return None;
        }

        match bytes[i] {
            b')' => return Some((dests, i + 1)),
            b'"' | b'\'' => {
                let (value, next) = quoted(src, i, end)?;
                dests.push(RawDest::string(value));
                i = next;
            }
            b'<' => {
                let close = i + bytes[i..end].iter().position(|&b| b == b'>')?;
                if src[i..close].contains('\n') {
                    return None;
                }
                dests.push(RawDest::link(&src[i + 1..close]));
                i = close + 1;
            }
            _ => {
                let (value, next) = link(src, i, end)?;
                dests.push(RawDest::link(value));
                i = next;
            }
        }

        if i < end && !bytes[i].is_ascii_whitespace() && bytes[i] != b')' {
            return None;
        }
    }
}

/// Quoted string starting at the quote at `pos`; backslash escapes the next
/// character.
fn quoted(src: &str, pos: usize, end: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let quote = bytes[pos];
    let mut value = String::new();
    let mut run_start = pos + 1;
    let mut i = pos + 1;

    while i < end {
        match bytes[i] {
            b'\\' if i + 1 < end && bytes[i + 1].is_ascii_punctuation() => {
                value.push_str(&src[run_start..i]);
                run_start = i + 1;
                i += 2;
            }
            b if b == quote => {
                value.push_str(&src[run_start..i]);
                return Some((value, i + 1));
            }
            _ => i += 1,
        }
    }

    None
}

/// Unquoted link: up to whitespace or an unbalanced `)`.
fn link(src: &str, pos: usize, end: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = pos;

    while i < end {
        match bytes[i] {
            b'\\' if i + 1 < end => i += 1,
            b'(' => depth += 1,
            b')' if depth == 0 => break,
            b')' => depth -= 1,
            b if b.is_ascii_whitespace() => break,
            _ => {}
        }
        i += 1;
    }

    (depth == 0 && i > pos).then(|| (&src[pos..i], i))
}
