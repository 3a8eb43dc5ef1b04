//! Inline rules.

use directive_core::{DirectiveResult, InlineScope, Nesting, TokenSink};

use super::state::InlineState;

/// Bytes that may start some inline construct. Runs of anything else are
/// plain text.
fn is_terminator(b: u8) -> bool {
    matches!(
        b,
        b'\n'
            | b'!'
            | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'*'
            | b'+'
            | b'-'
            | b':'
            | b'<'
            | b'='
            | b'>'
            | b'@'
            | b'['
            | b'\\'
            | b']'
            | b'^'
            | b'_'
            | b'`'
            | b'{'
            | b'}'
            | b'~'
    )
}

/// Plain text run.
pub(crate) fn text(state: &mut InlineState<'_>) -> DirectiveResult<bool> {
    let bytes = state.src.as_bytes();
    let start = state.pos;
    let mut pos = start;
    while pos < state.pos_max && !is_terminator(bytes[pos]) {
        pos += 1;
    }
    if pos == start {
        return Ok(false);
    }

    state.pending.push_str(&state.src[start..pos]);
    state.pos = pos;
    Ok(true)
}

/// Line break: soft, or hard after two trailing spaces.
pub(crate) fn newline(state: &mut InlineState<'_>) -> DirectiveResult<bool> {
    if state.byte(state.pos) != Some(b'\n') {
        return Ok(false);
    }

    let trimmed = state.pending.trim_end_matches(' ');
    let hard = state.pending.len() - trimmed.len() >= 2;
    state.pending.truncate(trimmed.len());

    if hard {
        state.push("hardbreak", "br", Nesting::SelfClosing);
    } else {
        state.push("softbreak", "br", Nesting::SelfClosing);
    }

    state.pos = skip_spaces(state, state.pos + 1);
    Ok(true)
}

/// Backslash escape of ASCII punctuation, or a hard break before a newline.
pub(crate) fn escape(state: &mut InlineState<'_>) -> DirectiveResult<bool> {
    if state.byte(state.pos) != Some(b'\\') {
        return Ok(false);
    }

    match state.byte(state.pos + 1) {
        Some(b'\n') => {
            state.push("hardbreak", "br", Nesting::SelfClosing);
            state.pos = skip_spaces(state, state.pos + 2);
        }
        Some(b) if b.is_ascii_punctuation() => {
            state.pending.push(char::from(b));
            state.pos += 2;
        }
        _ => {
            state.pending.push('\\');
            state.pos += 1;
        }
    }
    Ok(true)
}

/// Code span delimited by equal backtick runs.
pub(crate) fn backticks(state: &mut InlineState<'_>) -> DirectiveResult<bool> {
    if state.byte(state.pos) != Some(b'`') {
        return Ok(false);
    }

    let start = state.pos;
    let opener = run_length(state, start, b'`');
    let content_start = start + opener;

    let mut pos = content_start;
    while pos < state.pos_max {
        if state.byte(pos) != Some(b'`') {
            pos += 1;
            continue;
        }
        let closer = run_length(state, pos, b'`');
        if closer == opener {
            let content = code_content(&state.src[content_start..pos]);
            let token = state.push("code_inline", "code", Nesting::SelfClosing);
            token.content = content;
            token.markup = "`".repeat(opener);
            state.pos = pos + closer;
            return Ok(true);
        }
        pos += closer;
    }

    // unmatched run is literal
    state.pending.push_str(&state.src[start..content_start]);
    state.pos = content_start;
    Ok(true)
}

fn code_content(raw: &str) -> String {
    let content = raw.replace('\n', " ");
    let stripped = content
        .strip_prefix(' ')
        .and_then(|rest| rest.strip_suffix(' '));
    match stripped {
        Some(inner) if !content.bytes().all(|b| b == b' ') => inner.to_owned(),
        _ => content,
    }
}

/// Emphasis `*a*` `_a_`, strong `**a**` `__a__` and strikethrough `~~a~~`.
///
/// The closing run must have the same length as the opening one. Content
/// between the runs is tokenized with the full inline rule set.
pub(crate) fn emphasis(state: &mut InlineState<'_>) -> DirectiveResult<bool> {
    let Some(marker @ (b'*' | b'_' | b'~')) = state.byte(state.pos) else {
        return Ok(false);
    };

    let start = state.pos;
    let len = run_length(state, start, marker);
    let (kind, tag) = match (marker, len) {
        (b'~', 2) => ("s", "s"),
        (b'*' | b'_', 1) => ("em", "em"),
        (b'*' | b'_', 2) => ("strong", "strong"),
        _ => return Ok(false),
    };

    if !can_open(state, start, len, marker) {
        return Ok(false);
    }
    let Some(close) = find_closer(state, start + len, marker, len) else {
        return Ok(false);
    };

    let markup = state.src[start..start + len].to_owned();
    state.push(&format!("{kind}_open"), tag, Nesting::Open).markup.clone_from(&markup);
    {
        let mut scope = InlineScope::enter(&mut *state);
        scope.pos = start + len;
        scope.pos_max = close;
        scope.tokenize()?;
    }
    state.push(&format!("{kind}_close"), tag, Nesting::Close).markup = markup;

    state.pos = close + len;
    Ok(true)
}

fn can_open(state: &InlineState<'_>, start: usize, len: usize, marker: u8) -> bool {
    let Some(next) = state.byte(start + len) else {
        return false;
    };
    if next.is_ascii_whitespace() {
        return false;
    }
    // intraword underscores are literal
    marker != b'_' || start == 0 || !state.src.as_bytes()[start - 1].is_ascii_alphanumeric()
}

fn find_closer(state: &InlineState<'_>, from: usize, marker: u8, len: usize) -> Option<usize> {
    let bytes = state.src.as_bytes();
    let mut pos = from;
    while pos < state.pos_max {
        match bytes[pos] {
            b'\\' => pos += 2,
            b if b == marker => {
                let run = run_length(state, pos, marker);
                let after = state.byte(pos + run);
                let closes = run == len
                    && pos > from
                    && !bytes[pos - 1].is_ascii_whitespace()
                    && (marker != b'_' || !after.is_some_and(|b| b.is_ascii_alphanumeric()));
                if closes {
                    return Some(pos);
                }
                pos += run;
            }
            _ => pos += 1,
        }
    }
    None
}

fn run_length(state: &InlineState<'_>, start: usize, marker: u8) -> usize {
    let mut pos = start;
    while state.byte(pos) == Some(marker) {
        pos += 1;
    }
    pos - start
}

fn skip_spaces(state: &InlineState<'_>, mut pos: usize) -> usize {
    while state.byte(pos) == Some(b' ') {
        pos += 1;
    }
    pos
}
