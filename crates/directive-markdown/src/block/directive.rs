//! Block directive rule: `::name` leaf blocks and `:::name` containers.

use directive_core::DirectiveResult;
use directive_core::raw::{RawBlockDirective, RawBlockSlice};

use super::state::BlockState;
use crate::syntax::{find_closing, scan_block_header};

/// Rule name used by the enable/disable toggles.
pub(crate) const RULE_NAME: &str = "directive_block";

/// Recognize a block directive at `start_line` and dispatch it.
///
/// In silent mode the rule matches if the header is well-formed and a block
/// handler is registered for the name; no handler runs. A declined
/// occurrence leaves the line to the following rules.
pub(crate) fn directive(
    state: &mut BlockState<'_>,
    start_line: usize,
    end_line: usize,
    silent: bool,
) -> DirectiveResult<bool> {
    let md = state.md;
    let Some(registry) = md.registry.as_ref() else {
        return Ok(false);
    };
    if state.is_code_indented(start_line) {
        return Ok(false);
    }

    let marks = state.lines[start_line];
    let Some(header) = scan_block_header(state.src, marks.text, marks.end) else {
        return Ok(false);
    };
    if silent {
        return Ok(registry.has_block(&header.name));
    }

    let content = if header.colons >= 3 {
        let lines = (start_line + 1..end_line).map(|line| state.text(line));
        find_closing(lines, header.colons).map(|offset| {
            let close = start_line + 1 + offset;
            RawBlockSlice {
                text: state.get_lines(start_line + 1, close, state.blk_indent),
                start_line: start_line + 1,
                end_line: close,
            }
        })
    } else {
        None
    };

    let directive_end_line = content
        .as_ref()
        .map_or(start_line + 1, |content| content.end_line + 1);

    tracing::trace!(
        name = %header.name,
        start = start_line,
        end = directive_end_line,
        body = content.is_some(),
        "Block directive occurrence"
    );

    let raw = RawBlockDirective {
        name: header.name,
        directive_start_line: start_line,
        directive_end_line,
        attrs: header.attrs,
        dests: header.dests,
        inline_content: header.inline_content,
        content,
    };

    state.line = start_line;
    if registry.dispatch_block(state, raw)? {
        state.line = directive_end_line;
        Ok(true)
    } else {
        state.line = start_line;
        Ok(false)
    }
}
