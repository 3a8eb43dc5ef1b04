//! Inline directive rule: `:name[content](dests){attrs}`.

use directive_core::DirectiveResult;

use super::state::InlineState;
use crate::syntax::scan_inline;

/// Rule name used by the enable/disable toggles.
pub(crate) const RULE_NAME: &str = "directive_inline";

/// Recognize an inline directive at the cursor and dispatch it.
///
/// A `:` directly after another `:` never starts a directive, so `::x`
/// inside text stays literal.
pub(crate) fn directive(state: &mut InlineState<'_>) -> DirectiveResult<bool> {
    let md = state.md;
    let Some(registry) = md.registry.as_ref() else {
        return Ok(false);
    };
    if state.byte(state.pos) != Some(b':') {
        return Ok(false);
    }
    if state.pos > 0 && state.src.as_bytes()[state.pos - 1] == b':' {
        return Ok(false);
    }

    let Some(raw) = scan_inline(state.src, state.pos, state.pos_max) else {
        return Ok(false);
    };
    let start = state.pos;
    let end = raw.directive_end;
    tracing::trace!(
        name = %raw.name,
        start = raw.directive_start,
        end,
        "Inline directive occurrence"
    );

    if registry.dispatch_inline(state, raw)? {
        state.pos = end;
        Ok(true)
    } else {
        state.pos = start;
        Ok(false)
    }
}
