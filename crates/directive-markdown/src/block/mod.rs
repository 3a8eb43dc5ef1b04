//! Block pass: splits the source into block tokens.
//!
//! Block rules run line by line. Paragraphs and headings emit `inline`
//! carrier tokens whose children are filled by the inline pass afterwards.

mod directive;
mod rules;
mod state;

use directive_core::DirectiveResult;

use crate::ruler::Ruler;

pub(crate) use directive::RULE_NAME as DIRECTIVE_RULE;
pub(crate) use state::BlockState;

/// Block rule: `(state, start_line, end_line, silent) -> matched`.
pub(crate) type BlockRule =
    fn(&mut BlockState<'_>, usize, usize, bool) -> DirectiveResult<bool>;

/// Ordered block rules and the tokenize loop.
pub(crate) struct BlockParser {
    pub ruler: Ruler<BlockRule>,
}

impl BlockParser {
    pub(crate) fn new() -> Self {
        let mut ruler: Ruler<BlockRule> = Ruler::new();
        ruler.push("fence", rules::fence, &["paragraph"]);
        ruler.push(DIRECTIVE_RULE, directive::directive, &["paragraph"]);
        ruler.push("blockquote", rules::blockquote, &["paragraph"]);
        ruler.push("hr", rules::hr, &["paragraph"]);
        ruler.push("list", rules::list, &["paragraph"]);
        ruler.push("heading", rules::heading, &["paragraph"]);
        ruler.push("paragraph", rules::paragraph, &[]);
        Self { ruler }
    }

    /// Run the rules over `start_line..end_line`.
    ///
    /// Stops early at a line indented less than the current container's
    /// content, and skips the rest of the range once the nesting limit is
    /// reached.
    pub(crate) fn tokenize(
        &self,
        state: &mut BlockState<'_>,
        start_line: usize,
        end_line: usize,
    ) -> DirectiveResult<()> {
        let max_nesting = state.md.options.max_nesting;
        let mut line = start_line;
        let mut has_empty_lines = false;

        while line < end_line {
            line = state.skip_empty_lines(line);
            state.line = line;
            if line >= end_line || state.lines[line].indent < state.blk_indent {
                break;
            }

            if state.level >= max_nesting {
                tracing::debug!(
                    level = state.level,
                    line,
                    end = end_line,
                    "Nesting limit reached, skipping block range"
                );
                state.line = end_line;
                break;
            }

            let mut matched = false;
            for rule in self.ruler.rules() {
                if rule(state, line, end_line, false)? {
                    debug_assert!(state.line > line, "block rule did not advance");
                    matched = true;
                    break;
                }
            }
            // paragraph matches any non-blank line
            if !matched {
                break;
            }

            state.tight = !has_empty_lines;
            line = state.line;

            if line > 0 && state.is_empty(line - 1) {
                has_empty_lines = true;
            }
            if line < end_line && state.is_empty(line) {
                has_empty_lines = true;
                line += 1;
                state.line = line;
            }
        }

        Ok(())
    }
}
