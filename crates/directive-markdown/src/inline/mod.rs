//! Inline pass: tokenizes the content of `inline` carrier tokens.

mod directive;
mod rules;
mod state;

use directive_core::{DirectiveResult, Env, Token};

use crate::MarkdownParser;
use crate::ruler::Ruler;

pub(crate) use directive::RULE_NAME as DIRECTIVE_RULE;
pub(crate) use state::InlineState;

/// Inline rule: `state -> matched`. A matching rule advances `pos`.
pub(crate) type InlineRule = fn(&mut InlineState<'_>) -> DirectiveResult<bool>;

/// Ordered inline rules and the tokenize loop.
pub(crate) struct InlineParser {
    pub ruler: Ruler<InlineRule>,
}

impl InlineParser {
    pub(crate) fn new() -> Self {
        let mut ruler: Ruler<InlineRule> = Ruler::new();
        ruler.push("text", rules::text, &[]);
        ruler.push("newline", rules::newline, &[]);
        ruler.push("escape", rules::escape, &[]);
        ruler.push("backticks", rules::backticks, &[]);
        ruler.push(DIRECTIVE_RULE, directive::directive, &[]);
        ruler.push("emphasis", rules::emphasis, &[]);
        Self { ruler }
    }

    /// Run the rules from `state.pos` to `state.pos_max`.
    ///
    /// Characters no rule matches become text. Past the nesting limit every
    /// character is text.
    pub(crate) fn tokenize(&self, state: &mut InlineState<'_>) -> DirectiveResult<()> {
        let max_nesting = state.md.options.max_nesting;

        while state.pos < state.pos_max {
            let pos = state.pos;
            let mut matched = false;
            if state.level < max_nesting {
                for rule in self.ruler.rules() {
                    if rule(state)? {
                        debug_assert!(state.pos > pos, "inline rule did not advance");
                        matched = true;
                        break;
                    }
                }
            }

            if !matched {
                let Some(ch) = state.src[pos..].chars().next() else {
                    break;
                };
                state.pending.push(ch);
                state.pos = pos + ch.len_utf8();
            }
        }

        state.push_pending();
        Ok(())
    }
}

/// Tokenize one carrier's content into its children.
pub(crate) fn parse(src: &str, md: &MarkdownParser, env: &mut Env) -> DirectiveResult<Vec<Token>> {
    let mut state = InlineState::new(src, md, env);
    state.tokenize()?;
    Ok(state.tokens)
}
