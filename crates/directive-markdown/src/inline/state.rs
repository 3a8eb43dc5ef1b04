//! Inline parse state of one carrier's content.

use directive_core::{DirectiveResult, Env, InlineHost, Nesting, Token, TokenSink};

use crate::MarkdownParser;

/// Mutable state of the inline pass over one `inline` token's content.
pub(crate) struct InlineState<'a> {
    pub src: &'a str,
    pub md: &'a MarkdownParser,
    pub env: &'a mut Env,
    pub tokens: Vec<Token>,
    pub pos: usize,
    pub pos_max: usize,
    pub level: usize,
    /// Text accumulated since the last token, flushed as one `text` token.
    pub pending: String,
}

impl<'a> InlineState<'a> {
    pub(crate) fn new(src: &'a str, md: &'a MarkdownParser, env: &'a mut Env) -> Self {
        Self {
            src,
            md,
            env,
            tokens: Vec::new(),
            pos: 0,
            pos_max: src.len(),
            level: 0,
            pending: String::new(),
        }
    }

    pub(crate) fn byte(&self, pos: usize) -> Option<u8> {
        (pos < self.pos_max).then(|| self.src.as_bytes()[pos])
    }

    /// Flush pending text as a `text` token.
    pub(crate) fn push_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut token = Token::new("text", "", Nesting::SelfClosing);
        token.content = std::mem::take(&mut self.pending);
        token.level = self.level;
        self.tokens.push(token);
    }

    /// Run the inline rules from `pos` to `pos_max`.
    pub(crate) fn tokenize(&mut self) -> DirectiveResult<()> {
        let md = self.md;
        md.inline.tokenize(self)
    }
}

impl TokenSink for InlineState<'_> {
    fn push(&mut self, kind: &str, tag: &str, nesting: Nesting) -> &mut Token {
        self.push_pending();

        let mut token = Token::new(kind, tag, nesting);
        if nesting == Nesting::Close {
            self.level = self.level.saturating_sub(1);
        }
        token.level = self.level;
        if nesting == Nesting::Open {
            self.level += 1;
        }

        let index = self.tokens.len();
        self.tokens.push(token);
        &mut self.tokens[index]
    }

    fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn env(&self) -> &Env {
        &*self.env
    }

    fn env_mut(&mut self) -> &mut Env {
        &mut *self.env
    }
}

impl InlineHost for InlineState<'_> {
    fn pos(&self) -> usize {
        self.pos
    }

    fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn pos_max(&self) -> usize {
        self.pos_max
    }

    fn set_pos_max(&mut self, pos_max: usize) {
        self.pos_max = pos_max;
    }

    fn tokenize_inline(&mut self) -> DirectiveResult<()> {
        self.tokenize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_flushes_pending() {
        let md = MarkdownParser::new();
        let mut env = Env::new();
        let mut state = InlineState::new("", &md, &mut env);

        state.pending.push_str("before");
        state.push("em_open", "em", Nesting::Open);
        state.pending.push_str("inner");
        state.push("em_close", "em", Nesting::Close);
        state.push_pending();

        let summary: Vec<(&str, &str, usize)> = state
            .tokens
            .iter()
            .map(|t| (t.kind.as_str(), t.content.as_str(), t.level))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("text", "before", 0),
                ("em_open", "", 0),
                ("text", "inner", 1),
                ("em_close", "", 0),
            ]
        );
        assert!(state.tokens.iter().all(|t| !t.block));
    }

    #[test]
    fn test_byte_respects_bound() {
        let md = MarkdownParser::new();
        let mut env = Env::new();
        let mut state = InlineState::new("abc", &md, &mut env);
        state.pos_max = 2;
        assert_eq!(state.byte(1), Some(b'b'));
        assert_eq!(state.byte(2), None);
    }
}
