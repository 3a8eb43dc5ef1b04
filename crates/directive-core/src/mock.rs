//! Recording host used by the core's unit tests.

use crate::error::{DirectiveError, DirectiveResult};
use crate::host::{BlockHost, Env, InlineHost, ParentType, TokenSink};
use crate::params::BlockContent;
use crate::token::{Nesting, Token};
use crate::tokenize::tokenize_block_content;

/// State seen by the mock at the start of a nested tokenize call.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Observed {
    Block {
        line: usize,
        line_max: usize,
        parent_type: ParentType,
    },
    Inline {
        pos: usize,
        pos_max: usize,
    },
}

/// Host that records every tokenize call instead of parsing.
///
/// A block tokenize consumes all lines up to its end bound and pushes one
/// `body` token; an inline tokenize pushes one `text` token.
pub(crate) struct MockHost {
    pub tokens: Vec<Token>,
    pub env: Env,
    pub line: usize,
    pub line_max: usize,
    pub parent_type: ParentType,
    pub pos: usize,
    pub pos_max: usize,
    pub observed: Vec<Observed>,
    /// Bodies to recurse into from inside the next block tokenize calls.
    pub nested_blocks: Vec<BlockContent>,
    pub fail_on_tokenize: bool,
    pub fail_nested: bool,
    pub panic_on_tokenize: bool,
}

impl MockHost {
    pub(crate) fn new(line_max: usize) -> Self {
        Self {
            tokens: Vec::new(),
            env: Env::new(),
            line: 0,
            line_max,
            parent_type: ParentType::Root,
            pos: 0,
            pos_max: 0,
            observed: Vec::new(),
            nested_blocks: Vec::new(),
            fail_on_tokenize: false,
            fail_nested: false,
            panic_on_tokenize: false,
        }
    }

    pub(crate) fn kinds(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    fn check_failure(&self) -> DirectiveResult<()> {
        assert!(!self.panic_on_tokenize, "tokenize panicked");
        if self.fail_on_tokenize {
            return Err(DirectiveError::handler("mock", "tokenize failed"));
        }
        Ok(())
    }

    fn observe_block(&mut self) {
        self.observed.push(Observed::Block {
            line: self.line,
            line_max: self.line_max,
            parent_type: self.parent_type.clone(),
        });
    }
}

impl TokenSink for MockHost {
    fn push(&mut self, kind: &str, tag: &str, nesting: Nesting) -> &mut Token {
        self.tokens.push(Token::new(kind, tag, nesting));
        self.tokens.last_mut().unwrap()
    }

    fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn env(&self) -> &Env {
        &self.env
    }

    fn env_mut(&mut self) -> &mut Env {
        &mut self.env
    }
}

impl BlockHost for MockHost {
    fn line(&self) -> usize {
        self.line
    }

    fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    fn line_max(&self) -> usize {
        self.line_max
    }

    fn set_line_max(&mut self, line_max: usize) {
        self.line_max = line_max;
    }

    fn parent_type(&self) -> &ParentType {
        &self.parent_type
    }

    fn set_parent_type(&mut self, parent_type: ParentType) {
        self.parent_type = parent_type;
    }

    fn tokenize_block(&mut self, _start_line: usize, end_line: usize) -> DirectiveResult<()> {
        self.check_failure()?;
        self.observe_block();
        self.push("body", "", Nesting::SelfClosing);

        if let Some(inner) = self.nested_blocks.pop() {
            if self.fail_nested {
                self.fail_on_tokenize = true;
            }
            tokenize_block_content(self, &inner, Some(ParentType::directive_body("inner")))?;
            self.observe_block();
        }

        self.line = end_line;
        Ok(())
    }
}

impl InlineHost for MockHost {
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
        self.check_failure()?;
        self.observed.push(Observed::Inline {
            pos: self.pos,
            pos_max: self.pos_max,
        });
        self.push("text", "", Nesting::SelfClosing);
        self.pos = self.pos_max;
        Ok(())
    }
}
