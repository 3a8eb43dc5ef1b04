//! Boundary between the directive core and a host parser.
//!
//! A host exposes its mutable parse state through these traits. Handlers get
//! the state as `&mut dyn BlockHost` or `&mut dyn InlineHost` and never see
//! the concrete host type.

use std::fmt;

use crate::error::DirectiveResult;
use crate::token::{Nesting, Token};

/// Per-parse environment shared by all rules and handlers of one parse.
pub type Env = serde_json::Map<String, serde_json::Value>;

/// Tag describing the block context currently being tokenized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ParentType {
    /// Top level of the document.
    #[default]
    Root,
    Blockquote,
    List,
    Paragraph,
    /// Body of a directive, e.g. `directive` or `note-directive`.
    Directive(String),
}

impl ParentType {
    /// Generic directive body tag.
    #[must_use]
    pub fn directive() -> Self {
        Self::Directive("directive".to_owned())
    }

    /// Body tag of a named directive: `<name>-directive`.
    #[must_use]
    pub fn directive_body(name: &str) -> Self {
        Self::Directive(format!("{name}-directive"))
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Blockquote => f.write_str("blockquote"),
            Self::List => f.write_str("list"),
            Self::Paragraph => f.write_str("paragraph"),
            Self::Directive(name) => f.write_str(name),
        }
    }
}

/// Token output and environment shared by block and inline state.
pub trait TokenSink {
    /// Append a token to the current output sequence and return it for
    /// further field writes.
    fn push(&mut self, kind: &str, tag: &str, nesting: Nesting) -> &mut Token;

    /// Number of tokens in the current output sequence.
    fn token_count(&self) -> usize;

    fn env(&self) -> &Env;

    fn env_mut(&mut self) -> &mut Env;
}

/// Block-level parse state.
pub trait BlockHost: TokenSink {
    /// Line the block pass is currently at.
    fn line(&self) -> usize;

    fn set_line(&mut self, line: usize);

    /// Exclusive upper line bound of the current pass.
    fn line_max(&self) -> usize;

    fn set_line_max(&mut self, line_max: usize);

    fn parent_type(&self) -> &ParentType;

    fn set_parent_type(&mut self, parent_type: ParentType);

    /// Run the full block rule pipeline over `start_line..end_line`.
    fn tokenize_block(&mut self, start_line: usize, end_line: usize) -> DirectiveResult<()>;
}

/// Inline parse state of one inline carrier.
pub trait InlineHost: TokenSink {
    /// Byte offset the inline pass is currently at.
    fn pos(&self) -> usize;

    fn set_pos(&mut self, pos: usize);

    /// Exclusive upper byte bound of the current pass.
    fn pos_max(&self) -> usize;

    fn set_pos_max(&mut self, pos_max: usize);

    /// Run the full inline rule pipeline from `pos` to `pos_max`.
    fn tokenize_inline(&mut self) -> DirectiveResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_type_display() {
        assert_eq!(ParentType::Root.to_string(), "root");
        assert_eq!(ParentType::directive().to_string(), "directive");
        assert_eq!(
            ParentType::directive_body("note").to_string(),
            "note-directive"
        );
    }
}
