//! Block/inline token stream parser with directive syntax support.
//!
//! A small markdown-it style parser: paragraphs, headings, fenced code,
//! blockquotes, lists, thematic breaks, code spans, emphasis and breaks. It
//! recognizes `:name`, `::name` and `:::name` directive occurrences and hands
//! them to the handlers registered through [`MarkdownParser`].
//!
//! # Example
//!
//! ```
//! use directive_markdown::{
//!     ContainerDirectiveConfig, Env, InlineContentDesc, MarkdownParser, TokensDesc,
//! };
//!
//! let mut md = MarkdownParser::new();
//! md.register_block_config(
//!     ContainerDirectiveConfig::new("note", TokensDesc::new("note", "div"))
//!         .with_inline_content(InlineContentDesc::new(TokensDesc::new("note_title", "p"))),
//! )
//! .unwrap();
//!
//! let tokens = md.parse(":::note[Heads up]\nBody text.\n:::", &mut Env::new()).unwrap();
//! let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         "note_open",
//!         "note_title_open",
//!         "inline",
//!         "note_title_close",
//!         "paragraph_open",
//!         "inline",
//!         "paragraph_close",
//!         "note_close",
//!     ]
//! );
//! ```

mod block;
mod error;
mod inline;
mod options;
mod parser;
mod ruler;
mod syntax;

pub use directive_core::{
    BlockContent, BlockDirectiveConfig, BlockHost, CodeContainerDirectiveConfig,
    ContainerDirectiveConfig, ContainerParams, DestKind, DirectiveAttrs, DirectiveDests,
    DirectiveError, DirectiveKind, DirectiveRegistry, DirectiveResult, Env, InlineContent,
    InlineContentDesc, InlineHost, InlineParams, LeafBlockDirectiveConfig, LeafBlockParams,
    Nesting, ParentType, Token, TokenSink, TokensDesc, create_block_inline_token,
    tokenize_block_content, tokenize_inline_content,
};
pub use error::ParseError;
pub use options::{DEFAULT_MAX_NESTING, ParserOptions};
pub use parser::MarkdownParser;
