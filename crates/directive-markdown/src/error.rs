//! Error types for parsing.

use directive_core::DirectiveError;

/// Error returned by [`MarkdownParser::parse`](crate::MarkdownParser::parse).
///
/// A failed parse produces no tokens.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A directive handler or match predicate failed.
    #[error(transparent)]
    Directive(#[from] DirectiveError),
}
