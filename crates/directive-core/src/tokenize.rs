//! Reentrant sub-parsing of directive content.
//!
//! Handlers recurse into the host's own tokenizers over a sub-range of the
//! source. The host's cursor state is shared with the enclosing pass, so every
//! recursion runs inside a scope guard that puts the bounds back when it is
//! dropped: on normal return, on an early `?` return and during unwinding.

use std::ops::{Deref, DerefMut};

use crate::error::DirectiveResult;
use crate::host::{BlockHost, InlineHost, ParentType, TokenSink};
use crate::params::{BlockContent, InlineContent, LeafBlockParams};
use crate::token::{Nesting, Token};

/// Guard over a block host that restores `line_max` and `parent_type` on drop.
///
/// The line cursor is left alone: a nested pass moves it forward and the
/// enclosing pass continues from there.
///
/// # Example
///
/// ```ignore
/// let mut scope = BlockScope::enter(state);
/// scope.set_line_max(end);
/// scope.tokenize_block(start, end)?;
/// // bounds are restored here, when `scope` goes out of scope
/// ```
pub struct BlockScope<'h, H: BlockHost + ?Sized> {
    host: &'h mut H,
    line_max: usize,
    parent_type: ParentType,
}

impl<'h, H: BlockHost + ?Sized> BlockScope<'h, H> {
    /// Snapshot the host's bounds.
    pub fn enter(host: &'h mut H) -> Self {
        let line_max = host.line_max();
        let parent_type = host.parent_type().clone();
        Self {
            host,
            line_max,
            parent_type,
        }
    }
}

impl<H: BlockHost + ?Sized> Deref for BlockScope<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: BlockHost + ?Sized> DerefMut for BlockScope<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: BlockHost + ?Sized> Drop for BlockScope<'_, H> {
    fn drop(&mut self) {
        self.host.set_line_max(self.line_max);
        self.host
            .set_parent_type(std::mem::take(&mut self.parent_type));
    }
}

/// Guard over an inline host that restores `pos` and `pos_max` on drop.
pub struct InlineScope<'h, H: InlineHost + ?Sized> {
    host: &'h mut H,
    pos: usize,
    pos_max: usize,
}

impl<'h, H: InlineHost + ?Sized> InlineScope<'h, H> {
    /// Snapshot the host's cursor and bound.
    pub fn enter(host: &'h mut H) -> Self {
        let pos = host.pos();
        let pos_max = host.pos_max();
        Self { host, pos, pos_max }
    }
}

impl<H: InlineHost + ?Sized> Deref for InlineScope<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: InlineHost + ?Sized> DerefMut for InlineScope<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: InlineHost + ?Sized> Drop for InlineScope<'_, H> {
    fn drop(&mut self) {
        self.host.set_pos(self.pos);
        self.host.set_pos_max(self.pos_max);
    }
}

/// Tokenize an inline directive's content with the full inline rule set.
///
/// Uses the content's offsets into the source currently being parsed, not
/// its raw text. Tokens are appended to the current output.
pub fn tokenize_inline_content<H: InlineHost + ?Sized>(
    host: &mut H,
    content: &InlineContent,
) -> DirectiveResult<()> {
    tracing::trace!(
        start = content.start_pos,
        end = content.end_pos,
        "Tokenizing inline directive content"
    );

    let mut scope = InlineScope::enter(host);
    scope.set_pos(content.start_pos);
    scope.set_pos_max(content.end_pos);
    scope.tokenize_inline()
}

/// Tokenize a container body with the full block rule set.
///
/// `parent_type` tags the nested context; it defaults to
/// [`ParentType::directive`].
pub fn tokenize_block_content<H: BlockHost + ?Sized>(
    host: &mut H,
    content: &BlockContent,
    parent_type: Option<ParentType>,
) -> DirectiveResult<()> {
    let parent_type = parent_type.unwrap_or_else(ParentType::directive);
    tracing::trace!(
        start = content.start_line,
        end = content.end_line,
        parent = %parent_type,
        "Tokenizing directive body"
    );

    let mut scope = BlockScope::enter(host);
    scope.set_parent_type(parent_type);
    scope.set_line(content.start_line);
    scope.set_line_max(content.end_line);
    scope.tokenize_block(content.start_line, content.end_line)
}

/// Push an `inline` carrier token for a leaf block's inline content.
///
/// The carrier is not tokenized here; the host's inline pass fills its
/// children later, after the block pass completes.
pub fn create_block_inline_token<'h, H: TokenSink + ?Sized>(
    host: &'h mut H,
    params: &LeafBlockParams,
) -> &'h mut Token {
    let token = host.push("inline", "", Nesting::SelfClosing);
    token.children = Some(Vec::new());
    token.content = params
        .inline_content
        .as_ref()
        .map(|content| content.raw.clone())
        .unwrap_or_default();
    token.map = Some([params.start_line, params.start_line + 1]);
    token
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::mock::{MockHost, Observed};
    use pretty_assertions::assert_eq;

    fn body(start_line: usize, end_line: usize) -> BlockContent {
        BlockContent {
            raw: String::new(),
            start_line,
            end_line,
        }
    }

    #[test]
    fn test_block_content_restores_bounds() {
        let mut host = MockHost::new(10);
        host.line = 2;

        tokenize_block_content(&mut host, &body(3, 5), None).unwrap();

        assert_eq!(
            host.observed,
            vec![Observed::Block {
                line: 3,
                line_max: 5,
                parent_type: ParentType::directive(),
            }]
        );
        assert_eq!(host.line_max, 10);
        assert_eq!(host.parent_type, ParentType::Root);
    }

    #[test]
    fn test_block_content_keeps_line_progress() {
        let mut host = MockHost::new(10);
        host.line = 2;

        tokenize_block_content(&mut host, &body(3, 5), None).unwrap();

        // the mock consumes every line it is given
        assert_eq!(host.line, 5);
    }

    #[test]
    fn test_block_content_custom_parent() {
        let mut host = MockHost::new(10);
        host.parent_type = ParentType::Blockquote;

        tokenize_block_content(
            &mut host,
            &body(1, 4),
            Some(ParentType::directive_body("note")),
        )
        .unwrap();

        assert!(matches!(
            &host.observed[0],
            Observed::Block { parent_type, .. } if *parent_type == ParentType::directive_body("note")
        ));
        assert_eq!(host.parent_type, ParentType::Blockquote);
    }

    #[test]
    fn test_block_content_restores_on_error() {
        let mut host = MockHost::new(10);
        host.parent_type = ParentType::List;
        host.fail_on_tokenize = true;

        let result = tokenize_block_content(&mut host, &body(1, 4), None);

        assert!(result.is_err());
        assert_eq!(host.line_max, 10);
        assert_eq!(host.parent_type, ParentType::List);
    }

    #[test]
    fn test_block_content_restores_on_panic() {
        let mut host = MockHost::new(10);
        host.panic_on_tokenize = true;

        let result = catch_unwind(AssertUnwindSafe(|| {
            tokenize_block_content(&mut host, &body(1, 4), None)
        }));

        assert!(result.is_err());
        assert_eq!(host.line_max, 10);
        assert_eq!(host.parent_type, ParentType::Root);
    }

    #[test]
    fn test_nested_block_content_restores_each_level() {
        let mut host = MockHost::new(20);
        host.nested_blocks.push(body(4, 6));

        tokenize_block_content(&mut host, &body(2, 9), None).unwrap();

        assert_eq!(
            host.observed,
            vec![
                Observed::Block {
                    line: 2,
                    line_max: 9,
                    parent_type: ParentType::directive(),
                },
                Observed::Block {
                    line: 4,
                    line_max: 6,
                    parent_type: ParentType::directive_body("inner"),
                },
                // back in the outer body after the nested call returned
                Observed::Block {
                    line: 6,
                    line_max: 9,
                    parent_type: ParentType::directive(),
                },
            ]
        );
        assert_eq!(host.line_max, 20);
        assert_eq!(host.parent_type, ParentType::Root);
    }

    #[test]
    fn test_nested_failure_restores_outer_bounds() {
        let mut host = MockHost::new(20);
        host.nested_blocks.push(body(4, 6));
        host.fail_nested = true;

        let result = tokenize_block_content(&mut host, &body(2, 9), None);

        assert!(result.is_err());
        assert_eq!(host.line_max, 20);
        assert_eq!(host.parent_type, ParentType::Root);
    }

    #[test]
    fn test_inline_content_restores_cursor() {
        let mut host = MockHost::new(1);
        host.pos = 5;
        host.pos_max = 40;

        let content = InlineContent {
            raw: "inner".to_owned(),
            start_pos: 10,
            end_pos: 15,
        };
        tokenize_inline_content(&mut host, &content).unwrap();

        assert_eq!(
            host.observed,
            vec![Observed::Inline {
                pos: 10,
                pos_max: 15,
            }]
        );
        assert_eq!(host.pos, 5);
        assert_eq!(host.pos_max, 40);
    }

    #[test]
    fn test_inline_content_restores_on_error() {
        let mut host = MockHost::new(1);
        host.pos = 5;
        host.pos_max = 40;
        host.fail_on_tokenize = true;

        let content = InlineContent {
            raw: String::new(),
            start_pos: 10,
            end_pos: 10,
        };
        assert!(tokenize_inline_content(&mut host, &content).is_err());
        assert_eq!((host.pos, host.pos_max), (5, 40));
    }

    #[test]
    fn test_inline_content_restores_on_panic() {
        let mut host = MockHost::new(1);
        host.pos = 7;
        host.pos_max = 30;
        host.panic_on_tokenize = true;

        let content = InlineContent {
            raw: String::new(),
            start_pos: 8,
            end_pos: 12,
        };
        let result = catch_unwind(AssertUnwindSafe(|| {
            tokenize_inline_content(&mut host, &content)
        }));

        assert!(result.is_err());
        assert_eq!((host.pos, host.pos_max), (7, 30));
    }

    #[test]
    fn test_block_inline_token() {
        let mut host = MockHost::new(5);
        let params = LeafBlockParams {
            start_line: 2,
            end_line: 3,
            attrs: None,
            dests: None,
            inline_content: Some(InlineContent {
                raw: "*aa* bb".to_owned(),
                start_pos: 10,
                end_pos: 17,
            }),
        };

        let token = create_block_inline_token(&mut host, &params);
        assert_eq!(token.kind, "inline");
        assert_eq!(token.nesting, Nesting::SelfClosing);
        assert_eq!(token.content, "*aa* bb");
        assert_eq!(token.map, Some([2, 3]));
        assert_eq!(token.children, Some(Vec::new()));
        assert!(host.observed.is_empty());
    }

    #[test]
    fn test_block_inline_token_without_content() {
        let mut host = MockHost::new(5);
        let params = LeafBlockParams {
            start_line: 0,
            end_line: 1,
            attrs: None,
            dests: None,
            inline_content: None,
        };

        let token = create_block_inline_token(&mut host, &params);
        assert_eq!(token.content, "");
    }
}
