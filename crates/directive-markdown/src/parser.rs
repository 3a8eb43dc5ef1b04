//! Parser facade: directive registration, rule toggles and `parse`.

use std::borrow::Cow;

use directive_core::{
    BlockDirectiveConfig, BlockHost, ContainerParams, DirectiveRegistry, DirectiveResult, Env,
    InlineHost, InlineParams, LeafBlockParams, Token,
};

use crate::block::{self, BlockParser, BlockState};
use crate::error::ParseError;
use crate::inline::{self, InlineParser};
use crate::options::ParserOptions;

/// Markdown parser with directive support.
///
/// Directives are recognized only once something is registered; until then
/// `:name` text is plain text.
pub struct MarkdownParser {
    pub(crate) options: ParserOptions,
    pub(crate) block: BlockParser,
    pub(crate) inline: InlineParser,
    pub(crate) registry: Option<DirectiveRegistry>,
}

impl MarkdownParser {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    #[must_use]
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            block: BlockParser::new(),
            inline: InlineParser::new(),
            registry: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ParserOptions) {
        self.options = options;
    }

    /// Registered directive handlers, if any were registered.
    #[must_use]
    pub fn registry(&self) -> Option<&DirectiveRegistry> {
        self.registry.as_ref()
    }

    fn registry_mut(&mut self) -> &mut DirectiveRegistry {
        self.registry.get_or_insert_with(DirectiveRegistry::new)
    }

    /// Register a handler for `:name` inline directives.
    ///
    /// Registering a name again replaces the previous handler.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::InvalidName`](directive_core::DirectiveError::InvalidName)
    /// for a name the directive syntax cannot produce.
    pub fn register_inline_directive<F>(&mut self, name: &str, handler: F) -> DirectiveResult<()>
    where
        F: Fn(&mut dyn InlineHost, InlineParams) -> DirectiveResult<bool> + Send + Sync + 'static,
    {
        self.registry_mut().register_inline(name, handler)
    }

    /// Register a handler for `::name` leaf block directives.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name.
    pub fn register_leaf_block_directive<F>(
        &mut self,
        name: &str,
        handler: F,
    ) -> DirectiveResult<()>
    where
        F: Fn(&mut dyn BlockHost, LeafBlockParams) -> DirectiveResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.registry_mut().register_leaf_block(name, handler)
    }

    /// Register a handler for `:::name` container directives.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name.
    pub fn register_container_directive<F>(
        &mut self,
        name: &str,
        handler: F,
    ) -> DirectiveResult<()>
    where
        F: Fn(&mut dyn BlockHost, ContainerParams) -> DirectiveResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.registry_mut().register_container(name, handler)
    }

    /// Register a declaratively described block directive.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name.
    pub fn register_block_config(
        &mut self,
        config: impl Into<BlockDirectiveConfig>,
    ) -> DirectiveResult<()> {
        self.registry_mut().register_block_config(config)
    }

    pub fn enable_inline_directives(&mut self) {
        self.inline.ruler.enable(inline::DIRECTIVE_RULE);
    }

    pub fn disable_inline_directives(&mut self) {
        self.inline.ruler.disable(inline::DIRECTIVE_RULE);
    }

    pub fn enable_block_directives(&mut self) {
        self.block.ruler.enable(block::DIRECTIVE_RULE);
    }

    pub fn disable_block_directives(&mut self) {
        self.block.ruler.disable(block::DIRECTIVE_RULE);
    }

    #[must_use]
    pub fn inline_directives_enabled(&self) -> bool {
        self.inline.ruler.is_enabled(inline::DIRECTIVE_RULE)
    }

    #[must_use]
    pub fn block_directives_enabled(&self) -> bool {
        self.block.ruler.is_enabled(block::DIRECTIVE_RULE)
    }

    /// Parse `src` into a token stream.
    ///
    /// `env` is shared by every rule and handler of this parse. Block tokens
    /// come first; the children of each `inline` carrier are filled
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first handler or predicate failure. No partial token
    /// stream is returned.
    pub fn parse(&self, src: &str, env: &mut Env) -> Result<Vec<Token>, ParseError> {
        let src = normalize_source(src);

        let mut tokens = {
            let mut state = BlockState::new(&src, self, env);
            let line_max = state.line_max;
            state.tokenize(0, line_max)?;
            state.tokens
        };

        for token in tokens.iter_mut().filter(|token| token.kind == "inline") {
            let content = std::mem::take(&mut token.content);
            let children = inline::parse(&content, self, env);
            token.content = content;
            token.children = Some(children?);
        }

        tracing::debug!(
            bytes = src.len(),
            tokens = tokens.len(),
            "Parsed markdown source"
        );
        Ok(tokens)
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Unify line endings and replace NUL characters.
fn normalize_source(src: &str) -> Cow<'_, str> {
    if !src.contains(['\r', '\0']) {
        return Cow::Borrowed(src);
    }
    Cow::Owned(
        src.replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\0', "\u{FFFD}"),
    )
}
