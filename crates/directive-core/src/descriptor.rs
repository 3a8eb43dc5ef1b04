//! Declarative directive descriptors.
//!
//! A descriptor names the token type and element to emit and how to fill
//! attributes and metadata. Directives registered through a descriptor get a
//! generated handler instead of hand-written emission code.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{DirectiveError, DirectiveResult};
use crate::host::{BlockHost, Env};
use crate::params::{BlockContent, ContainerParams, DirectiveAttrs, LeafBlockParams};
use crate::token::Token;

/// A token field that is either fixed or computed from the parameters.
///
/// Computed functions see the parse environment read-only, so a match
/// predicate can leave values there for them. They must not touch parser
/// state; only the emission builder pushes tokens.
pub enum FieldSource<P, T> {
    Fixed(T),
    Computed(Box<dyn Fn(&P, &Env) -> T + Send + Sync>),
}

impl<P, T: Clone> FieldSource<P, T> {
    /// Wrap a function of the parameters and environment.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&P, &Env) -> T + Send + Sync + 'static,
    {
        Self::Computed(Box::new(f))
    }

    /// Produce the field value for one occurrence.
    pub fn resolve(&self, params: &P, env: &Env) -> T {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Computed(f) => f(params, env),
        }
    }
}

impl<P, T: fmt::Debug> fmt::Debug for FieldSource<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Recipe for one open/close token pair (or one self-contained token).
#[derive(Debug)]
pub struct TokensDesc<P> {
    /// Element name, e.g. `div`.
    pub tag: String,
    /// Token type prefix; `_open`/`_close` are appended for pairs.
    pub token: String,
    pub attrs: Option<FieldSource<P, DirectiveAttrs>>,
    pub meta: Option<FieldSource<P, Value>>,
}

impl<P> TokensDesc<P> {
    /// Create a descriptor without attributes or metadata.
    #[must_use]
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            token: token.into(),
            attrs: None,
            meta: None,
        }
    }

    /// Set fixed attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: DirectiveAttrs) -> Self {
        self.attrs = Some(FieldSource::Fixed(attrs));
        self
    }

    /// Set attributes computed per occurrence.
    #[must_use]
    pub fn with_computed_attrs<F>(mut self, f: F) -> Self
    where
        F: Fn(&P, &Env) -> DirectiveAttrs + Send + Sync + 'static,
    {
        self.attrs = Some(FieldSource::computed(f));
        self
    }

    /// Set fixed metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(FieldSource::Fixed(meta));
        self
    }

    /// Set metadata computed per occurrence.
    #[must_use]
    pub fn with_computed_meta<F>(mut self, f: F) -> Self
    where
        F: Fn(&P, &Env) -> Value + Send + Sync + 'static,
    {
        self.meta = Some(FieldSource::computed(f));
        self
    }

    /// Resolve attributes and metadata for one occurrence.
    pub fn fields(&self, params: &P, env: &Env) -> TokenFields {
        TokenFields {
            attrs: self
                .attrs
                .as_ref()
                .map(|attrs| attrs.resolve(params, env).to_pairs()),
            meta: self.meta.as_ref().map(|meta| meta.resolve(params, env)),
        }
    }
}

/// Attribute and metadata values resolved for one occurrence.
#[derive(Debug, Default, PartialEq)]
pub struct TokenFields {
    pub attrs: Option<Vec<(String, String)>>,
    pub meta: Option<Value>,
}

impl TokenFields {
    /// Write the resolved values to a token. Unset fields are left alone.
    pub fn apply(self, token: &mut Token) {
        if let Some(attrs) = self.attrs {
            token.attrs = Some(attrs);
        }
        if let Some(meta) = self.meta {
            token.meta = Some(meta);
        }
    }
}

/// Descriptor for the wrapper around a directive's `[inline content]`.
#[derive(Debug)]
pub struct InlineContentDesc<P> {
    pub tokens: TokensDesc<P>,
    /// Decline occurrences without inline content. Defaults to `true`.
    pub required: bool,
}

impl<P> InlineContentDesc<P> {
    #[must_use]
    pub fn new(tokens: TokensDesc<P>) -> Self {
        Self {
            tokens,
            required: true,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Predicate deciding whether a registered directive accepts an occurrence.
///
/// It may read and write the parse environment through the host.
pub type MatchFn<P> = Box<dyn Fn(&P, &mut dyn BlockHost) -> DirectiveResult<bool> + Send + Sync>;

/// Custom tokenizer for a container body.
pub type ContentTokenizer = Box<
    dyn Fn(&mut dyn BlockHost, &BlockContent, &ContainerParams) -> DirectiveResult<()>
        + Send
        + Sync,
>;

fn match_all<P: 'static>() -> MatchFn<P> {
    Box::new(|_, _| Ok(true))
}

/// Container directive whose body is tokenized as nested blocks.
pub struct ContainerDirectiveConfig {
    pub name: String,
    pub matcher: MatchFn<ContainerParams>,
    pub container: TokensDesc<ContainerParams>,
    pub inline_content: Option<InlineContentDesc<ContainerParams>>,
    pub content: Option<TokensDesc<ContainerParams>>,
    /// Replaces the default body tokenization when set.
    pub content_tokenizer: Option<ContentTokenizer>,
}

impl ContainerDirectiveConfig {
    /// Accept every occurrence and emit only the container pair.
    #[must_use]
    pub fn new(name: impl Into<String>, container: TokensDesc<ContainerParams>) -> Self {
        Self {
            name: name.into(),
            matcher: match_all(),
            container,
            inline_content: None,
            content: None,
            content_tokenizer: None,
        }
    }

    #[must_use]
    pub fn with_match<F>(mut self, f: F) -> Self
    where
        F: Fn(&ContainerParams, &mut dyn BlockHost) -> DirectiveResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.matcher = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_inline_content(mut self, desc: InlineContentDesc<ContainerParams>) -> Self {
        self.inline_content = Some(desc);
        self
    }

    #[must_use]
    pub fn with_content(mut self, desc: TokensDesc<ContainerParams>) -> Self {
        self.content = Some(desc);
        self
    }

    #[must_use]
    pub fn with_content_tokenizer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn BlockHost, &BlockContent, &ContainerParams) -> DirectiveResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.content_tokenizer = Some(Box::new(f));
        self
    }
}

/// Container directive whose body is emitted verbatim in one token, like a
/// fenced code block.
pub struct CodeContainerDirectiveConfig {
    pub name: String,
    pub matcher: MatchFn<ContainerParams>,
    pub container: TokensDesc<ContainerParams>,
}

impl CodeContainerDirectiveConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, container: TokensDesc<ContainerParams>) -> Self {
        Self {
            name: name.into(),
            matcher: match_all(),
            container,
        }
    }

    #[must_use]
    pub fn with_match<F>(mut self, f: F) -> Self
    where
        F: Fn(&ContainerParams, &mut dyn BlockHost) -> DirectiveResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.matcher = Box::new(f);
        self
    }
}

/// Leaf block directive emitted as a container pair around optional inline
/// content.
pub struct LeafBlockDirectiveConfig {
    pub name: String,
    pub matcher: MatchFn<LeafBlockParams>,
    pub container: TokensDesc<LeafBlockParams>,
    pub inline_content: Option<InlineContentDesc<LeafBlockParams>>,
}

impl LeafBlockDirectiveConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, container: TokensDesc<LeafBlockParams>) -> Self {
        Self {
            name: name.into(),
            matcher: match_all(),
            container,
            inline_content: None,
        }
    }

    #[must_use]
    pub fn with_match<F>(mut self, f: F) -> Self
    where
        F: Fn(&LeafBlockParams, &mut dyn BlockHost) -> DirectiveResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.matcher = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_inline_content(mut self, desc: InlineContentDesc<LeafBlockParams>) -> Self {
        self.inline_content = Some(desc);
        self
    }
}

/// Any declaratively described block directive.
pub enum BlockDirectiveConfig {
    Container(ContainerDirectiveConfig),
    Code(CodeContainerDirectiveConfig),
    LeafBlock(LeafBlockDirectiveConfig),
}

impl BlockDirectiveConfig {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Container(config) => &config.name,
            Self::Code(config) => &config.name,
            Self::LeafBlock(config) => &config.name,
        }
    }

    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Container(_) => DirectiveKind::ContainerBlock,
            Self::Code(_) => DirectiveKind::CodeBlock,
            Self::LeafBlock(_) => DirectiveKind::LeafBlock,
        }
    }
}

impl From<ContainerDirectiveConfig> for BlockDirectiveConfig {
    fn from(config: ContainerDirectiveConfig) -> Self {
        Self::Container(config)
    }
}

impl From<CodeContainerDirectiveConfig> for BlockDirectiveConfig {
    fn from(config: CodeContainerDirectiveConfig) -> Self {
        Self::Code(config)
    }
}

impl From<LeafBlockDirectiveConfig> for BlockDirectiveConfig {
    fn from(config: LeafBlockDirectiveConfig) -> Self {
        Self::LeafBlock(config)
    }
}

/// Variant tag of a declarative block directive, as written in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `container_block`
    ContainerBlock,
    /// `code_block`
    CodeBlock,
    /// `leaf_block`
    LeafBlock,
}

impl DirectiveKind {
    /// Parse a variant tag for the named directive.
    ///
    /// An unknown tag is a misconfiguration.
    pub fn parse_for(name: &str, tag: &str) -> DirectiveResult<Self> {
        tag.parse().map_err(|()| DirectiveError::UnsupportedVariant {
            name: name.to_owned(),
            kind: tag.to_owned(),
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContainerBlock => "container_block",
            Self::CodeBlock => "code_block",
            Self::LeafBlock => "leaf_block",
        }
    }
}

impl FromStr for DirectiveKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container_block" => Ok(Self::ContainerBlock),
            "code_block" => Ok(Self::CodeBlock),
            "leaf_block" => Ok(Self::LeafBlock),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
