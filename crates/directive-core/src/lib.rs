//! Generic directive support for token stream parsers.
//!
//! This crate implements the parser-agnostic half of CommonMark directive
//! syntax (inline `:name`, leaf block `::name` and container `:::name`). A
//! host parser finds occurrences and hands them over as raw records; the core
//! normalizes them into typed parameters, dispatches them to registered
//! handlers and gives handlers the tools to emit tokens and recurse into the
//! host's own tokenizers.
//!
//! # Architecture
//!
//! - [`raw`]: records a syntax scanner produces for each occurrence
//! - [`normalize`]: conversion of raw records into [`InlineParams`],
//!   [`LeafBlockParams`] and [`ContainerParams`]
//! - [`DirectiveRegistry`]: handler tables, one per shape
//! - [`BlockHost`] / [`InlineHost`]: the host's mutable parse state
//! - [`tokenize_block_content`] / [`tokenize_inline_content`]: reentrant
//!   sub-parsing with automatic state restoration
//! - [`ContainerDirectiveConfig`] and friends: declarative handlers built
//!   from token descriptors
//!
//! # Example
//!
//! ```
//! use directive_core::{
//!     ContainerDirectiveConfig, DirectiveRegistry, InlineContentDesc, TokensDesc,
//! };
//!
//! let mut registry = DirectiveRegistry::new();
//! registry
//!     .register_block_config(
//!         ContainerDirectiveConfig::new("note", TokensDesc::new("note", "div"))
//!             .with_inline_content(InlineContentDesc::new(TokensDesc::new("note_title", "p")))
//!             .with_match(|params, _state| Ok(params.attrs().is_some())),
//!     )
//!     .unwrap();
//!
//! assert!(registry.has_block("note"));
//! ```

pub mod descriptor;
pub mod emit;
mod error;
mod host;
#[cfg(test)]
mod mock;
pub mod normalize;
mod params;
pub mod raw;
mod registry;
mod token;
mod tokenize;

pub use descriptor::{
    BlockDirectiveConfig, CodeContainerDirectiveConfig, ContainerDirectiveConfig,
    ContentTokenizer, DirectiveKind, FieldSource, InlineContentDesc, LeafBlockDirectiveConfig,
    MatchFn, TokenFields, TokensDesc,
};
pub use error::{BoxError, DirectiveError, DirectiveResult};
pub use host::{BlockHost, Env, InlineHost, ParentType, TokenSink};
pub use params::{
    BlockContent, ContainerParams, DestKind, DirectiveAttrs, DirectiveDests, InlineContent,
    InlineParams, LeafBlockParams,
};
pub use registry::{ContainerHandler, DirectiveRegistry, InlineHandler, LeafBlockHandler};
pub use token::{Nesting, Token};
pub use tokenize::{
    BlockScope, InlineScope, create_block_inline_token, tokenize_block_content,
    tokenize_inline_content,
};
