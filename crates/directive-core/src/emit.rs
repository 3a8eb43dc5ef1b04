//! Token emission from declarative descriptors.
//!
//! Every emitter checks its preconditions before the first push, so a
//! declined occurrence leaves the output untouched.

use crate::descriptor::{
    CodeContainerDirectiveConfig, ContainerDirectiveConfig, InlineContentDesc,
    LeafBlockDirectiveConfig, TokensDesc,
};
use crate::error::DirectiveResult;
use crate::host::{BlockHost, ParentType};
use crate::params::{ContainerParams, InlineContent, LeafBlockParams};
use crate::token::{Nesting, Token};
use crate::tokenize::{create_block_inline_token, tokenize_block_content};

/// True unless the descriptor requires inline content the occurrence lacks.
pub(crate) fn inline_content_satisfied<P>(
    desc: Option<&InlineContentDesc<P>>,
    content: Option<&InlineContent>,
) -> bool {
    !matches!(desc, Some(desc) if desc.required && content.is_none())
}

/// Push a token for a descriptor with its attributes and metadata applied.
fn push<'h, P>(
    host: &'h mut dyn BlockHost,
    desc: &TokensDesc<P>,
    kind: &str,
    nesting: Nesting,
    params: &P,
) -> &'h mut Token {
    // resolved before the push: the token borrow excludes the env
    let fields = desc.fields(params, host.env());
    let token = host.push(kind, &desc.tag, nesting);
    fields.apply(token);
    token
}

fn open<'h, P>(host: &'h mut dyn BlockHost, desc: &TokensDesc<P>, params: &P) -> &'h mut Token {
    push(host, desc, &format!("{}_open", desc.token), Nesting::Open, params)
}

fn close<P>(host: &mut dyn BlockHost, desc: &TokensDesc<P>) {
    host.push(&format!("{}_close", desc.token), &desc.tag, Nesting::Close);
}

/// Emit a container directive: container pair, optional inline content
/// wrapper, optional content pair and the tokenized body.
///
/// Returns `Ok(false)` without pushing anything when required inline content
/// is missing.
pub fn container(
    host: &mut dyn BlockHost,
    config: &ContainerDirectiveConfig,
    params: &ContainerParams,
) -> DirectiveResult<bool> {
    if !inline_content_satisfied(config.inline_content.as_ref(), params.inline_content()) {
        return Ok(false);
    }

    let token = open(host, &config.container, params);
    token.map = Some([params.start_line(), params.end_line()]);
    token.markup = format!(":::{}", config.name);

    if let Some(desc) = &config.inline_content
        && params.inline_content().is_some()
    {
        open(host, &desc.tokens, params);
        create_block_inline_token(host, &params.block);
        close(host, &desc.tokens);
    }

    if let Some(desc) = &config.content {
        let token = open(host, desc, params);
        token.map = Some([params.start_line() + 1, params.end_line() - 1]);
    }

    match &config.content_tokenizer {
        Some(tokenize) => tokenize(host, &params.content, params)?,
        None => tokenize_block_content(
            host,
            &params.content,
            Some(ParentType::directive_body(&config.name)),
        )?,
    }

    if let Some(desc) = &config.content {
        close(host, desc);
    }
    close(host, &config.container);

    Ok(true)
}

/// Emit a code container: one self-contained token holding the raw body,
/// shaped like a fenced code block.
pub fn code_container(
    host: &mut dyn BlockHost,
    config: &CodeContainerDirectiveConfig,
    params: &ContainerParams,
) -> DirectiveResult<bool> {
    let desc = &config.container;
    let token = push(host, desc, &desc.token, Nesting::SelfClosing, params);
    token.map = Some([params.start_line(), params.end_line()]);
    token.content.clone_from(&params.content.raw);
    ":::".clone_into(&mut token.markup);
    token.info.clone_from(&config.name);

    Ok(true)
}

/// Emit a leaf block directive: container pair around optional inline
/// content.
///
/// Returns `Ok(false)` without pushing anything when required inline content
/// is missing.
pub fn leaf_block(
    host: &mut dyn BlockHost,
    config: &LeafBlockDirectiveConfig,
    params: &LeafBlockParams,
) -> DirectiveResult<bool> {
    if !inline_content_satisfied(
        config.inline_content.as_ref(),
        params.inline_content.as_ref(),
    ) {
        return Ok(false);
    }

    let token = open(host, &config.container, params);
    token.map = Some([params.start_line, params.end_line]);
    token.markup = format!("::{}", config.name);

    if let Some(desc) = &config.inline_content
        && params.inline_content.is_some()
    {
        open(host, &desc.tokens, params);
        create_block_inline_token(host, params);
        close(host, &desc.tokens);
    }

    close(host, &config.container);

    Ok(true)
}
