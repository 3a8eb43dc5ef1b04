//! Directive handler registry and dispatch.
//!
//! Handlers are kept in one table per shape. Inline occurrences consult the
//! inline table. Block occurrences consult exactly one of the container and
//! leaf block tables, chosen by whether the occurrence has a body; a handler
//! declining never moves the occurrence to the other table.

use std::collections::HashMap;

use crate::descriptor::{
    BlockDirectiveConfig, CodeContainerDirectiveConfig, ContainerDirectiveConfig,
    LeafBlockDirectiveConfig,
};
use crate::emit;
use crate::error::{DirectiveResult, validate_name};
use crate::host::{BlockHost, InlineHost};
use crate::normalize;
use crate::params::{ContainerParams, InlineParams, LeafBlockParams};
use crate::raw::{RawBlockDirective, RawInlineDirective};

/// Handler for inline directives: `:name[content](dests){attrs}`.
pub type InlineHandler =
    Box<dyn Fn(&mut dyn InlineHost, InlineParams) -> DirectiveResult<bool> + Send + Sync>;

/// Handler for leaf block directives: `::name[content](dests){attrs}`.
pub type LeafBlockHandler =
    Box<dyn Fn(&mut dyn BlockHost, LeafBlockParams) -> DirectiveResult<bool> + Send + Sync>;

/// Handler for container directives: `:::name` ... `:::`.
pub type ContainerHandler =
    Box<dyn Fn(&mut dyn BlockHost, ContainerParams) -> DirectiveResult<bool> + Send + Sync>;

/// Handlers registered with one parser, keyed by directive name.
///
/// A name may have an inline handler and a block handler at the same time.
/// Registering a name again for the same shape replaces the earlier handler.
///
/// # Example
///
/// ```
/// use directive_core::{DirectiveRegistry, Nesting, tokenize_inline_content};
///
/// let mut registry = DirectiveRegistry::new();
/// registry
///     .register_inline("kbd", |state, params| {
///         let Some(content) = params.content else {
///             return Ok(false);
///         };
///         state.push("kbd_open", "kbd", Nesting::Open);
///         tokenize_inline_content(state, &content)?;
///         state.push("kbd_close", "kbd", Nesting::Close);
///         Ok(true)
///     })
///     .unwrap();
///
/// assert!(registry.has_inline("kbd"));
/// assert!(!registry.has_block("kbd"));
/// ```
#[derive(Default)]
pub struct DirectiveRegistry {
    inline: HashMap<String, InlineHandler>,
    leaf_block: HashMap<String, LeafBlockHandler>,
    container: HashMap<String, ContainerHandler>,
}

impl DirectiveRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inline directive handler.
    pub fn register_inline<F>(&mut self, name: &str, handler: F) -> DirectiveResult<()>
    where
        F: Fn(&mut dyn InlineHost, InlineParams) -> DirectiveResult<bool> + Send + Sync + 'static,
    {
        validate_name(name)?;
        let replaced = self.inline.insert(name.to_owned(), Box::new(handler));
        log_registration(name, "inline", replaced.is_some());
        Ok(())
    }

    /// Register a leaf block directive handler.
    pub fn register_leaf_block<F>(&mut self, name: &str, handler: F) -> DirectiveResult<()>
    where
        F: Fn(&mut dyn BlockHost, LeafBlockParams) -> DirectiveResult<bool>
            + Send
            + Sync
            + 'static,
    {
        validate_name(name)?;
        let replaced = self.leaf_block.insert(name.to_owned(), Box::new(handler));
        log_registration(name, "leaf_block", replaced.is_some());
        Ok(())
    }

    /// Register a container directive handler.
    pub fn register_container<F>(&mut self, name: &str, handler: F) -> DirectiveResult<()>
    where
        F: Fn(&mut dyn BlockHost, ContainerParams) -> DirectiveResult<bool>
            + Send
            + Sync
            + 'static,
    {
        validate_name(name)?;
        let replaced = self.container.insert(name.to_owned(), Box::new(handler));
        log_registration(name, "container", replaced.is_some());
        Ok(())
    }

    /// Register a declaratively described block directive.
    ///
    /// Equivalent to registering a handler that runs the match predicate and,
    /// if it accepts, emits tokens from the descriptors.
    pub fn register_block_config(
        &mut self,
        config: impl Into<BlockDirectiveConfig>,
    ) -> DirectiveResult<()> {
        match config.into() {
            BlockDirectiveConfig::Container(config) => {
                let name = config.name.clone();
                self.register_container(&name, container_handler(config))
            }
            BlockDirectiveConfig::Code(config) => {
                let name = config.name.clone();
                self.register_container(&name, code_container_handler(config))
            }
            BlockDirectiveConfig::LeafBlock(config) => {
                let name = config.name.clone();
                self.register_leaf_block(&name, leaf_block_handler(config))
            }
        }
    }

    #[must_use]
    pub fn has_inline(&self, name: &str) -> bool {
        self.inline.contains_key(name)
    }

    /// True if a container or leaf block handler is registered for `name`.
    #[must_use]
    pub fn has_block(&self, name: &str) -> bool {
        self.container.contains_key(name) || self.leaf_block.contains_key(name)
    }

    /// Registered names per shape, sorted: `(inline, leaf_block, container)`.
    #[must_use]
    pub fn names(&self) -> (Vec<&str>, Vec<&str>, Vec<&str>) {
        fn sorted<V>(map: &HashMap<String, V>) -> Vec<&str> {
            let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
            names.sort_unstable();
            names
        }
        (
            sorted(&self.inline),
            sorted(&self.leaf_block),
            sorted(&self.container),
        )
    }

    /// Dispatch an inline occurrence.
    ///
    /// Returns `Ok(false)` if no inline handler is registered for the name or
    /// the handler declined; the handler's result is returned unchanged.
    pub fn dispatch_inline(
        &self,
        host: &mut dyn InlineHost,
        raw: RawInlineDirective,
    ) -> DirectiveResult<bool> {
        let Some(handler) = self.inline.get(&raw.name) else {
            tracing::trace!(name = %raw.name, "No inline directive handler");
            return Ok(false);
        };

        let name = raw.name.clone();
        let matched = handler(host, normalize::inline_params(raw))?;
        log_outcome(&name, "inline", matched);
        Ok(matched)
    }

    /// Dispatch a block occurrence.
    ///
    /// An occurrence with a body goes to the container table only; one
    /// without goes to the leaf block table only.
    pub fn dispatch_block(
        &self,
        host: &mut dyn BlockHost,
        raw: RawBlockDirective,
    ) -> DirectiveResult<bool> {
        let name = raw.name.clone();

        if raw.has_body() {
            let Some(handler) = self.container.get(&name) else {
                tracing::trace!(name = %name, "No container directive handler");
                return Ok(false);
            };
            let Some(params) = normalize::container_params(raw) else {
                return Ok(false);
            };
            let matched = handler(host, params)?;
            log_outcome(&name, "container", matched);
            Ok(matched)
        } else {
            let Some(handler) = self.leaf_block.get(&name) else {
                tracing::trace!(name = %name, "No leaf block directive handler");
                return Ok(false);
            };
            let matched = handler(host, normalize::leaf_block_params(raw))?;
            log_outcome(&name, "leaf_block", matched);
            Ok(matched)
        }
    }
}

fn log_registration(name: &str, shape: &'static str, replaced: bool) {
    if replaced {
        tracing::debug!(name, shape, "Replaced directive handler");
    } else {
        tracing::debug!(name, shape, "Registered directive handler");
    }
}

fn log_outcome(name: &str, shape: &'static str, matched: bool) {
    if !matched {
        tracing::trace!(name, shape, "Directive handler declined");
    }
}

fn container_handler(
    config: ContainerDirectiveConfig,
) -> impl Fn(&mut dyn BlockHost, ContainerParams) -> DirectiveResult<bool> + Send + Sync + 'static
{
    move |host, params| {
        // required inline content is checked before the predicate can run
        if !emit::inline_content_satisfied(config.inline_content.as_ref(), params.inline_content())
        {
            return Ok(false);
        }
        if !(config.matcher)(&params, &mut *host)? {
            return Ok(false);
        }
        emit::container(host, &config, &params)
    }
}

fn code_container_handler(
    config: CodeContainerDirectiveConfig,
) -> impl Fn(&mut dyn BlockHost, ContainerParams) -> DirectiveResult<bool> + Send + Sync + 'static
{
    move |host, params| {
        if !(config.matcher)(&params, &mut *host)? {
            return Ok(false);
        }
        emit::code_container(host, &config, &params)
    }
}

fn leaf_block_handler(
    config: LeafBlockDirectiveConfig,
) -> impl Fn(&mut dyn BlockHost, LeafBlockParams) -> DirectiveResult<bool> + Send + Sync + 'static
{
    move |host, params| {
        if !emit::inline_content_satisfied(
            config.inline_content.as_ref(),
            params.inline_content.as_ref(),
        ) {
            return Ok(false);
        }
        if !(config.matcher)(&params, &mut *host)? {
            return Ok(false);
        }
        emit::leaf_block(host, &config, &params)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::descriptor::{InlineContentDesc, TokensDesc};
    use crate::error::DirectiveError;
    use crate::host::{Env, TokenSink};
    use crate::mock::MockHost;
    use crate::params::DirectiveAttrs;
    use crate::raw::{RawBlockSlice, RawInlineSlice};
    use crate::token::Nesting;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block(name: &str, body: bool) -> RawBlockDirective {
        RawBlockDirective {
            name: name.to_owned(),
            directive_start_line: 0,
            directive_end_line: if body { 3 } else { 1 },
            attrs: None,
            dests: None,
            inline_content: None,
            content: body.then(|| RawBlockSlice {
                text: "content\n".to_owned(),
                start_line: 1,
                end_line: 2,
            }),
        }
    }

    fn inline(name: &str) -> RawInlineDirective {
        RawInlineDirective {
            name: name.to_owned(),
            directive_start: 5,
            directive_end: 15,
            attrs: None,
            dests: None,
            content: Some(RawInlineSlice {
                text: "text".to_owned(),
                start: 10,
                end: 14,
            }),
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&count), count)
    }

    fn registry_with_counters() -> (DirectiveRegistry, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let (container_calls, container_seen) = counter();
        let (leaf_calls, leaf_seen) = counter();

        let mut registry = DirectiveRegistry::new();
        registry
            .register_container("dir", move |_, _| {
                container_calls.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            })
            .unwrap();
        registry
            .register_leaf_block("dir", move |_, _| {
                leaf_calls.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            })
            .unwrap();

        (registry, container_seen, leaf_seen)
    }

    #[test]
    fn test_block_with_body_goes_to_container_only() {
        let (registry, container, leaf) = registry_with_counters();
        let mut host = MockHost::new(10);

        assert!(!registry.dispatch_block(&mut host, block("dir", true)).unwrap());
        assert_eq!(container.load(Ordering::SeqCst), 1);
        // declining does not fall back to the leaf table
        assert_eq!(leaf.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_block_without_body_goes_to_leaf_only() {
        let (registry, container, leaf) = registry_with_counters();
        let mut host = MockHost::new(10);

        assert!(!registry.dispatch_block(&mut host, block("dir", false)).unwrap());
        assert_eq!(container.load(Ordering::SeqCst), 0);
        assert_eq!(leaf.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_body_without_container_handler_is_unrecognized() {
        let (leaf_calls, leaf_seen) = counter();
        let mut registry = DirectiveRegistry::new();
        registry
            .register_leaf_block("dir", move |_, _| {
                leaf_calls.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })
            .unwrap();

        let mut host = MockHost::new(10);
        assert!(!registry.dispatch_block(&mut host, block("dir", true)).unwrap());
        assert_eq!(leaf_seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregistered_name() {
        let registry = DirectiveRegistry::new();
        let mut host = MockHost::new(10);

        assert!(!registry.dispatch_block(&mut host, block("nope", true)).unwrap());
        assert!(!registry.dispatch_block(&mut host, block("nope", false)).unwrap());
        assert!(!registry.dispatch_inline(&mut host, inline("nope")).unwrap());
        assert_eq!(host.token_count(), 0);
    }

    #[test]
    fn test_reregistration_replaces_handler() {
        let (first_calls, first_seen) = counter();
        let (second_calls, second_seen) = counter();

        let mut registry = DirectiveRegistry::new();
        registry
            .register_inline("tip", move |_, _| {
                first_calls.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })
            .unwrap();
        registry
            .register_inline("tip", move |_, _| {
                second_calls.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })
            .unwrap();

        let mut host = MockHost::new(1);
        for _ in 0..3 {
            assert!(registry.dispatch_inline(&mut host, inline("tip")).unwrap());
        }
        assert_eq!(first_seen.load(Ordering::SeqCst), 0);
        assert_eq!(second_seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_same_name_inline_and_block() {
        let mut registry = DirectiveRegistry::new();
        registry.register_inline("tab", |_, _| Ok(true)).unwrap();
        registry.register_container("tab", |_, _| Ok(true)).unwrap();

        assert!(registry.has_inline("tab"));
        assert!(registry.has_block("tab"));
        assert_eq!(registry.names(), (vec!["tab"], vec![], vec!["tab"]));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut registry = DirectiveRegistry::new();
        let err = registry.register_inline("bad name", |_, _| Ok(true)).unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidName { .. }));
        assert!(!registry.has_inline("bad name"));
    }

    #[test]
    fn test_inline_handler_receives_params() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register_inline("tip", |host, params| {
                assert_eq!(params.start_pos, 5);
                assert_eq!(params.end_pos, 15);
                assert!(params.attrs.is_none());
                assert_eq!(params.content.as_ref().map(|c| c.raw.as_str()), Some("text"));
                host.push("tip", "span", Nesting::SelfClosing);
                Ok(true)
            })
            .unwrap();

        let mut host = MockHost::new(1);
        assert!(registry.dispatch_inline(&mut host, inline("tip")).unwrap());
        assert_eq!(host.kinds(), vec!["tip"]);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register_container("dir", |_, _| Err(DirectiveError::handler("dir", "broken")))
            .unwrap();

        let mut host = MockHost::new(10);
        let err = registry.dispatch_block(&mut host, block("dir", true)).unwrap_err();
        assert_eq!(err.to_string(), r#"Directive "dir" failed: broken"#);
    }

    #[test]
    fn test_config_predicate_rejection_emits_nothing() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register_block_config(
                ContainerDirectiveConfig::new("note", TokensDesc::new("note", "div"))
                    .with_match(|_, host| {
                        host.env_mut().insert("seen".to_owned(), json!(true));
                        Ok(false)
                    }),
            )
            .unwrap();

        let mut host = MockHost::new(10);
        assert!(!registry.dispatch_block(&mut host, block("note", true)).unwrap());
        assert_eq!(host.token_count(), 0);
        // the predicate's own side effect is the only one
        assert_eq!(host.env.get("seen"), Some(&json!(true)));
    }

    #[test]
    fn test_config_required_inline_skips_predicate() {
        let (calls, seen) = counter();
        let mut registry = DirectiveRegistry::new();
        registry
            .register_block_config(
                ContainerDirectiveConfig::new("note", TokensDesc::new("note", "div"))
                    .with_inline_content(InlineContentDesc::new(TokensDesc::new("title", "p")))
                    .with_match(move |_, _| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(true)
                    }),
            )
            .unwrap();

        let mut host = MockHost::new(10);
        assert!(!registry.dispatch_block(&mut host, block("note", true)).unwrap());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(host.token_count(), 0);
    }

    #[test]
    fn test_config_predicate_error_propagates() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register_block_config(
                ContainerDirectiveConfig::new("note", TokensDesc::new("note", "div"))
                    .with_match(|_, _| Err(DirectiveError::handler("note", "bad predicate"))),
            )
            .unwrap();

        let mut host = MockHost::new(10);
        assert!(registry.dispatch_block(&mut host, block("note", true)).is_err());
        assert_eq!(host.token_count(), 0);
    }

    #[test]
    fn test_config_container_emits() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register_block_config(ContainerDirectiveConfig::new(
                "note",
                TokensDesc::new("note", "div"),
            ))
            .unwrap();

        let mut host = MockHost::new(10);
        assert!(registry.dispatch_block(&mut host, block("note", true)).unwrap());
        assert_eq!(host.kinds(), vec!["note_open", "body", "note_close"]);
        assert_eq!(host.tokens[0].map, Some([0, 3]));
    }

    #[test]
    fn test_code_config_registers_container() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register_block_config(CodeContainerDirectiveConfig::new(
                "js",
                TokensDesc::new("code_js", "code"),
            ))
            .unwrap();

        let mut host = MockHost::new(10);
        assert!(!registry.dispatch_block(&mut host, block("js", false)).unwrap());
        assert!(registry.dispatch_block(&mut host, block("js", true)).unwrap());
        assert_eq!(host.kinds(), vec!["code_js"]);
        assert_eq!(host.tokens[0].content, "content\n");
    }

    #[test]
    fn test_leaf_config_stashes_env_for_fields() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register_block_config(
                LeafBlockDirectiveConfig::new(
                    "blck",
                    TokensDesc::new("leaf-block", "div")
                        .with_computed_attrs(|params: &LeafBlockParams, env: &Env| {
                            let mut attrs = DirectiveAttrs::new();
                            if let Some(value) =
                                params.attrs.as_ref().and_then(|a| a.get("data-block"))
                            {
                                attrs.insert("data-block", value);
                            }
                            if let Some(value) = env.get("blck_env").and_then(|v| v.as_str()) {
                                attrs.insert("data-env", value);
                            }
                            attrs
                        })
                        .with_computed_meta(|_: &LeafBlockParams, env: &Env| {
                            json!({"leaf": true, "env": env.get("blck_env")})
                        }),
                )
                .with_match(|params, host| {
                    host.env_mut().insert(
                        "blck_env".to_owned(),
                        json!("this is blck leaf directive"),
                    );
                    Ok(params.attrs.as_ref().is_some_and(|a| a.contains("data-block")))
                }),
            )
            .unwrap();

        let mut raw = block("blck", false);
        raw.attrs = Some(vec![("data-block".to_owned(), "2".to_owned())]);

        let mut host = MockHost::new(10);
        assert!(registry.dispatch_block(&mut host, raw).unwrap());
        assert_eq!(host.kinds(), vec!["leaf-block_open", "leaf-block_close"]);

        let open = &host.tokens[0];
        assert_eq!(open.markup, "::blck");
        assert_eq!(open.attr("data-block"), Some("2"));
        assert_eq!(open.attr("data-env"), Some("this is blck leaf directive"));
        assert_eq!(
            open.meta,
            Some(json!({"leaf": true, "env": "this is blck leaf directive"}))
        );
    }
}
