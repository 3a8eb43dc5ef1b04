//! Conversion of raw extraction records into canonical parameters.
//!
//! Normalization is total: malformed input is the scanner's problem. Absent
//! raw fields stay absent; they are never defaulted to empty values.

use crate::params::{
    BlockContent, ContainerParams, DestKind, DirectiveAttrs, DirectiveDests, InlineContent,
    InlineParams, LeafBlockParams,
};
use crate::raw::{RawBlockDirective, RawDest, RawInlineDirective, RawInlineSlice};

/// Build parameters for an inline directive.
#[must_use]
pub fn inline_params(raw: RawInlineDirective) -> InlineParams {
    InlineParams {
        start_pos: raw.directive_start,
        end_pos: raw.directive_end,
        attrs: raw.attrs.map(attrs),
        dests: raw.dests.map(dests),
        content: raw.content.map(inline_content),
    }
}

/// Build parameters for a leaf block directive.
///
/// Any captured body is ignored; callers pick the shape before normalizing.
#[must_use]
pub fn leaf_block_params(raw: RawBlockDirective) -> LeafBlockParams {
    LeafBlockParams {
        start_line: raw.directive_start_line,
        end_line: raw.directive_end_line,
        attrs: raw.attrs.map(attrs),
        dests: raw.dests.map(dests),
        inline_content: raw.inline_content.map(inline_content),
    }
}

/// Build parameters for a container directive.
///
/// Returns `None` when the record has no body.
#[must_use]
pub fn container_params(mut raw: RawBlockDirective) -> Option<ContainerParams> {
    let body = raw.content.take()?;
    Some(ContainerParams {
        block: leaf_block_params(raw),
        content: BlockContent {
            raw: body.text,
            start_line: body.start_line,
            end_line: body.end_line,
        },
    })
}

/// Project raw destinations onto their canonical form.
///
/// The first item of each kind becomes the named field; the input list is
/// kept unchanged.
///
/// ```
/// use directive_core::normalize;
/// use directive_core::raw::RawDest;
///
/// let dests = normalize::dests(vec![
///     RawDest::string("a"),
///     RawDest::link("b"),
///     RawDest::string("c"),
/// ]);
/// assert_eq!(dests.string.as_deref(), Some("a"));
/// assert_eq!(dests.link.as_deref(), Some("b"));
/// assert_eq!(dests.original.len(), 3);
/// ```
#[must_use]
pub fn dests(raw: Vec<RawDest>) -> DirectiveDests {
    let first = |kind: DestKind| {
        raw.iter()
            .find(|dest| dest.kind == kind)
            .map(|dest| dest.value.clone())
    };

    DirectiveDests {
        link: first(DestKind::Link),
        string: first(DestKind::String),
        original: raw.into_iter().map(|dest| (dest.kind, dest.value)).collect(),
    }
}

fn attrs(raw: Vec<(String, String)>) -> DirectiveAttrs {
    raw.into_iter().collect()
}

fn inline_content(raw: RawInlineSlice) -> InlineContent {
    InlineContent {
        raw: raw.text,
        start_pos: raw.start,
        end_pos: raw.end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawBlockSlice;
    use pretty_assertions::assert_eq;

    fn bare_block(name: &str) -> RawBlockDirective {
        RawBlockDirective {
            name: name.to_owned(),
            directive_start_line: 0,
            directive_end_line: 1,
            attrs: None,
            dests: None,
            inline_content: None,
            content: None,
        }
    }

    #[test]
    fn test_inline_without_parts() {
        let params = inline_params(RawInlineDirective {
            name: "dir".to_owned(),
            directive_start: 12,
            directive_end: 16,
            attrs: None,
            dests: None,
            content: None,
        });

        assert_eq!(
            params,
            InlineParams {
                start_pos: 12,
                end_pos: 16,
                attrs: None,
                dests: None,
                content: None,
            }
        );
    }

    #[test]
    fn test_inline_with_empty_parts() {
        let params = inline_params(RawInlineDirective {
            name: "abcdef".to_owned(),
            directive_start: 12,
            directive_end: 25,
            attrs: Some(Vec::new()),
            dests: Some(Vec::new()),
            content: Some(RawInlineSlice {
                text: String::new(),
                start: 20,
                end: 20,
            }),
        });

        assert_eq!(params.attrs, Some(DirectiveAttrs::new()));
        assert_eq!(
            params.dests,
            Some(DirectiveDests {
                link: None,
                string: None,
                original: Vec::new(),
            })
        );
        assert_eq!(
            params.content,
            Some(InlineContent {
                raw: String::new(),
                start_pos: 20,
                end_pos: 20,
            })
        );
    }

    #[test]
    fn test_dest_projection_keeps_original() {
        let dests = dests(vec![
            RawDest::string("a"),
            RawDest::link("b"),
            RawDest::string("c"),
        ]);

        assert_eq!(dests.string.as_deref(), Some("a"));
        assert_eq!(dests.link.as_deref(), Some("b"));
        assert_eq!(
            dests.original,
            vec![
                (DestKind::String, "a".to_owned()),
                (DestKind::Link, "b".to_owned()),
                (DestKind::String, "c".to_owned()),
            ]
        );
    }

    #[test]
    fn test_dest_projection_single_kind() {
        let dests = dests(vec![RawDest::link("x"), RawDest::link("y")]);
        assert_eq!(dests.link.as_deref(), Some("x"));
        assert_eq!(dests.string, None);
    }

    #[test]
    fn test_leaf_block_ignores_body() {
        let mut raw = bare_block("leaf");
        raw.content = Some(RawBlockSlice {
            text: "body\n".to_owned(),
            start_line: 1,
            end_line: 2,
        });

        let params = leaf_block_params(raw);
        assert_eq!(
            params,
            LeafBlockParams {
                start_line: 0,
                end_line: 1,
                attrs: None,
                dests: None,
                inline_content: None,
            }
        );
    }

    #[test]
    fn test_container_requires_body() {
        assert!(container_params(bare_block("block")).is_none());
    }

    #[test]
    fn test_container_params() {
        let mut raw = bare_block("block");
        raw.directive_end_line = 3;
        raw.attrs = Some(vec![("class".to_owned(), "wide".to_owned())]);
        raw.inline_content = Some(RawInlineSlice {
            text: "Title".to_owned(),
            start: 9,
            end: 14,
        });
        raw.content = Some(RawBlockSlice {
            text: "content\n".to_owned(),
            start_line: 1,
            end_line: 2,
        });

        let params = container_params(raw).unwrap();
        assert_eq!(params.start_line(), 0);
        assert_eq!(params.end_line(), 3);
        assert_eq!(params.attrs().and_then(|a| a.get("class")), Some("wide"));
        assert_eq!(params.inline_content().map(|c| c.raw.as_str()), Some("Title"));
        assert_eq!(
            params.content,
            BlockContent {
                raw: "content\n".to_owned(),
                start_line: 1,
                end_line: 2,
            }
        );
        assert!(params.dests().is_none());
    }
}
