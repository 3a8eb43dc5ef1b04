//! Raw extraction records produced by a directive syntax scanner.
//!
//! The scanner decides where a directive starts and ends and which optional
//! parts were written. It does not decide what the directive means.

use crate::params::DestKind;

/// One raw destination item as written in `(...)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDest {
    pub kind: DestKind,
    pub value: String,
}

impl RawDest {
    #[must_use]
    pub fn link(value: impl Into<String>) -> Self {
        Self {
            kind: DestKind::Link,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: DestKind::String,
            value: value.into(),
        }
    }
}

/// Inline text captured from `[...]` with byte offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawInlineSlice {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Body lines captured between container fences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBlockSlice {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// A directive occurrence found inside a line of inline text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawInlineDirective {
    pub name: String,
    pub directive_start: usize,
    pub directive_end: usize,
    pub attrs: Option<Vec<(String, String)>>,
    pub dests: Option<Vec<RawDest>>,
    pub content: Option<RawInlineSlice>,
}

/// A directive occurrence found at block level.
///
/// Leaf blocks and containers share this record: `content` is `Some` exactly
/// when the scanner found a closing fence, i.e. the occurrence has a body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBlockDirective {
    pub name: String,
    pub directive_start_line: usize,
    pub directive_end_line: usize,
    pub attrs: Option<Vec<(String, String)>>,
    pub dests: Option<Vec<RawDest>>,
    pub inline_content: Option<RawInlineSlice>,
    pub content: Option<RawBlockSlice>,
}

impl RawBlockDirective {
    /// True if the occurrence has a captured body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.content.is_some()
    }
}
