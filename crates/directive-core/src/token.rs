//! Output token model shared by the core and host parsers.

use serde::Serialize;
use serde_json::Value;

/// Nesting delta of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "i8")]
pub enum Nesting {
    /// Opening tag (+1).
    Open,
    /// Self-contained token (0).
    SelfClosing,
    /// Closing tag (-1).
    Close,
}

impl Nesting {
    /// Level change this token applies to the enclosing stream.
    #[must_use]
    pub fn delta(self) -> i8 {
        match self {
            Self::Open => 1,
            Self::SelfClosing => 0,
            Self::Close => -1,
        }
    }
}

impl From<Nesting> for i8 {
    fn from(nesting: Nesting) -> Self {
        nesting.delta()
    }
}

/// A single token of the parser's output stream.
///
/// Tokens are appended by host rules and directive handlers. The core only
/// ever writes to the most recently pushed token.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Token {
    /// Type tag, e.g. `paragraph_open` or `note_close`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Output element name, e.g. `div`. Empty for non-element tokens.
    pub tag: String,
    /// Nesting delta.
    pub nesting: Nesting,
    /// Ordered attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Vec<(String, String)>>,
    /// Source line range `[begin, end)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<[usize; 2]>,
    /// Nesting level at which the token was pushed.
    pub level: usize,
    /// Child tokens, for `inline` carriers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Token>>,
    /// Literal content.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Markup string, e.g. `:::note` or `**`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub markup: String,
    /// Info string, e.g. a fence language.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub info: String,
    /// Opaque handler metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// True for block-level tokens.
    pub block: bool,
    /// True if renderers should skip the token.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl Token {
    /// Create a token with empty optional fields.
    #[must_use]
    pub fn new(kind: impl Into<String>, tag: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            kind: kind.into(),
            tag: tag.into(),
            nesting,
            attrs: None,
            map: None,
            level: 0,
            children: None,
            content: String::new(),
            markup: String::new(),
            info: String::new(),
            meta: None,
            block: false,
            hidden: false,
        }
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
