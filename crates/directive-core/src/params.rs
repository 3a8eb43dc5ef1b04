//! Canonical directive parameters.
//!
//! One parameter type per directive shape. Optional fields distinguish three
//! states: `None` means the syntax was absent, `Some` of an empty value means
//! it was present but empty, anything else is populated. Handlers rely on the
//! difference between `:dir` and `:dir{}`.

/// Insertion-ordered directive attributes.
///
/// # Example
///
/// ```
/// use directive_core::DirectiveAttrs;
///
/// let mut attrs = DirectiveAttrs::new();
/// attrs.insert("label", "first");
/// attrs.insert("id", "second");
/// attrs.insert("label", "third");
///
/// assert_eq!(attrs.get("label"), Some("third"));
/// assert_eq!(attrs.to_pairs()[0].0, "label");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveAttrs(Vec<(String, String)>);

impl DirectiveAttrs {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing the value in place if the name exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether an attribute is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Owned pairs, in the form tokens store attributes.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0.clone()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DirectiveAttrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

/// Kind of a raw destination item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestKind {
    /// Unquoted destination, e.g. `path/to/page`.
    Link,
    /// Quoted destination, e.g. `"title"`.
    String,
}

/// Canonical destinations of a directive.
///
/// `link` and `string` hold the first item of each kind; `original` keeps the
/// full list as written for handlers that need positional access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveDests {
    pub link: Option<String>,
    pub string: Option<String>,
    /// All destinations in source order (`_original_dests`).
    pub original: Vec<(DestKind, String)>,
}

/// Inline content captured from `[...]`, with byte offsets into the source
/// the directive was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineContent {
    pub raw: String,
    pub start_pos: usize,
    pub end_pos: usize,
}

/// Body of a container directive: the lines between the fences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockContent {
    pub raw: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Parameters of an inline directive: `:name[content](dests){attrs}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineParams {
    /// Offset of the leading colon.
    pub start_pos: usize,
    /// Offset just past the directive.
    pub end_pos: usize,
    pub attrs: Option<DirectiveAttrs>,
    pub dests: Option<DirectiveDests>,
    pub content: Option<InlineContent>,
}

/// Parameters of a leaf block directive: `::name[content](dests){attrs}`.
///
/// Carries at most one line of inline content and never a body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafBlockParams {
    /// First line of the directive.
    pub start_line: usize,
    /// Line just past the directive.
    pub end_line: usize,
    pub attrs: Option<DirectiveAttrs>,
    pub dests: Option<DirectiveDests>,
    pub inline_content: Option<InlineContent>,
}

/// Parameters of a container directive: a leaf block header plus a body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerParams {
    /// Header fields; line range covers both fences.
    pub block: LeafBlockParams,
    /// Lines between the opening and closing fence.
    pub content: BlockContent,
}

impl ContainerParams {
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.block.start_line
    }

    #[must_use]
    pub fn end_line(&self) -> usize {
        self.block.end_line
    }

    #[must_use]
    pub fn attrs(&self) -> Option<&DirectiveAttrs> {
        self.block.attrs.as_ref()
    }

    #[must_use]
    pub fn dests(&self) -> Option<&DirectiveDests> {
        self.block.dests.as_ref()
    }

    #[must_use]
    pub fn inline_content(&self) -> Option<&InlineContent> {
        self.block.inline_content.as_ref()
    }
}
