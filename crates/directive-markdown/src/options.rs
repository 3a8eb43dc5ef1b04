//! Parser options.

/// Default limit on token nesting depth.
pub const DEFAULT_MAX_NESTING: usize = 100;

/// Options of a [`MarkdownParser`](crate::MarkdownParser).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Nesting level at which tokenizing stops.
    ///
    /// Once the token level reaches this value, the block pass skips the
    /// rest of its range and the inline pass treats the rest of its range as
    /// plain text.
    ///
    /// Default: 100
    pub max_nesting: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Set the nesting limit.
    #[must_use]
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}
