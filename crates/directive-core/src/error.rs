//! Directive error types.

use std::error::Error as StdError;

/// Boxed error produced by a directive handler or match predicate.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result alias used by handlers, predicates and host callbacks.
pub type DirectiveResult<T> = Result<T, DirectiveError>;

/// Errors raised by the directive core.
///
/// A handler declining an occurrence is not an error: it returns `Ok(false)`.
/// The variants here are either misconfiguration, surfaced at registration
/// time, or failures raised by handlers that propagate out of the parse.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    /// Directive name contains characters the syntax layer never produces.
    #[error("Invalid directive name {name:?}: expected ASCII letters, digits, '-' or '_'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// Declarative directive requested a variant that does not exist.
    #[error("Unsupported directive type {kind:?} for directive {name:?}")]
    UnsupportedVariant {
        /// Directive name.
        name: String,
        /// The unrecognized variant tag.
        kind: String,
    },
    /// A handler or match predicate failed.
    #[error("Directive {name:?} failed: {source}")]
    Handler {
        /// Directive name.
        name: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

impl DirectiveError {
    /// Create a handler failure for the named directive.
    ///
    /// ```
    /// use directive_core::DirectiveError;
    ///
    /// let err = DirectiveError::handler("note", "missing title");
    /// assert_eq!(err.to_string(), r#"Directive "note" failed: missing title"#);
    /// ```
    pub fn handler(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Handler {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Check that a directive name is one the syntax layer can produce.
pub(crate) fn validate_name(name: &str) -> DirectiveResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DirectiveError::InvalidName {
            name: name.to_owned(),
        })
    }
}
