//! CLI error types.

use directive_config::ConfigError;
use directive_markdown::{DirectiveError, ParseError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Directive(#[from] DirectiveError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
