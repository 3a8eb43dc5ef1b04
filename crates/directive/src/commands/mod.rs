//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod tokens;

pub(crate) use list::ListArgs;
pub(crate) use tokens::TokensArgs;

use directive_config::Config;
use directive_markdown::{MarkdownParser, ParserOptions};

use crate::error::CliError;

/// Build a parser with the configured options, toggles and directives.
pub(crate) fn build_parser(config: &Config) -> Result<MarkdownParser, CliError> {
    let options = ParserOptions::new().with_max_nesting(config.parser.max_nesting);
    let mut md = MarkdownParser::with_options(options);

    for block_config in config.block_configs()? {
        md.register_block_config(block_config)?;
    }
    if !config.parser.inline_directives {
        md.disable_inline_directives();
    }
    if !config.parser.block_directives {
        md.disable_block_directives();
    }

    Ok(md)
}
