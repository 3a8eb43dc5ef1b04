//! `directive tokens` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use directive_config::{CliSettings, Config};
use directive_markdown::Env;

use super::build_parser;
use crate::error::CliError;

/// Arguments for the tokens command.
#[derive(Args)]
pub(crate) struct TokensArgs {
    /// Markdown file to parse.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover directives.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not recognize `:name` inline directives.
    #[arg(long)]
    no_inline: bool,

    /// Do not recognize `::name` and `:::name` block directives.
    #[arg(long)]
    no_block: bool,

    /// Nesting level at which tokenizing stops.
    #[arg(long, env = "DIRECTIVE_MAX_NESTING")]
    max_nesting: Option<usize>,

    /// Enable verbose output (debug level logging).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl TokensArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            max_nesting: self.max_nesting,
            inline_directives: self.no_inline.then_some(false),
            block_directives: self.no_block.then_some(false),
        }
    }

    /// Execute the tokens command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or the file cannot be loaded, or a
    /// directive handler fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let md = build_parser(&config)?;

        let src = std::fs::read_to_string(&self.file)?;
        let mut env = Env::new();
        let tokens = md.parse(&src, &mut env)?;
        tracing::info!(
            file = %self.file.display(),
            tokens = tokens.len(),
            "Tokenized file"
        );

        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &tokens)?;
        writeln!(stdout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: TokensArgs,
    }

    #[test]
    fn test_cli_settings_from_flags() {
        let wrapper =
            Wrapper::try_parse_from(["tokens", "doc.md", "--no-block", "--max-nesting", "8"])
                .unwrap();
        let settings = wrapper.args.cli_settings();

        assert_eq!(wrapper.args.file, PathBuf::from("doc.md"));
        assert_eq!(settings.max_nesting, Some(8));
        assert_eq!(settings.inline_directives, None);
        assert_eq!(settings.block_directives, Some(false));
    }

    #[test]
    fn test_cli_settings_default_to_config() {
        let wrapper = Wrapper::try_parse_from(["tokens", "doc.md"]).unwrap();
        let settings = wrapper.args.cli_settings();

        assert_eq!(settings.inline_directives, None);
        assert_eq!(settings.block_directives, None);
        assert!(!wrapper.args.verbose);
    }
}
