//! `directive list` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use directive_config::{Config, DirectiveDecl};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Path to configuration file (default: auto-discover directives.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ListArgs {
    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or a declaration is
    /// invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        match &config.config_path {
            Some(path) => output.highlight(&format!("Directives from {}", path.display())),
            None => output.warning("No directives.toml found"),
        }
        if config.directives.is_empty() {
            output.warning("No directives declared");
            return Ok(());
        }

        let mut stdout = io::stdout().lock();
        for decl in &config.directives {
            writeln!(stdout, "{}", describe(decl)?)?;
        }
        Ok(())
    }
}

/// One line per directive: name, type, then the emitted token and element.
fn describe(decl: &DirectiveDecl) -> Result<String, CliError> {
    let kind = decl.directive_kind()?;
    let mut line = format!(
        "{}\t{}\t{} <{}>",
        decl.name,
        kind.as_str(),
        decl.token_name(),
        decl.tag
    );
    if !decl.require_attrs.is_empty() {
        line.push_str(&format!("\trequires {}", decl.require_attrs.join(", ")));
    }
    Ok(line)
}
