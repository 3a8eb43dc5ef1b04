//! Configuration for directive parsing.
//!
//! Parses `directives.toml` files with serde and provides auto-discovery of
//! config files in parent directories.
//!
//! A config file sets parser options and declares block directives that are
//! registered without writing a handler:
//!
//! ```toml
//! [parser]
//! max_nesting = 50
//!
//! [[directives]]
//! name = "note"
//! type = "container_block"
//! attrs = { class = "note" }
//! require_attrs = ["kind"]
//!
//! [directives.inline_content]
//! tag = "p"
//! token = "note_title"
//! required = false
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use directive_core::{
    BlockDirectiveConfig, CodeContainerDirectiveConfig, ContainerDirectiveConfig,
    DirectiveAttrs, DirectiveError, DirectiveKind, InlineContentDesc, LeafBlockDirectiveConfig,
    TokensDesc,
};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the nesting limit.
    pub max_nesting: Option<usize>,
    /// Override the inline directive toggle.
    pub inline_directives: Option<bool>,
    /// Override the block directive toggle.
    pub block_directives: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "directives.toml";

/// Default nesting limit, matching the parser's own default.
const DEFAULT_MAX_NESTING: usize = 100;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser options.
    pub parser: ParserConfig,
    /// Declared block directives, in registration order.
    pub directives: Vec<DirectiveDecl>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Parser options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Nesting level at which tokenizing stops.
    pub max_nesting: usize,
    /// Whether `:name` inline directives are recognized.
    pub inline_directives: bool,
    /// Whether `::name` and `:::name` block directives are recognized.
    pub block_directives: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
            inline_directives: true,
            block_directives: true,
        }
    }
}

/// One declared block directive.
#[derive(Debug, Deserialize)]
pub struct DirectiveDecl {
    /// Directive name as written after the colons.
    pub name: String,
    /// Variant tag: `container_block`, `code_block` or `leaf_block`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Element name of the container token.
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Token type prefix. Defaults to the directive name.
    pub token: Option<String>,
    /// Fixed attributes of the container token.
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Metadata attached to the container token.
    pub meta: Option<toml::Value>,
    /// Attributes an occurrence must carry to be accepted.
    #[serde(default)]
    pub require_attrs: Vec<String>,
    /// Wrapper around the `[inline content]`.
    pub inline_content: Option<InlineContentDecl>,
    /// Wrapper around the body of a container.
    pub content: Option<ContentDecl>,
}

fn default_tag() -> String {
    "div".to_owned()
}

/// Wrapper tokens around a directive's inline content.
#[derive(Debug, Deserialize)]
pub struct InlineContentDecl {
    #[serde(default = "default_inline_tag")]
    pub tag: String,
    pub token: String,
    /// Decline occurrences without inline content.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_inline_tag() -> String {
    "p".to_owned()
}

fn default_required() -> bool {
    true
}

/// Wrapper tokens around a container body.
#[derive(Debug, Deserialize)]
pub struct ContentDecl {
    #[serde(default = "default_tag")]
    pub tag: String,
    pub token: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Declaration rejected by the directive registry.
    #[error(transparent)]
    Directive(#[from] DirectiveError),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `directives.toml` in current directory and
    /// parents, falling back to defaults.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a declaration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(max_nesting) = settings.max_nesting {
            self.parser.max_nesting = max_nesting;
        }
        if let Some(enabled) = settings.inline_directives {
            self.parser.inline_directives = enabled;
        }
        if let Some(enabled) = settings.block_directives {
            self.parser.block_directives = enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_from(&std::env::current_dir().ok()?)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            directives = config.directives.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an invalid parser section or a
    /// malformed declaration, and `ConfigError::Directive` for an unknown
    /// directive type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.max_nesting == 0 {
            return Err(ConfigError::Validation(
                "parser.max_nesting must be at least 1".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for decl in &self.directives {
            if !seen.insert(decl.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "directive {:?} is declared more than once",
                    decl.name
                )));
            }
            decl.validate()?;
        }
        Ok(())
    }

    /// Turn every declaration into a registrable block directive config.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error.
    pub fn block_configs(&self) -> Result<Vec<BlockDirectiveConfig>, ConfigError> {
        self.directives
            .iter()
            .map(DirectiveDecl::to_block_config)
            .collect()
    }
}

impl DirectiveDecl {
    /// Parsed variant tag.
    ///
    /// # Errors
    ///
    /// Returns `DirectiveError::UnsupportedVariant` for an unknown tag.
    pub fn directive_kind(&self) -> Result<DirectiveKind, ConfigError> {
        Ok(DirectiveKind::parse_for(&self.name, &self.kind)?)
    }

    /// Token type prefix of the container token.
    #[must_use]
    pub fn token_name(&self) -> &str {
        self.token.as_deref().unwrap_or(&self.name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Validation(
                "directive name cannot be empty".to_owned(),
            ));
        }
        let kind = self.directive_kind()?;
        if self.inline_content.is_some() && kind == DirectiveKind::CodeBlock {
            return Err(self.unsupported("inline_content", kind));
        }
        if self.content.is_some() && kind != DirectiveKind::ContainerBlock {
            return Err(self.unsupported("content", kind));
        }
        Ok(())
    }

    fn unsupported(&self, section: &str, kind: DirectiveKind) -> ConfigError {
        ConfigError::Validation(format!(
            "directive {:?}: [{section}] is not supported for type {}",
            self.name,
            kind.as_str()
        ))
    }

    /// Build the declarative directive config.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown type or metadata that has no JSON
    /// representation.
    pub fn to_block_config(&self) -> Result<BlockDirectiveConfig, ConfigError> {
        self.validate()?;
        let kind = self.directive_kind()?;
        let meta = self.meta_json()?;
        let required = self.require_attrs.clone();

        let config = match kind {
            DirectiveKind::ContainerBlock => {
                let mut config =
                    ContainerDirectiveConfig::new(&self.name, self.container_desc(meta));
                if let Some(decl) = &self.inline_content {
                    config = config.with_inline_content(decl.desc());
                }
                if let Some(decl) = &self.content {
                    config = config.with_content(TokensDesc::new(&decl.token, &decl.tag));
                }
                if !required.is_empty() {
                    config = config.with_match(move |params, _| {
                        Ok(has_all(params.attrs(), &required))
                    });
                }
                config.into()
            }
            DirectiveKind::CodeBlock => {
                let mut config =
                    CodeContainerDirectiveConfig::new(&self.name, self.container_desc(meta));
                if !required.is_empty() {
                    config = config.with_match(move |params, _| {
                        Ok(has_all(params.attrs(), &required))
                    });
                }
                config.into()
            }
            DirectiveKind::LeafBlock => {
                let mut config =
                    LeafBlockDirectiveConfig::new(&self.name, self.container_desc(meta));
                if let Some(decl) = &self.inline_content {
                    config = config.with_inline_content(decl.desc());
                }
                if !required.is_empty() {
                    config = config.with_match(move |params, _| {
                        Ok(has_all(params.attrs.as_ref(), &required))
                    });
                }
                config.into()
            }
        };
        Ok(config)
    }

    fn container_desc<P>(&self, meta: Option<serde_json::Value>) -> TokensDesc<P> {
        let mut desc = TokensDesc::new(self.token_name(), &self.tag);
        if !self.attrs.is_empty() {
            desc = desc.with_attrs(self.attrs.iter().collect());
        }
        if let Some(meta) = meta {
            desc = desc.with_meta(meta);
        }
        desc
    }

    fn meta_json(&self) -> Result<Option<serde_json::Value>, ConfigError> {
        self.meta
            .as_ref()
            .map(|meta| {
                serde_json::to_value(meta).map_err(|e| {
                    ConfigError::Validation(format!(
                        "directive {:?}: invalid meta: {e}",
                        self.name
                    ))
                })
            })
            .transpose()
    }
}

impl InlineContentDecl {
    fn desc<P>(&self) -> InlineContentDesc<P> {
        let desc = InlineContentDesc::new(TokensDesc::new(&self.token, &self.tag));
        if self.required { desc } else { desc.optional() }
    }
}

fn has_all(attrs: Option<&DirectiveAttrs>, required: &[String]) -> bool {
    required
        .iter()
        .all(|name| attrs.is_some_and(|attrs| attrs.contains(name)))
}
