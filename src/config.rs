//! Engine configuration
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no file
//! at all) is a valid configuration.
//!
//! ```yaml
//! functions_dir: functions
//! file_extension: mcfunction
//! default_namespace: minecraft
//! load_source:
//!   name: server
//!   permission_level: 2
//! grammar_file: grammar.yaml
//! max_command_length: 32500
//! ```
//!
//! Resolution order for `EngineConfig::from_env`:
//! 1. `CMDFN_CONFIG` environment variable (explicit file)
//! 2. `cmdfn.yaml` in the current directory
//! 3. Built-in defaults
//!
//! Then `CMDFN_FUNCTIONS_DIR` and `CMDFN_DEFAULT_NAMESPACE` override the
//! matching fields.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use command_grammar::{CommandDispatcher, CommandTree};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::CommandSource;
use crate::identifier::{Identifier, IdentifierError, DEFAULT_NAMESPACE};
use crate::loader::{load_registry_from_dir, LoadReport};
use crate::macros::{DispatcherValidator, ExpansionContext, DEFAULT_MAX_COMMAND_LENGTH};
use crate::registry::ProcedureRegistry;

pub const CONFIG_ENV: &str = "CMDFN_CONFIG";
pub const FUNCTIONS_DIR_ENV: &str = "CMDFN_FUNCTIONS_DIR";
pub const DEFAULT_NAMESPACE_ENV: &str = "CMDFN_DEFAULT_NAMESPACE";
pub const DEFAULT_CONFIG_FILE: &str = "cmdfn.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of `<namespace>/<path>.<extension>` function files
    pub functions_dir: PathBuf,
    pub file_extension: String,
    /// Namespace for identifiers written without one
    pub default_namespace: String,
    /// Source literal functions are validated under at load
    pub load_source: CommandSource,
    /// YAML list of usage lines; the built-in grammar when absent
    pub grammar_file: Option<PathBuf>,
    pub max_command_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            functions_dir: PathBuf::from("functions"),
            file_extension: "mcfunction".to_string(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            load_source: CommandSource::default(),
            grammar_file: None,
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse engine config")?;
        Ok(config)
    }

    /// Load a config file
    ///
    /// Relative paths inside the file are taken relative to the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading engine config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Resolve config from the process environment
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::resolve(|key| std::env::var(key).ok(), &cwd)
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>, cwd: &Path) -> Result<Self> {
        let mut config = if let Some(path) = lookup(CONFIG_ENV) {
            Self::load(Path::new(&path))?
        } else if cwd.join(DEFAULT_CONFIG_FILE).exists() {
            Self::load(&cwd.join(DEFAULT_CONFIG_FILE))?
        } else {
            debug!("No engine config file found, using defaults");
            Self::default()
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    /// Apply `CMDFN_*` overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(FUNCTIONS_DIR_ENV) {
            self.functions_dir = PathBuf::from(dir);
        }
        if let Some(namespace) = lookup(DEFAULT_NAMESPACE_ENV) {
            self.default_namespace = namespace;
        }
    }

    fn rebase(&mut self, base: &Path) {
        if self.functions_dir.is_relative() {
            self.functions_dir = base.join(&self.functions_dir);
        }
        if let Some(grammar) = self.grammar_file.as_mut() {
            if grammar.is_relative() {
                *grammar = base.join(&*grammar);
            }
        }
    }

    /// Command tree from `grammar_file`, or the built-in one
    pub fn command_tree(&self) -> Result<CommandTree> {
        let Some(path) = &self.grammar_file else {
            return Ok(CommandTree::builtin());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grammar {}", path.display()))?;
        CommandTree::from_yaml_str(&content)
            .with_context(|| format!("Failed to load grammar {}", path.display()))
    }

    pub fn validator(&self) -> Result<DispatcherValidator> {
        let dispatcher = CommandDispatcher::new(self.command_tree()?);
        Ok(DispatcherValidator::new(dispatcher).with_max_command_length(self.max_command_length))
    }

    /// Parse an identifier using the configured default namespace
    pub fn parse_identifier(&self, s: &str) -> Result<Identifier, IdentifierError> {
        Identifier::parse_with_default(s, &self.default_namespace)
    }

    /// Load `functions_dir` into a registry
    pub fn load_registry(&self, ctx: &ExpansionContext<'_>) -> Result<(ProcedureRegistry, LoadReport)> {
        let loaded = load_registry_from_dir(&self.functions_dir, &self.file_extension, ctx)
            .with_context(|| format!("Failed to load functions from {}", self.functions_dir.display()))?;
        Ok(loaded)
    }
}
