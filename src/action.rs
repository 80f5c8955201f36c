//! Sourced command actions
//!
//! A concrete, grammar-validated command bound to the source it runs under.

use command_grammar::ParsedCommand;
use serde::{Deserialize, Serialize};

/// Who a command runs as
///
/// Carried as context only; nothing in this crate checks permissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandSource {
    pub name: String,
    pub permission_level: u8,
}

impl CommandSource {
    pub fn new(name: impl Into<String>, permission_level: u8) -> Self {
        Self {
            name: name.into(),
            permission_level,
        }
    }
}

impl Default for CommandSource {
    fn default() -> Self {
        Self::new("server", 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedCommandAction {
    source: CommandSource,
    command: ParsedCommand,
}

impl SourcedCommandAction {
    pub fn new(source: CommandSource, command: ParsedCommand) -> Self {
        Self { source, command }
    }

    pub fn source(&self) -> &CommandSource {
        &self.source
    }

    pub fn command(&self) -> &ParsedCommand {
        &self.command
    }

    /// The command line as validated
    pub fn text(&self) -> &str {
        &self.command.text
    }
}
