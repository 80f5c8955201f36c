//! Re-validation gate
//!
//! Substituted text is only trusted after it goes back through the command
//! grammar. The grammar is reached through `CommandValidator` so expansion
//! never depends on a particular dispatcher.

use command_grammar::{CommandDispatcher, SyntaxError};
use thiserror::Error;
use tracing::trace;

use super::error::MacroError;
use crate::action::{CommandSource, SourcedCommandAction};
use crate::identifier::Identifier;

/// Default upper bound on a single command line, in characters
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 32_500;

/// Grammar rejection of one command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GrammarError {
    pub message: String,
    /// Character offset of the failure, when the grammar reports one
    pub cursor: Option<usize>,
}

impl GrammarError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cursor: None,
        }
    }

    pub fn at(message: impl Into<String>, cursor: usize) -> Self {
        Self {
            message: message.into(),
            cursor: Some(cursor),
        }
    }
}

impl From<SyntaxError> for GrammarError {
    fn from(err: SyntaxError) -> Self {
        Self::at(err.to_string(), err.cursor)
    }
}

/// Parses one command line under a source
///
/// Implementations must be callable from many threads at once.
pub trait CommandValidator: Send + Sync {
    fn validate(
        &self,
        command: &str,
        source: &CommandSource,
    ) -> Result<SourcedCommandAction, GrammarError>;
}

/// Validator backed by a `CommandDispatcher`
#[derive(Debug, Clone)]
pub struct DispatcherValidator {
    dispatcher: CommandDispatcher,
    max_command_length: usize,
}

impl DispatcherValidator {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            dispatcher,
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
        }
    }

    pub fn builtin() -> Self {
        Self::new(CommandDispatcher::builtin())
    }

    pub fn with_max_command_length(mut self, max: usize) -> Self {
        self.max_command_length = max;
        self
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn max_command_length(&self) -> usize {
        self.max_command_length
    }
}

impl CommandValidator for DispatcherValidator {
    fn validate(
        &self,
        command: &str,
        source: &CommandSource,
    ) -> Result<SourcedCommandAction, GrammarError> {
        let length = command.chars().count();
        if length > self.max_command_length {
            return Err(GrammarError::new(format!(
                "Command too long: {} characters (max {})",
                length, self.max_command_length
            )));
        }

        let parsed = self.dispatcher.parse(command)?;
        Ok(SourcedCommandAction::new(source.clone(), parsed))
    }
}

/// What expansion needs from its caller
pub struct ExpansionContext<'a> {
    /// Source every expanded action is bound to
    pub source: CommandSource,
    pub validator: &'a dyn CommandValidator,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(source: CommandSource, validator: &'a dyn CommandValidator) -> Self {
        Self { source, validator }
    }
}

/// Run one substituted action through the grammar
pub fn revalidate(
    procedure: &Identifier,
    action_index: usize,
    command: &str,
    ctx: &ExpansionContext<'_>,
) -> Result<SourcedCommandAction, MacroError> {
    match ctx.validator.validate(command, &ctx.source) {
        Ok(action) => Ok(action),
        Err(error) => {
            trace!(procedure = %procedure, action_index, command, %error, "expanded action rejected");
            Err(MacroError::InvalidExpansion {
                procedure: procedure.clone(),
                action_index,
                error,
            })
        }
    }
}
