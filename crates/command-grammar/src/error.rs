//! Grammar error types
//!
//! `SyntaxError` is what the dispatcher reports for a rejected command line.
//! `UsageError` and `GrammarConfigError` cover building the command tree.

use std::fmt;

use thiserror::Error;

/// How many characters of input are echoed before the `<--[HERE]` marker
const CONTEXT_AMOUNT: usize = 10;

/// Why a command line was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Unknown command")]
    UnknownCommand,

    #[error("Incorrect argument for command")]
    IncorrectArgument,

    #[error("Expected {0}")]
    ExpectedArgument(String),

    #[error("Invalid integer '{0}'")]
    InvalidInteger(String),

    #[error("Invalid float '{0}'")]
    InvalidFloat(String),

    #[error("Invalid boolean '{0}', expected 'true' or 'false'")]
    InvalidBool(String),

    #[error("Invalid resource location '{0}'")]
    InvalidResource(String),

    #[error("Integer must not be less than {min}, found {value}")]
    IntegerTooLow { value: i64, min: i64 },

    #[error("Integer must not be more than {max}, found {value}")]
    IntegerTooHigh { value: i64, max: i64 },

    #[error("Float must not be less than {min}, found {value}")]
    FloatTooLow { value: f64, min: f64 },

    #[error("Float must not be more than {max}, found {value}")]
    FloatTooHigh { value: f64, max: f64 },

    #[error("Invalid quoted string")]
    InvalidQuotedString,

    #[error("Expected whitespace to end one argument, but found trailing data")]
    ExpectedWhitespace,

    #[error("Incorrect argument for command: trailing data")]
    TrailingData,

    #[error("Unknown or incomplete command")]
    IncompleteCommand,
}

/// A command line rejected by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub input: String,
    /// Byte offset into `input` where parsing failed
    pub cursor: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, input: impl Into<String>, cursor: usize) -> Self {
        Self {
            kind,
            input: input.into(),
            cursor,
        }
    }

    /// The input up to the cursor, shortened to the last few characters
    pub fn context(&self) -> String {
        let cursor = self.cursor.min(self.input.len());
        let before = self.input.get(..cursor).unwrap_or(&self.input);
        let count = before.chars().count();
        if count > CONTEXT_AMOUNT {
            let tail: String = before.chars().skip(count - CONTEXT_AMOUNT).collect();
            format!("...{}", tail)
        } else {
            before.to_string()
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {}: {}<--[HERE]",
            self.kind,
            self.cursor,
            self.context()
        )
    }
}

impl std::error::Error for SyntaxError {}

/// A usage line that could not be turned into tree nodes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid usage '{usage}': {message}")]
pub struct UsageError {
    pub usage: String,
    pub message: String,
}

impl UsageError {
    pub fn new(usage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            message: message.into(),
        }
    }
}

/// Errors loading a command tree from a grammar file
#[derive(Debug, Error)]
pub enum GrammarConfigError {
    #[error("Failed to parse grammar file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Usage(#[from] UsageError),
}
