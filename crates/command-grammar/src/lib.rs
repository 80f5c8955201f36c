//! command-grammar: command tree and dispatcher for command functions
//!
//! This crate contains the pure grammar logic with NO knowledge of procedures
//! or macros:
//! - Usage-line parser (`say <message:greedy>`) built on nom
//! - Command tree assembled from usage lines (YAML loadable)
//! - Typed argument parsers (word, string, greedy, integer, float, bool, resource)
//! - Dispatcher that parses one command line into a `ParsedCommand`
//!
//! ## Pipeline
//!
//! ```text
//! usage lines (built-in or YAML)
//!     ↓
//! CommandTree::register()
//!     ↓
//! CommandDispatcher::parse("scoreboard players set @s kills 5")
//!     ↓
//! ParsedCommand { nodes: [scoreboard, players, set, targets=@s, objective=kills, score=5] }
//! ```

pub mod dispatcher;
pub mod error;
pub mod kind;
pub mod parser;
pub mod tree;
pub mod value;

pub use dispatcher::CommandDispatcher;
pub use error::{GrammarConfigError, SyntaxError, SyntaxErrorKind, UsageError};
pub use kind::ArgumentKind;
pub use tree::{CommandNode, CommandTree, NodeKind, BUILTIN_USAGES};
pub use value::{ArgumentValue, ParsedCommand, ParsedNode};
