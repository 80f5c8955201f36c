//! Macro expansion for command functions
//!
//! A template action is command text with `$name$` placeholders. Expanding
//! a template binds every placeholder from an argument compound and pushes
//! each resulting line back through the command grammar.
//!
//! ## Pipeline
//!
//! ```text
//! template:  say Hello, $name$!
//!     ↓
//! 1. Tokenize every action (placeholder.rs)
//! 2. Collect required names, first occurrence wins
//! 3. Resolve all names against the arguments (resolver.rs)
//! 4. Substitute resolved text (substitution.rs)
//! 5. Re-validate against the grammar (validation.rs)
//!     ↓
//! expanded:  say Hello, Ash!
//! ```
//!
//! Stages 1 and 3 fail for the whole procedure; stage 5 fails on the first
//! rejected action and nothing partial is returned.

pub mod error;
pub mod placeholder;
pub mod resolver;
pub mod substitution;
pub mod validation;

pub use error::MacroError;
pub use placeholder::{placeholder_names, tokenize, PlaceholderError, Segment};
pub use resolver::{resolve_arguments, ResolvedArguments};
pub use substitution::substitute;
pub use validation::{
    revalidate, CommandValidator, DispatcherValidator, ExpansionContext, GrammarError,
    DEFAULT_MAX_COMMAND_LENGTH,
};
