//! command-functions: stored command procedures with macro expansion
//!
//! A function file is a list of commands. Files that use `$name$`
//! placeholders are kept as templates and expanded per invocation; all other
//! files are validated once at load and invoked as-is.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use command_functions::{
//!     ArgumentCompound, CommandSource, DispatcherValidator, ExpansionContext, Identifier,
//!     ProcedureRegistry,
//! };
//!
//! let validator = DispatcherValidator::builtin();
//! let ctx = ExpansionContext::new(CommandSource::default(), &validator);
//! let (registry, _report) =
//!     ProcedureRegistry::load_from_dir("functions".as_ref(), "mcfunction", &ctx).unwrap();
//!
//! let args = ArgumentCompound::new().with("name", "Ash");
//! let id = Identifier::parse("test:greet").unwrap();
//! let expanded = registry.invoke(&id, Some(&args), &ctx).unwrap();
//! for command in expanded.commands() {
//!     println!("{command}");
//! }
//! ```

pub mod action;
pub mod arguments;
pub mod config;
pub mod identifier;
pub mod loader;
pub mod macros;
pub mod procedure;
pub mod registry;

pub use action::{CommandSource, SourcedCommandAction};
pub use arguments::{ArgValue, ArgumentCompound, ArgumentError};
pub use config::EngineConfig;
pub use identifier::{Identifier, IdentifierError};
pub use loader::{LoadError, LoadReport};
pub use macros::{
    CommandValidator, DispatcherValidator, ExpansionContext, GrammarError, MacroError,
    PlaceholderError,
};
pub use procedure::{ExpandedProcedure, Procedure, RawActionTemplate, TemplateProcedure};
pub use registry::{InvocationError, ProcedureRegistry};
