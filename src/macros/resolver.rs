//! Argument resolution
//!
//! Looks up every placeholder name a template needs in the caller's
//! argument compound. All names are checked before failing so the error
//! reports the complete missing set at once.

use std::collections::HashMap;

use tracing::debug;

use super::error::MacroError;
use crate::arguments::ArgumentCompound;
use crate::identifier::Identifier;

/// Canonical text for each required name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArguments {
    values: HashMap<String, String>,
}

impl ResolvedArguments {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolve `required` names against `arguments`
///
/// `required` is expected in first-occurrence order without duplicates;
/// the missing list preserves that order. Extra entries in `arguments` are
/// ignored. `None` behaves like an empty compound.
pub fn resolve_arguments(
    procedure: &Identifier,
    required: &[&str],
    arguments: Option<&ArgumentCompound>,
) -> Result<ResolvedArguments, MacroError> {
    let mut values = HashMap::with_capacity(required.len());
    let mut missing = Vec::new();

    for name in required {
        match arguments.and_then(|args| args.get(name)) {
            Some(value) => {
                values.insert((*name).to_string(), value.to_macro_text());
            }
            None => missing.push((*name).to_string()),
        }
    }

    if !missing.is_empty() {
        debug!(procedure = %procedure, missing = ?missing, "missing macro arguments");
        return Err(MacroError::MissingArguments {
            procedure: procedure.clone(),
            names: missing,
        });
    }

    Ok(ResolvedArguments { values })
}
