//! Procedure Registry
//!
//! Stores procedures by identifier and is the entry point for invoking them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::arguments::ArgumentCompound;
use crate::identifier::Identifier;
use crate::loader::{self, LoadError, LoadReport};
use crate::macros::{ExpansionContext, MacroError};
use crate::procedure::{ExpandedProcedure, Procedure};

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Unknown procedure: {0}")]
    UnknownProcedure(Identifier),

    #[error(transparent)]
    Macro(#[from] MacroError),
}

/// Registry of all loaded procedures
///
/// Procedures are shared through `Arc` and never mutated after insertion,
/// so one registry can serve invocations from many threads.
#[derive(Debug, Clone, Default)]
pub struct ProcedureRegistry {
    procedures: HashMap<Identifier, Arc<Procedure>>,

    /// Source files loaded
    source_files: Vec<PathBuf>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every function file under `dir`
    ///
    /// See `loader::load_registry_from_dir`.
    pub fn load_from_dir(
        dir: &Path,
        extension: &str,
        ctx: &ExpansionContext<'_>,
    ) -> Result<(Self, LoadReport), LoadError> {
        loader::load_registry_from_dir(dir, extension, ctx)
    }

    pub fn get(&self, id: &Identifier) -> Option<&Arc<Procedure>> {
        self.procedures.get(id)
    }

    pub fn has(&self, id: &Identifier) -> bool {
        self.procedures.contains_key(id)
    }

    /// All identifiers, sorted
    pub fn ids(&self) -> Vec<&Identifier> {
        let mut ids: Vec<_> = self.procedures.keys().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Arc<Procedure>)> {
        self.procedures.iter()
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Add a procedure, returning the one it replaced
    pub fn add(&mut self, procedure: impl Into<Procedure>) -> Option<Arc<Procedure>> {
        let procedure = procedure.into();
        let id = procedure.id().clone();
        let previous = self.procedures.insert(id, Arc::new(procedure));
        if let Some(previous) = &previous {
            debug!("Replaced procedure {}", previous.id());
        }
        previous
    }

    /// Record a file as loaded
    pub fn add_source_file(&mut self, path: impl Into<PathBuf>) {
        self.source_files.push(path.into());
    }

    /// Merge another registry into this one; `other` wins on collisions
    pub fn merge(&mut self, other: ProcedureRegistry) {
        for (id, procedure) in other.procedures {
            self.procedures.insert(id, procedure);
        }
        self.source_files.extend(other.source_files);
    }

    /// Get source files that were loaded
    pub fn source_files(&self) -> &[PathBuf] {
        &self.source_files
    }

    /// Look up and expand a procedure
    pub fn invoke(
        &self,
        id: &Identifier,
        arguments: Option<&ArgumentCompound>,
        ctx: &ExpansionContext<'_>,
    ) -> Result<Arc<ExpandedProcedure>, InvocationError> {
        let procedure = self
            .get(id)
            .ok_or_else(|| InvocationError::UnknownProcedure(id.clone()))?;
        trace!(procedure = %id, template = procedure.is_template(), "invoking procedure");
        Ok(procedure.expand(arguments, ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CommandSource;
    use crate::macros::DispatcherValidator;
    use crate::procedure::{RawActionTemplate, TemplateProcedure};

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn greet() -> TemplateProcedure {
        TemplateProcedure::new(id("test:greet"), vec![RawActionTemplate::new("say hello $name$")])
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProcedureRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get(&id("test:greet")).is_none());
    }

    #[test]
    fn test_add_and_replace() {
        let mut registry = ProcedureRegistry::new();
        assert!(registry.add(greet()).is_none());
        assert!(registry.has(&id("test:greet")));

        let replaced = registry.add(ExpandedProcedure::new(id("test:greet"), Vec::new()));
        assert!(replaced.unwrap().is_template());
        assert_eq!(registry.len(), 1);
        assert!(!registry.get(&id("test:greet")).unwrap().is_template());
    }

    #[test]
    fn test_ids_sorted() {
        let mut registry = ProcedureRegistry::new();
        registry.add(ExpandedProcedure::new(id("b:z"), Vec::new()));
        registry.add(ExpandedProcedure::new(id("a:y"), Vec::new()));
        registry.add(ExpandedProcedure::new(id("a:x"), Vec::new()));
        let ids: Vec<String> = registry.ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["a:x", "a:y", "b:z"]);
    }

    #[test]
    fn test_merge() {
        let mut first = ProcedureRegistry::new();
        first.add(ExpandedProcedure::new(id("a:one"), Vec::new()));
        first.add_source_file("a/one.mcfunction");

        let mut second = ProcedureRegistry::new();
        second.add(greet());
        second.add_source_file("test/greet.mcfunction");

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.source_files().len(), 2);
    }

    #[test]
    fn test_invoke() {
        let validator = DispatcherValidator::builtin();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let mut registry = ProcedureRegistry::new();
        registry.add(greet());

        let args = ArgumentCompound::new().with("name", "Ash");
        let expanded = registry.invoke(&id("test:greet"), Some(&args), &ctx).unwrap();
        assert_eq!(expanded.commands().collect::<Vec<_>>(), vec!["say hello Ash"]);

        let err = registry.invoke(&id("test:greet"), None, &ctx).unwrap_err();
        assert!(matches!(
            err,
            InvocationError::Macro(MacroError::MissingArguments { .. })
        ));

        let err = registry.invoke(&id("test:nope"), None, &ctx).unwrap_err();
        assert!(matches!(err, InvocationError::UnknownProcedure(_)));
    }
}
