//! Procedures
//!
//! A procedure is either a template whose actions still carry `$name$`
//! placeholders, or an expanded list of validated actions. Both variants
//! answer `expand`; for expanded procedures it is the identity.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::action::SourcedCommandAction;
use crate::arguments::ArgumentCompound;
use crate::identifier::Identifier;
use crate::macros::placeholder::{placeholder_names, tokenize, PlaceholderError, Segment, Tokenizer};
use crate::macros::{resolve_arguments, revalidate, substitute, ExpansionContext, MacroError};

/// Raw text of one template action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawActionTemplate {
    text: String,
    /// 1-based source line, 0 when built in code
    line: usize,
}

impl RawActionTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self::at_line(text, 0)
    }

    pub fn at_line(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn tokenize(&self) -> Tokenizer<'_> {
        tokenize(&self.text)
    }

    /// True if any placeholder marker appears in the text
    pub fn has_placeholders(&self) -> Result<bool, PlaceholderError> {
        let mut found = false;
        for name in placeholder_names(&self.text) {
            name?;
            found = true;
        }
        Ok(found)
    }
}

impl From<&str> for RawActionTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Procedure with every action resolved and validated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedProcedure {
    id: Identifier,
    actions: Vec<SourcedCommandAction>,
}

impl ExpandedProcedure {
    pub fn new(id: Identifier, actions: Vec<SourcedCommandAction>) -> Self {
        Self { id, actions }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn actions(&self) -> &[SourcedCommandAction] {
        &self.actions
    }

    /// Command text of each action, in order
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(SourcedCommandAction::text)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Procedure still holding raw action templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateProcedure {
    id: Identifier,
    templates: Vec<RawActionTemplate>,
}

impl TemplateProcedure {
    /// Wrap templates as-is
    ///
    /// Use `Procedure::from_templates` to get placeholder-free templates
    /// normalized to an expanded procedure.
    pub fn new(id: Identifier, templates: Vec<RawActionTemplate>) -> Self {
        Self { id, templates }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn templates(&self) -> &[RawActionTemplate] {
        &self.templates
    }

    /// Placeholder names across all actions, first occurrence order
    pub fn required_names(&self) -> Result<Vec<&str>, MacroError> {
        let mut required: Vec<&str> = Vec::new();
        for (action_index, template) in self.templates.iter().enumerate() {
            for name in placeholder_names(template.text()) {
                let name = name.map_err(|reason| self.malformed(action_index, reason))?;
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
        Ok(required)
    }

    /// Bind every placeholder and re-validate each action
    pub fn expand(
        &self,
        arguments: Option<&ArgumentCompound>,
        ctx: &ExpansionContext<'_>,
    ) -> Result<Arc<ExpandedProcedure>, MacroError> {
        let mut tokenized: Vec<Vec<Segment<'_>>> = Vec::with_capacity(self.templates.len());
        for (action_index, template) in self.templates.iter().enumerate() {
            let segments = template
                .tokenize()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|reason| self.malformed(action_index, reason))?;
            tokenized.push(segments);
        }

        let mut required: Vec<&str> = Vec::new();
        for segment in tokenized.iter().flatten() {
            if let Segment::Placeholder(name) = segment {
                if !required.contains(name) {
                    required.push(*name);
                }
            }
        }

        let resolved = resolve_arguments(&self.id, &required, arguments)?;

        let mut actions = Vec::with_capacity(tokenized.len());
        for (action_index, segments) in tokenized.iter().enumerate() {
            let command = substitute(segments, &resolved);
            actions.push(revalidate(&self.id, action_index, &command, ctx)?);
        }

        debug!(
            procedure = %self.id,
            actions = actions.len(),
            arguments = resolved.len(),
            source = %ctx.source.name,
            "expanded template procedure"
        );
        Ok(Arc::new(ExpandedProcedure::new(self.id.clone(), actions)))
    }

    fn malformed(&self, action_index: usize, reason: PlaceholderError) -> MacroError {
        MacroError::MalformedPlaceholder {
            procedure: self.id.clone(),
            action_index,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Procedure {
    Template(TemplateProcedure),
    Expanded(Arc<ExpandedProcedure>),
}

impl Procedure {
    /// Build from templates; without placeholders every action is validated now
    pub fn from_templates(
        id: Identifier,
        templates: Vec<RawActionTemplate>,
        ctx: &ExpansionContext<'_>,
    ) -> Result<Self, MacroError> {
        let template = TemplateProcedure::new(id, templates);
        if template.required_names()?.is_empty() {
            Ok(Procedure::Expanded(template.expand(None, ctx)?))
        } else {
            Ok(Procedure::Template(template))
        }
    }

    pub fn id(&self) -> &Identifier {
        match self {
            Procedure::Template(template) => template.id(),
            Procedure::Expanded(expanded) => expanded.id(),
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self, Procedure::Template(_))
    }

    /// Number of actions, templated or not
    pub fn len(&self) -> usize {
        match self {
            Procedure::Template(template) => template.templates().len(),
            Procedure::Expanded(expanded) => expanded.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand into concrete actions
    ///
    /// An expanded procedure returns itself (the same `Arc`) and ignores
    /// `arguments`.
    pub fn expand(
        &self,
        arguments: Option<&ArgumentCompound>,
        ctx: &ExpansionContext<'_>,
    ) -> Result<Arc<ExpandedProcedure>, MacroError> {
        match self {
            Procedure::Template(template) => template.expand(arguments, ctx),
            Procedure::Expanded(expanded) => Ok(Arc::clone(expanded)),
        }
    }
}

impl From<TemplateProcedure> for Procedure {
    fn from(template: TemplateProcedure) -> Self {
        Procedure::Template(template)
    }
}

impl From<ExpandedProcedure> for Procedure {
    fn from(expanded: ExpandedProcedure) -> Self {
        Procedure::Expanded(Arc::new(expanded))
    }
}

impl From<Arc<ExpandedProcedure>> for Procedure {
    fn from(expanded: Arc<ExpandedProcedure>) -> Self {
        Procedure::Expanded(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CommandSource;
    use crate::macros::{CommandValidator, DispatcherValidator, GrammarError};
    use command_grammar::ParsedCommand;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Accepts anything not starting with "bad", recording what it saw
    #[derive(Default)]
    struct RecordingValidator {
        seen: Mutex<Vec<String>>,
    }

    impl CommandValidator for RecordingValidator {
        fn validate(
            &self,
            command: &str,
            source: &CommandSource,
        ) -> Result<SourcedCommandAction, GrammarError> {
            self.seen.lock().unwrap().push(command.to_string());
            if command.starts_with("bad") {
                return Err(GrammarError::at("Unknown command", 0));
            }
            Ok(SourcedCommandAction::new(
                source.clone(),
                ParsedCommand::new(command, Vec::new()),
            ))
        }
    }

    fn id() -> Identifier {
        Identifier::parse("test:greet").unwrap()
    }

    fn template(lines: &[&str]) -> TemplateProcedure {
        TemplateProcedure::new(id(), lines.iter().map(|l| RawActionTemplate::from(*l)).collect())
    }

    #[test]
    fn test_greet() {
        let validator = DispatcherValidator::builtin();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let procedure = Procedure::from(template(&["say hello $name$"]));
        let args = ArgumentCompound::new().with("name", "Ash");

        let expanded = procedure.expand(Some(&args), &ctx).unwrap();
        assert_eq!(expanded.id(), &id());
        assert_eq!(expanded.commands().collect::<Vec<_>>(), vec!["say hello Ash"]);
        assert_eq!(expanded.actions()[0].source(), &CommandSource::default());
    }

    #[test]
    fn test_expanded_is_identity() {
        let validator = DispatcherValidator::builtin();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let procedure = Procedure::from_templates(id(), vec!["say hi".into()], &ctx).unwrap();
        assert!(!procedure.is_template());

        let Procedure::Expanded(stored) = &procedure else {
            panic!("expected expanded procedure");
        };
        let args = ArgumentCompound::new().with("name", "ignored");
        let first = procedure.expand(None, &ctx).unwrap();
        let second = procedure.expand(Some(&args), &ctx).unwrap();
        assert!(Arc::ptr_eq(stored, &first));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_expansion_result_is_stable() {
        let validator = DispatcherValidator::builtin();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let args = ArgumentCompound::new().with("name", "Ash");
        let once = Procedure::from(template(&["say hello $name$"]))
            .expand(Some(&args), &ctx)
            .unwrap();
        let again = Procedure::from(Arc::clone(&once)).expand(None, &ctx).unwrap();
        assert!(Arc::ptr_eq(&once, &again));
    }

    #[test]
    fn test_placeholder_free_template_expands_verbatim() {
        let validator = RecordingValidator::default();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let expanded = template(&["say a", "kill"]).expand(None, &ctx).unwrap();
        assert_eq!(expanded.commands().collect::<Vec<_>>(), vec!["say a", "kill"]);
    }

    #[test]
    fn test_missing_arguments_batched_across_actions() {
        let validator = RecordingValidator::default();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let procedure = template(&["tp @s $x$ 64 $y$", "say $x$"]);
        let args = ArgumentCompound::new().with("z", 1);

        let err = procedure.expand(Some(&args), &ctx).unwrap_err();
        assert_eq!(
            err,
            MacroError::MissingArguments {
                procedure: id(),
                names: vec!["x".into(), "y".into()],
            }
        );
        assert!(validator.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_first_invalid_action_reported() {
        let validator = RecordingValidator::default();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let procedure = template(&["say $v$", "bad $v$", "bad again $v$"]);
        let args = ArgumentCompound::new().with("v", 1);

        let err = procedure.expand(Some(&args), &ctx).unwrap_err();
        assert!(matches!(
            err,
            MacroError::InvalidExpansion { action_index: 1, .. }
        ));
        assert_eq!(*validator.seen.lock().unwrap(), vec!["say 1", "bad 1"]);
    }

    #[test]
    fn test_malformed_placeholder_checked_before_arguments() {
        let validator = RecordingValidator::default();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let procedure = template(&["say $a$", "say $b"]);

        let err = procedure.expand(None, &ctx).unwrap_err();
        assert_eq!(
            err,
            MacroError::MalformedPlaceholder {
                procedure: id(),
                action_index: 1,
                reason: PlaceholderError::Unterminated { offset: 4 },
            }
        );
    }

    #[test]
    fn test_required_names_order() {
        let procedure = template(&["tp $who$ $x$ $y$", "say $y$ $z$ $who$"]);
        assert_eq!(procedure.required_names().unwrap(), vec!["who", "x", "y", "z"]);
    }

    #[test]
    fn test_from_templates_keeps_placeholder_templates() {
        let validator = RecordingValidator::default();
        let ctx = ExpansionContext::new(CommandSource::default(), &validator);
        let procedure =
            Procedure::from_templates(id(), vec!["say $$5".into(), "say $n$".into()], &ctx).unwrap();
        assert!(procedure.is_template());
        assert_eq!(procedure.len(), 2);
        assert!(validator.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_source_bound_to_every_action() {
        let validator = RecordingValidator::default();
        let source = CommandSource::new("Ash", 0);
        let ctx = ExpansionContext::new(source.clone(), &validator);
        let args = ArgumentCompound::new().with("n", 2);
        let expanded = template(&["say $n$", "say $n$$$"]).expand(Some(&args), &ctx).unwrap();
        assert_eq!(expanded.commands().collect::<Vec<_>>(), vec!["say 2", "say 2$"]);
        assert!(expanded.actions().iter().all(|a| a.source() == &source));
    }

    #[test]
    fn test_has_placeholders() {
        assert_eq!(RawActionTemplate::new("say $$").has_placeholders(), Ok(false));
        assert_eq!(RawActionTemplate::new("say $a$").has_placeholders(), Ok(true));
        assert!(RawActionTemplate::new("say $a").has_placeholders().is_err());
    }
}
