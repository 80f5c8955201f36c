//! Command tree
//!
//! Commands are declared as usage lines and merged into a tree keyed by
//! literal keywords and typed arguments. The final node of every usage is
//! executable; intermediate nodes are executable only if some other usage
//! ends there.

use serde::Deserialize;
use tracing::debug;

use crate::error::{GrammarConfigError, UsageError};
use crate::kind::ArgumentKind;
use crate::parser::{parse_usage, UsageElement};

/// Usage lines registered by `CommandTree::builtin()`
pub const BUILTIN_USAGES: &[&str] = &[
    "say <message:greedy>",
    "me <action:greedy>",
    "tell <targets:word> <message:greedy>",
    "kill",
    "kill <targets:word>",
    "function <name:resource>",
    "scoreboard players set <targets:word> <objective:word> <score:integer>",
    "scoreboard players add <targets:word> <objective:word> <score:integer(0..)>",
    "scoreboard players remove <targets:word> <objective:word> <score:integer(0..)>",
    "tp <targets:word> <x:word> <y:word> <z:word>",
    "time set <time:integer(0..)>",
    "time set day",
    "time set night",
    "give <targets:word> <item:resource>",
    "give <targets:word> <item:resource> <count:integer(1..)>",
    "effect give <targets:word> <effect:resource>",
    "effect give <targets:word> <effect:resource> <seconds:integer(0..1000000)>",
    "setblock <x:word> <y:word> <z:word> <block:resource>",
    "data merge storage <target:resource> <nbt:greedy>",
    "tag <targets:word> add <name:word>",
    "tag <targets:word> remove <name:word>",
];

/// What a node matches
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Literal(String),
    Argument { name: String, kind: ArgumentKind },
}

impl NodeKind {
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Literal(name) => name,
            NodeKind::Argument { name, .. } => name,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, NodeKind::Literal(_))
    }
}

impl From<UsageElement> for NodeKind {
    fn from(element: UsageElement) -> Self {
        match element {
            UsageElement::Literal(s) => NodeKind::Literal(s),
            UsageElement::Argument { name, kind } => NodeKind::Argument { name, kind },
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandNode {
    pub kind: NodeKind,
    pub executable: bool,
    pub children: Vec<CommandNode>,
}

impl CommandNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            executable: false,
            children: Vec::new(),
        }
    }
}

/// Grammar file layout: `commands: ["say <message:greedy>", ...]`
#[derive(Debug, Deserialize)]
struct GrammarFile {
    commands: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommandTree {
    roots: Vec<CommandNode>,
    usages: Vec<String>,
}

impl CommandTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree with the built-in command set
    pub fn builtin() -> Self {
        Self::from_usages(BUILTIN_USAGES.iter().copied())
            .expect("built-in usage lines are well formed")
    }

    /// Build a tree from usage lines
    pub fn from_usages<I, S>(usages: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for usage in usages {
            tree.register(usage.as_ref())?;
        }
        Ok(tree)
    }

    /// Build a tree from a YAML grammar file
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GrammarConfigError> {
        let file: GrammarFile = serde_yaml::from_str(yaml)?;
        let tree = Self::from_usages(&file.commands)?;
        debug!("Loaded command grammar with {} usages", tree.usages.len());
        Ok(tree)
    }

    /// Register one usage line, merging shared prefixes
    pub fn register(&mut self, usage: &str) -> Result<(), UsageError> {
        let elements = parse_usage(usage)?;

        let mut level = &mut self.roots;
        let mut last_index = 0;
        let count = elements.len();
        for (i, element) in elements.into_iter().enumerate() {
            let kind = NodeKind::from(element);
            let index = match level.iter().position(|n| n.kind == kind) {
                Some(index) => index,
                None => {
                    level.push(CommandNode::new(kind));
                    level.len() - 1
                }
            };
            if i + 1 == count {
                last_index = index;
                break;
            }
            level = &mut level[index].children;
        }
        level[last_index].executable = true;

        self.usages.push(usage.to_string());
        Ok(())
    }

    pub fn roots(&self) -> &[CommandNode] {
        &self.roots
    }

    /// Usage lines in registration order
    pub fn usages(&self) -> &[String] {
        &self.usages
    }

    /// Names of all root commands
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(|n| n.kind.name())
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
