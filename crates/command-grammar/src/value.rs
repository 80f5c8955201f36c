//! Parsed command values

use serde::Serialize;

/// A typed value produced by parsing one command node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgumentValue {
    Literal(String),
    Word(String),
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Resource {
        namespace: Option<String>,
        path: String,
    },
}

impl ArgumentValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::Literal(s) | ArgumentValue::Word(s) | ArgumentValue::String(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ArgumentValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// One matched node: a literal keyword or a named argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedNode {
    pub name: String,
    pub value: ArgumentValue,
}

/// A command line accepted by the grammar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCommand {
    /// The exact text that was parsed
    pub text: String,
    /// Matched nodes in order, root literal first
    pub nodes: Vec<ParsedNode>,
}

impl ParsedCommand {
    pub fn new(text: impl Into<String>, nodes: Vec<ParsedNode>) -> Self {
        Self {
            text: text.into(),
            nodes,
        }
    }

    /// Root literal (the command name)
    pub fn root(&self) -> Option<&str> {
        self.nodes.first().map(|n| n.name.as_str())
    }

    /// Look up a named argument
    pub fn argument(&self, name: &str) -> Option<&ArgumentValue> {
        self.nodes
            .iter()
            .find(|n| n.name == name && !matches!(n.value, ArgumentValue::Literal(_)))
            .map(|n| &n.value)
    }
}
