//! Command dispatcher
//!
//! Parses one command line against a `CommandTree`. Tokens are separated by
//! exactly one space. At each node literal children are tried before argument
//! children, with backtracking; when nothing matches, the failure that got
//! furthest into the input is reported.

use tracing::trace;

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::parser::parse_argument;
use crate::tree::{CommandNode, CommandTree, NodeKind};
use crate::value::{ArgumentValue, ParsedCommand, ParsedNode};

/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    tree: CommandTree,
}

/// Deepest failure seen while walking the tree
struct Failure {
    cursor: usize,
    kind: SyntaxErrorKind,
}

impl CommandDispatcher {
    pub fn new(tree: CommandTree) -> Self {
        Self { tree }
    }

    /// Dispatcher over the built-in command set
    pub fn builtin() -> Self {
        Self::new(CommandTree::builtin())
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Parse a complete command line
    pub fn parse(&self, input: &str) -> Result<ParsedCommand, SyntaxError> {
        if input.trim().is_empty() {
            return Err(SyntaxError::new(SyntaxErrorKind::EmptyCommand, input, 0));
        }

        let mut path = Vec::new();
        let mut failure: Option<Failure> = None;
        for root in self.tree.roots() {
            if walk(root, input, 0, &mut path, &mut failure) {
                trace!(command = input, nodes = path.len(), "parsed command");
                return Ok(ParsedCommand::new(input, path));
            }
        }

        let failure = failure.unwrap_or(Failure {
            cursor: 0,
            kind: SyntaxErrorKind::UnknownCommand,
        });
        Err(SyntaxError::new(failure.kind, input, failure.cursor))
    }
}

fn record(failure: &mut Option<Failure>, cursor: usize, kind: SyntaxErrorKind) {
    let deeper = failure.as_ref().map_or(true, |f| cursor > f.cursor);
    if deeper {
        *failure = Some(Failure { cursor, kind });
    }
}

fn walk(
    node: &CommandNode,
    input: &str,
    cursor: usize,
    path: &mut Vec<ParsedNode>,
    failure: &mut Option<Failure>,
) -> bool {
    let rest = &input[cursor..];

    let (consumed, parsed) = match &node.kind {
        NodeKind::Literal(literal) => {
            let word = rest.split(' ').next().unwrap_or("");
            if word != literal {
                let kind = if path.is_empty() {
                    SyntaxErrorKind::UnknownCommand
                } else {
                    SyntaxErrorKind::IncorrectArgument
                };
                record(failure, cursor, kind);
                return false;
            }
            (
                literal.len(),
                ParsedNode {
                    name: literal.clone(),
                    value: ArgumentValue::Literal(literal.clone()),
                },
            )
        }
        NodeKind::Argument { name, kind } => match parse_argument(kind, rest) {
            Ok((remaining, value)) => (
                rest.len() - remaining.len(),
                ParsedNode {
                    name: name.clone(),
                    value,
                },
            ),
            Err(kind) => {
                record(failure, cursor, kind);
                return false;
            }
        },
    };

    path.push(parsed);
    let next = cursor + consumed;

    if next == input.len() {
        if node.executable {
            return true;
        }
        record(failure, next, SyntaxErrorKind::IncompleteCommand);
        path.pop();
        return false;
    }

    if !input[next..].starts_with(' ') {
        record(failure, next, SyntaxErrorKind::ExpectedWhitespace);
        path.pop();
        return false;
    }

    if node.children.is_empty() {
        record(failure, next, SyntaxErrorKind::TrailingData);
        path.pop();
        return false;
    }

    let child_cursor = next + 1;
    let literals = node.children.iter().filter(|c| c.kind.is_literal());
    let arguments = node.children.iter().filter(|c| !c.kind.is_literal());
    for child in literals.chain(arguments) {
        if walk(child, input, child_cursor, path, failure) {
            return true;
        }
    }

    path.pop();
    false
}
