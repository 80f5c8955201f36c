//! Argument kinds accepted in usage lines

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of a single command argument
///
/// Written in usage lines as `<name:kind>`, with optional inclusive bounds
/// for numbers: `<score:integer(0..100)>`, `<scale:float(0.5..)>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgumentKind {
    /// A run of non-space characters
    Word,
    /// A word, or a double-quoted string with `\"` and `\\` escapes
    String,
    /// Everything up to the end of the line; must be the last argument
    Greedy,
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Float {
        min: Option<f64>,
        max: Option<f64>,
    },
    Bool,
    /// `namespace:path` or a bare `path`
    Resource,
}

impl ArgumentKind {
    pub fn integer() -> Self {
        ArgumentKind::Integer {
            min: None,
            max: None,
        }
    }

    pub fn float() -> Self {
        ArgumentKind::Float {
            min: None,
            max: None,
        }
    }

    /// Human-readable name used in "Expected ..." errors
    pub fn description(&self) -> &'static str {
        match self {
            ArgumentKind::Word => "word",
            ArgumentKind::String => "string",
            ArgumentKind::Greedy => "text",
            ArgumentKind::Integer { .. } => "integer",
            ArgumentKind::Float { .. } => "float",
            ArgumentKind::Bool => "boolean",
            ArgumentKind::Resource => "resource location",
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKind::Word => write!(f, "word"),
            ArgumentKind::String => write!(f, "string"),
            ArgumentKind::Greedy => write!(f, "greedy"),
            ArgumentKind::Bool => write!(f, "bool"),
            ArgumentKind::Resource => write!(f, "resource"),
            ArgumentKind::Integer { min, max } => {
                write!(f, "integer")?;
                write_bounds(f, min, max)
            }
            ArgumentKind::Float { min, max } => {
                write!(f, "float")?;
                write_bounds(f, min, max)
            }
        }
    }
}

fn write_bounds<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    min: &Option<T>,
    max: &Option<T>,
) -> fmt::Result {
    if min.is_none() && max.is_none() {
        return Ok(());
    }
    write!(f, "(")?;
    if let Some(min) = min {
        write!(f, "{}", min)?;
    }
    write!(f, "..")?;
    if let Some(max) = max {
        write!(f, "{}", max)?;
    }
    write!(f, ")")
}
