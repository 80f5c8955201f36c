//! Argument compounds
//!
//! The caller-supplied mapping of placeholder names to typed values. The
//! expansion pipeline only reads it: lookup by name, then conversion of the
//! value to text.
//!
//! ## Text forms
//!
//! - Top-level numbers render as plain decimals: `5`, `2.5`
//! - Top-level strings render raw: `Ash`
//! - Lists and compounds render as SNBT: `[1,2]`, `{count:3b,name:"Iron Sword"}`

use std::fmt::Write as _;

use serde_json::Value;
use thiserror::Error;

/// Errors building a compound from JSON
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Arguments must be a JSON object")]
    NotAnObject,

    #[error("Null is not a valid argument value (at '{0}')")]
    NullValue(String),

    #[error("Invalid arguments JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A typed argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<ArgValue>),
    Compound(ArgumentCompound),
}

impl ArgValue {
    /// Text substituted for a placeholder bound to this value
    ///
    /// Total over every value: never fails.
    pub fn to_macro_text(&self) -> String {
        match self {
            ArgValue::Byte(n) => n.to_string(),
            ArgValue::Short(n) => n.to_string(),
            ArgValue::Int(n) => n.to_string(),
            ArgValue::Long(n) => n.to_string(),
            ArgValue::Float(n) => n.to_string(),
            ArgValue::Double(n) => n.to_string(),
            ArgValue::String(s) => s.clone(),
            ArgValue::List(_) | ArgValue::Compound(_) => self.to_snbt(),
        }
    }

    /// SNBT form, with type suffixes and quoted strings
    pub fn to_snbt(&self) -> String {
        let mut out = String::new();
        self.write_snbt(&mut out);
        out
    }

    fn write_snbt(&self, out: &mut String) {
        // Writing into a String cannot fail
        let _ = match self {
            ArgValue::Byte(n) => write!(out, "{}b", n),
            ArgValue::Short(n) => write!(out, "{}s", n),
            ArgValue::Int(n) => write!(out, "{}", n),
            ArgValue::Long(n) => write!(out, "{}L", n),
            ArgValue::Float(n) => write!(out, "{}f", n),
            ArgValue::Double(n) => write!(out, "{}d", n),
            ArgValue::String(s) => {
                write_snbt_string(s, out);
                Ok(())
            }
            ArgValue::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_snbt(out);
                }
                out.push(']');
                Ok(())
            }
            ArgValue::Compound(compound) => {
                compound.write_snbt(out);
                Ok(())
            }
        };
    }

    /// Convert a JSON value
    ///
    /// Integers become `Int` when they fit, otherwise `Long`; other numbers
    /// become `Double`; booleans become `Byte`; `null` is rejected. Object
    /// keys arrive in sorted order.
    pub fn from_json(value: &Value) -> Result<Self, ArgumentError> {
        Self::from_json_at(value, "$")
    }

    fn from_json_at(value: &Value, at: &str) -> Result<Self, ArgumentError> {
        Ok(match value {
            Value::Null => return Err(ArgumentError::NullValue(at.to_string())),
            Value::Bool(b) => ArgValue::Byte(i8::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => match i32::try_from(i) {
                    Ok(i) => ArgValue::Int(i),
                    Err(_) => ArgValue::Long(i),
                },
                None => ArgValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ArgValue::String(s.clone()),
            Value::Array(items) => ArgValue::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Self::from_json_at(item, &format!("{}[{}]", at, i)))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut compound = ArgumentCompound::new();
                for (key, item) in map {
                    let value = Self::from_json_at(item, &format!("{}.{}", at, key))?;
                    compound.insert(key.clone(), value);
                }
                ArgValue::Compound(compound)
            }
        })
    }
}

fn is_plain_word(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn write_snbt_string(s: &str, out: &mut String) {
    if is_plain_word(s) {
        out.push_str(s);
        return;
    }
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

impl From<i8> for ArgValue {
    fn from(n: i8) -> Self {
        ArgValue::Byte(n)
    }
}

impl From<i16> for ArgValue {
    fn from(n: i16) -> Self {
        ArgValue::Short(n)
    }
}

impl From<i32> for ArgValue {
    fn from(n: i32) -> Self {
        ArgValue::Int(n)
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        ArgValue::Long(n)
    }
}

impl From<f32> for ArgValue {
    fn from(n: f32) -> Self {
        ArgValue::Float(n)
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Double(n)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl From<ArgumentCompound> for ArgValue {
    fn from(c: ArgumentCompound) -> Self {
        ArgValue::Compound(c)
    }
}

/// Ordered mapping from argument names to values
///
/// Re-inserting a name replaces its value in place; iteration follows first
/// insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentCompound {
    entries: Vec<(String, ArgValue)>,
}

impl ArgumentCompound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Option<ArgValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a JSON object into a compound
    pub fn from_json_str(json: &str) -> Result<Self, ArgumentError> {
        let value: Value = serde_json::from_str(json)?;
        Self::try_from(value)
    }

    pub fn to_snbt(&self) -> String {
        let mut out = String::new();
        self.write_snbt(&mut out);
        out
    }

    fn write_snbt(&self, out: &mut String) {
        out.push('{');
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_snbt_string(key, out);
            out.push(':');
            value.write_snbt(out);
        }
        out.push('}');
    }
}

impl TryFrom<Value> for ArgumentCompound {
    type Error = ArgumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match ArgValue::from_json(&value)? {
            ArgValue::Compound(compound) => Ok(compound),
            _ => Err(ArgumentError::NotAnObject),
        }
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for ArgumentCompound {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut compound = Self::new();
        for (k, v) in iter {
            compound.insert(k, v);
        }
        compound
    }
}
