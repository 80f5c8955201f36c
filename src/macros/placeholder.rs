//! Placeholder tokenizer
//!
//! Scans one action's text for `$name$` placeholders.
//!
//! ## Syntax
//!
//! - `$name$` - placeholder; `name` is one or more of `[A-Za-z0-9_]`
//! - `$$` - an escaped literal `$`
//! - anything else - literal text, kept verbatim
//!
//! Both iterators here are lazy and stop after the first malformed marker.

use std::iter::FusedIterator;

use thiserror::Error;

/// Character opening and closing a placeholder
pub const MARKER: char = '$';

/// A placeholder marker that could not be tokenized
///
/// `offset` is the byte offset of the opening `$`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },

    #[error("invalid character '{ch}' in placeholder starting at byte {offset}")]
    InvalidCharacter { offset: usize, ch: char },
}

/// One piece of an action's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lazy sequence of segments in `text`
pub fn tokenize(text: &str) -> Tokenizer<'_> {
    Tokenizer {
        text,
        pos: 0,
        failed: false,
    }
}

/// Lazy sequence of placeholder names in `text`, first occurrence only
pub fn placeholder_names(text: &str) -> PlaceholderNames<'_> {
    PlaceholderNames {
        inner: tokenize(text),
        seen: Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Segment<'a>, PlaceholderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.text.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.text[start..];

        let Some(after) = rest.strip_prefix(MARKER) else {
            let len = rest.find(MARKER).unwrap_or(rest.len());
            self.pos += len;
            return Some(Ok(Segment::Literal(&rest[..len])));
        };

        if after.starts_with(MARKER) {
            self.pos += 2 * MARKER.len_utf8();
            return Some(Ok(Segment::Literal(&rest[..MARKER.len_utf8()])));
        }

        let name_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
        match after[name_len..].chars().next() {
            Some(MARKER) => {
                self.pos += name_len + 2 * MARKER.len_utf8();
                Some(Ok(Segment::Placeholder(&after[..name_len])))
            }
            Some(ch) => {
                self.failed = true;
                Some(Err(PlaceholderError::InvalidCharacter { offset: start, ch }))
            }
            None => {
                self.failed = true;
                Some(Err(PlaceholderError::Unterminated { offset: start }))
            }
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

#[derive(Debug, Clone)]
pub struct PlaceholderNames<'a> {
    inner: Tokenizer<'a>,
    seen: Vec<&'a str>,
}

impl<'a> Iterator for PlaceholderNames<'a> {
    type Item = Result<&'a str, PlaceholderError>;

    fn next(&mut self) -> Option<Self::Item> {
        for segment in self.inner.by_ref() {
            match segment {
                Ok(Segment::Placeholder(name)) if !self.seen.contains(&name) => {
                    self.seen.push(name);
                    return Some(Ok(name));
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl FusedIterator for PlaceholderNames<'_> {}
