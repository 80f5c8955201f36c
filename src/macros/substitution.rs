//! Action substitution
//!
//! Rebuilds an action's text from its segments with every placeholder
//! replaced by its resolved value. Literal text is copied byte for byte.

use super::placeholder::{Segment, MARKER};
use super::resolver::ResolvedArguments;

/// Concrete command text for one action
///
/// Values are inserted as-is; a value containing `$` is never rescanned.
/// A placeholder with no resolved value is written back in its original
/// `$name$` form and left for the grammar check to reject.
pub fn substitute(segments: &[Segment<'_>], resolved: &ResolvedArguments) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => match resolved.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push(MARKER);
                    out.push_str(name);
                    out.push(MARKER);
                }
            },
        }
    }
    out
}
