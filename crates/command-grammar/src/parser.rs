//! Nom parsers for usage lines and argument values
//!
//! ## Usage syntax
//!
//! ```text
//! usage    := element (' ' element)*
//! element  := literal | '<' name ':' kind '>'
//! kind     := word | string | greedy | bool | resource
//!           | integer ['(' [int] '..' [int] ')']
//!           | float   ['(' [float] '..' [float] ')']
//! ```
//!
//! Argument values are parsed one token at a time; the dispatcher owns
//! separators and backtracking.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_till1, take_while1},
    character::complete::{char, digit1, none_of},
    combinator::{all_consuming, cut, map, map_res, opt, recognize, value},
    error::{context, convert_error, VerboseError},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::error::{SyntaxErrorKind, UsageError};
use crate::kind::ArgumentKind;
use crate::value::ArgumentValue;

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

// ============================================================================
// Usage lines
// ============================================================================

/// One element of a usage line
#[derive(Debug, Clone, PartialEq)]
pub enum UsageElement {
    Literal(String),
    Argument { name: String, kind: ArgumentKind },
}

/// Parse a usage line such as `scoreboard players set <targets:word> <score:integer>`
pub fn parse_usage(usage: &str) -> Result<Vec<UsageElement>, UsageError> {
    let elements = match all_consuming(usage_line)(usage) {
        Ok((_, elements)) => elements,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(UsageError::new(usage, convert_error(usage, e)));
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(UsageError::new(usage, "incomplete usage"));
        }
    };

    if !matches!(elements.first(), Some(UsageElement::Literal(_))) {
        return Err(UsageError::new(usage, "usage must start with a literal"));
    }

    let greedy_position = elements.iter().position(|e| {
        matches!(
            e,
            UsageElement::Argument {
                kind: ArgumentKind::Greedy,
                ..
            }
        )
    });
    if let Some(pos) = greedy_position {
        if pos + 1 != elements.len() {
            return Err(UsageError::new(
                usage,
                "greedy argument must be the last element",
            ));
        }
    }

    Ok(elements)
}

fn usage_line(input: &str) -> Res<Vec<UsageElement>> {
    separated_list1(char(' '), usage_element)(input)
}

fn usage_element(input: &str) -> Res<UsageElement> {
    alt((argument_element, literal_element))(input)
}

fn literal_element(input: &str) -> Res<UsageElement> {
    context(
        "literal",
        map(take_while1(is_literal_char), |s: &str| {
            UsageElement::Literal(s.to_string())
        }),
    )(input)
}

fn argument_element(input: &str) -> Res<UsageElement> {
    context(
        "argument",
        map(
            preceded(
                char('<'),
                cut(terminated(
                    separated_pair(take_while1(is_name_char), char(':'), argument_kind),
                    char('>'),
                )),
            ),
            |(name, kind): (&str, ArgumentKind)| UsageElement::Argument {
                name: name.to_string(),
                kind,
            },
        ),
    )(input)
}

fn argument_kind(input: &str) -> Res<ArgumentKind> {
    context(
        "argument kind",
        alt((
            map(preceded(tag("integer"), opt(integer_bounds)), |bounds| {
                let (min, max) = bounds.unwrap_or((None, None));
                ArgumentKind::Integer { min, max }
            }),
            map(preceded(tag("float"), opt(float_bounds)), |bounds| {
                let (min, max) = bounds.unwrap_or((None, None));
                ArgumentKind::Float { min, max }
            }),
            value(ArgumentKind::Word, tag("word")),
            value(ArgumentKind::String, tag("string")),
            value(ArgumentKind::Greedy, tag("greedy")),
            value(ArgumentKind::Bool, tag("bool")),
            value(ArgumentKind::Resource, tag("resource")),
        )),
    )(input)
}

fn integer_bounds(input: &str) -> Res<(Option<i64>, Option<i64>)> {
    delimited(
        char('('),
        separated_pair(opt(integer_literal), tag(".."), opt(integer_literal)),
        char(')'),
    )(input)
}

fn float_bounds(input: &str) -> Res<(Option<f64>, Option<f64>)> {
    delimited(
        char('('),
        separated_pair(opt(float_literal), tag(".."), opt(float_literal)),
        char(')'),
    )(input)
}

fn is_literal_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ============================================================================
// Argument values
// ============================================================================

/// Parse one argument value from the start of `input`
///
/// Returns the unconsumed remainder (starting at the separator, if any).
pub fn parse_argument<'a>(
    kind: &ArgumentKind,
    input: &'a str,
) -> Result<(&'a str, ArgumentValue), SyntaxErrorKind> {
    let expected = || SyntaxErrorKind::ExpectedArgument(kind.description().to_string());

    match kind {
        ArgumentKind::Greedy => {
            if input.is_empty() {
                return Err(expected());
            }
            Ok(("", ArgumentValue::String(input.to_string())))
        }
        ArgumentKind::String if input.starts_with('"') => match quoted_string(input) {
            Ok((rest, s)) => Ok((rest, ArgumentValue::String(s))),
            Err(_) => Err(SyntaxErrorKind::InvalidQuotedString),
        },
        _ => {
            let (rest, token) = token(input).map_err(|_| expected())?;
            let value = parse_token(kind, token)?;
            Ok((rest, value))
        }
    }
}

fn parse_token(kind: &ArgumentKind, token: &str) -> Result<ArgumentValue, SyntaxErrorKind> {
    match kind {
        ArgumentKind::Word => Ok(ArgumentValue::Word(token.to_string())),
        ArgumentKind::String | ArgumentKind::Greedy => Ok(ArgumentValue::String(token.to_string())),
        ArgumentKind::Integer { min, max } => {
            let (_, value) = all_consuming(integer_literal)(token)
                .map_err(|_| SyntaxErrorKind::InvalidInteger(token.to_string()))?;
            if let Some(min) = *min {
                if value < min {
                    return Err(SyntaxErrorKind::IntegerTooLow { value, min });
                }
            }
            if let Some(max) = *max {
                if value > max {
                    return Err(SyntaxErrorKind::IntegerTooHigh { value, max });
                }
            }
            Ok(ArgumentValue::Integer(value))
        }
        ArgumentKind::Float { min, max } => {
            let (_, value) = all_consuming(float_literal)(token)
                .map_err(|_| SyntaxErrorKind::InvalidFloat(token.to_string()))?;
            if let Some(min) = *min {
                if value < min {
                    return Err(SyntaxErrorKind::FloatTooLow { value, min });
                }
            }
            if let Some(max) = *max {
                if value > max {
                    return Err(SyntaxErrorKind::FloatTooHigh { value, max });
                }
            }
            Ok(ArgumentValue::Float(value))
        }
        ArgumentKind::Bool => all_consuming(boolean)(token)
            .map(|(_, b)| ArgumentValue::Bool(b))
            .map_err(|_| SyntaxErrorKind::InvalidBool(token.to_string())),
        ArgumentKind::Resource => all_consuming(resource)(token)
            .map(|(_, (namespace, path))| ArgumentValue::Resource {
                namespace: namespace.map(str::to_string),
                path: path.to_string(),
            })
            .map_err(|_| SyntaxErrorKind::InvalidResource(token.to_string())),
    }
}

fn token(input: &str) -> Res<&str> {
    take_till1(|c| c == ' ')(input)
}

fn integer_literal(input: &str) -> Res<i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>)(input)
}

fn float_literal(input: &str) -> Res<f64> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit1)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        str::parse::<f64>,
    )(input)
}

fn boolean(input: &str) -> Res<bool> {
    alt((value(true, tag("true")), value(false, tag("false"))))(input)
}

fn resource(input: &str) -> Res<(Option<&str>, &str)> {
    pair(
        opt(terminated(take_while1(is_namespace_char), char(':'))),
        take_while1(is_path_char),
    )(input)
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

/// Double-quoted string with `\"` and `\\` escapes
fn quoted_string(input: &str) -> Res<String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((value("\\", tag("\\")), value("\"", tag("\"")))),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}
