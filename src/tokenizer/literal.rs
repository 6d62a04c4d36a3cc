use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, recognize, value},
    error::context,
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
};

use super::token::{ParserResult, Token};

/// Literal values as they appear in rule source.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_escape(input: &str) -> ParserResult<char> {
    context(
        "escape sequence",
        preceded(
            char('\\'),
            alt((
                value('"', char('"')),
                value('\\', char('\\')),
                value('\n', char('n')),
                value('\t', char('t')),
            )),
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_string_literal_part(input: &str) -> ParserResult<String> {
    context(
        "string literal part",
        alt((
            map(
                take_while1(|c| c != '"' && c != '\\' && c != '\n' && c != '\r'),
                |content: &str| content.to_string(),
            ),
            map(parse_escape, |c| c.to_string()),
        )),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_string_literal(input: &str) -> ParserResult<Literal> {
    context(
        "string literal",
        map(
            delimited(char('"'), many0(parse_string_literal_part), char('"')),
            |parts| Literal::String(parts.concat()),
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_float_literal(input: &str) -> ParserResult<Literal> {
    context(
        "float literal",
        map_res(
            recognize(tuple((opt(char('-')), digit1, char('.'), digit1))),
            |s: &str| s.parse::<f64>().map(Literal::Float),
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_integer_literal(input: &str) -> ParserResult<Literal> {
    context(
        "integer literal",
        map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
            s.parse::<i64>().map(Literal::Integer)
        }),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_literal(input: &str) -> ParserResult<Token> {
    context(
        "literal",
        map(
            alt((
                parse_string_literal,
                parse_float_literal,
                parse_integer_literal,
            )),
            Token::Literal,
        ),
    )(input)
}

/// Word spellings that denote boolean literals.
pub fn boolean_from_word(word: &str) -> Option<Literal> {
    match word {
        "true" => Some(Literal::Boolean(true)),
        "false" => Some(Literal::Boolean(false)),
        _ => None,
    }
}

/// Returns true when `input` opens a string literal that is never closed on
/// its line.
pub fn is_unterminated_string(input: &str) -> bool {
    input.starts_with('"') && parse_string_literal(input).is_err()
}

/// Byte offset of the first unsupported escape in a string literal opening
/// at the start of `input`.
pub fn invalid_escape_offset(input: &str) -> Option<usize> {
    let body = input.strip_prefix('"')?;
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' | '\n' | '\r' => return None,
            '\\' => match chars.next() {
                Some((_, '"' | '\\' | 'n' | 't')) => {}
                Some((_, '\n' | '\r')) | None => return None,
                Some(_) => return Some(i + 1),
            },
            _ => {}
        }
    }
    None
}

/// Width of a leading integer literal that does not fit in `i64`.
pub fn out_of_range_integer(input: &str) -> Option<usize> {
    let sign = usize::from(input.starts_with('-'));
    let digits = input[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len() - sign);
    if digits == 0 {
        return None;
    }
    let width = sign + digits;
    input[..width].parse::<i64>().is_err().then_some(width)
}

impl Literal {
    /// Plain text form used for event matching and text comparison.
    pub fn as_text(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Integer(i) => i.to_string(),
            Literal::Float(x) => format_float(*x),
            Literal::Boolean(b) => b.to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Boolean(_) => "boolean",
        }
    }
}

/// Source form: strings are quoted and escaped, floats always keep a
/// fractional part.
impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            other => write!(f, "{}", other.as_text()),
        }
    }
}

fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{:.1}", x)
    } else {
        x.to_string()
    }
}
