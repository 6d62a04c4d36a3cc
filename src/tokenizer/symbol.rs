//! # Symbol Token Handling
//!
//! Operators and delimiters of the rule language.
//!
//! Symbols are parsed longest-match first so that `>=` is never read as `>`
//! followed by a stray `=`. The word operator `contains` is spelled like an
//! identifier and is therefore recognised by the identifier parser, not here.

use strum_macros::{AsRefStr, Display, EnumString};

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, value},
    error::context,
};

use super::token::{ParserResult, Token};

/// Comparison operators usable in a condition term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    /// Equality (`==`)
    #[strum(serialize = "==")]
    EqualEqual,
    /// Greater than (`>`)
    #[strum(serialize = ">")]
    Greater,
    /// Greater than or equal (`>=`)
    #[strum(serialize = ">=")]
    GreaterEqual,
    /// Less than (`<`)
    #[strum(serialize = "<")]
    Less,
    /// Less than or equal (`<=`)
    #[strum(serialize = "<=")]
    LessEqual,
    /// Substring or membership test (`contains`)
    #[strum(serialize = "contains")]
    Contains,
}

/// Structural punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Delimiter {
    /// Colon (`:`) separating an assignment name from its value
    #[strum(serialize = ":")]
    Colon,
}

/// Parses a symbolic comparison operator.
///
/// ```
/// # use ruleflow::tokenizer::symbol::{parse_operator, Operator};
/// # use ruleflow::tokenizer::token::Token;
/// let (rest, token) = parse_operator(">= 10").unwrap();
/// assert_eq!(token, Token::Operator(Operator::GreaterEqual));
/// assert_eq!(rest, " 10");
/// ```
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<Token> {
    context(
        "operator",
        map(
            alt((
                // Multi-character operators (matched first for longest-match)
                value(Operator::EqualEqual, tag("==")),
                value(Operator::GreaterEqual, tag(">=")),
                value(Operator::LessEqual, tag("<=")),
                // Single-character operators
                value(Operator::Greater, tag(">")),
                value(Operator::Less, tag("<")),
            )),
            Token::Operator,
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        map(value(Delimiter::Colon, tag(":")), Token::Delimiter),
    )(input)
}
