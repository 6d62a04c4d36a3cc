//! Condition grammar.
//!
//! ```text
//! condition := and_expr ('or' and_expr)*
//! and_expr  := term ('and' term)*
//! term      := phrase comparator (literal | identifier)
//! ```
//!
//! Both operators are left-associative and `and` binds tighter than `or`.
//! Parenthesised grouping is not part of the language.

use super::super::{core::*, prelude::*};
use super::common::*;
use crate::ast::{Condition, Operand};
use crate::tokenizer::{keyword::Keyword, token::Token, token::TokenSpan};

pub fn parse_condition() -> impl Parser<TokenSpan, Condition> {
    with_context(
        map(
            tuple2(
                parse_and_expression(),
                many(preceded(parse_keyword(Keyword::Or), parse_and_expression())),
            ),
            |(first, rest)| rest.into_iter().fold(first, Condition::or),
        ),
        "condition",
    )
}

fn parse_and_expression() -> impl Parser<TokenSpan, Condition> {
    map(
        tuple2(
            parse_term(),
            many(preceded(parse_keyword(Keyword::And), parse_term())),
        ),
        |(first, rest)| rest.into_iter().fold(first, Condition::and),
    )
}

fn parse_term() -> impl Parser<TokenSpan, Condition> {
    map(
        tuple4(
            parse_location(),
            parse_extended_phrase(),
            parse_comparator(),
            parse_operand(),
        ),
        |(location, attribute, operator, operand)| Condition::Comparison {
            attribute,
            operator,
            operand,
            location,
        },
    )
}

fn parse_operand() -> impl Parser<TokenSpan, Operand> {
    satisfy("literal or variable", |span: &TokenSpan| match &span.token {
        Token::Literal(literal) => Some(Operand::Literal(literal.clone())),
        Token::Identifier(name) => Some(Operand::Variable(name.clone())),
        _ => None,
    })
}
