use super::super::{core::*, prelude::*};
use super::{common::*, condition::parse_condition};
use crate::ast::{
    ActionStep, Assignment, ConditionalRule, EventRule, Program, ServiceRef, Statement,
};
use crate::tokenizer::{keyword::Keyword, literal::Literal, token::Token, token::TokenSpan};

/// `program := (statement (newline statement)*)? end`
pub fn parse_program() -> impl Parser<TokenSpan, Program> {
    map(
        choice(vec![
            Box::new(map(parse_end("statement"), |_| Vec::new())),
            Box::new(map(
                tuple3(
                    parse_statement(),
                    many(preceded(parse_newline(), parse_statement())),
                    parse_end("end of line"),
                ),
                |(first, rest, _)| {
                    let mut statements = vec![first];
                    statements.extend(rest);
                    statements
                },
            )),
        ]),
        Program::new,
    )
}

pub fn parse_statement() -> impl Parser<TokenSpan, Statement> {
    choice(vec![
        Box::new(map(parse_assignment(), Statement::Assignment)),
        Box::new(map(parse_conditional(), Statement::Conditional)),
        Box::new(map(parse_event_rule(), Statement::EventRule)),
    ])
}

/// `name: literal`
pub fn parse_assignment() -> impl Parser<TokenSpan, Assignment> {
    with_context(
        map(
            tuple4(parse_location(), parse_word(), parse_colon(), parse_literal()),
            |(location, name, _, value)| Assignment {
                name,
                value,
                location,
            },
        ),
        "assignment",
    )
}

/// `if condition then chain (else then chain)?`
pub fn parse_conditional() -> impl Parser<TokenSpan, ConditionalRule> {
    with_context(
        map(
            tuple4(
                parse_location(),
                preceded(parse_keyword(Keyword::If), parse_condition()),
                preceded(parse_keyword(Keyword::Then), parse_chain()),
                optional(preceded(
                    parse_keyword(Keyword::Else),
                    preceded(parse_keyword(Keyword::Then), parse_chain()),
                )),
            ),
            |(location, condition, then_chain, else_chain)| ConditionalRule {
                condition,
                then_chain,
                else_chain,
                location,
            },
        ),
        "conditional rule",
    )
}

/// `when phrase to literal then chain`
pub fn parse_event_rule() -> impl Parser<TokenSpan, EventRule> {
    with_context(
        map(
            tuple4(
                parse_location(),
                preceded(parse_keyword(Keyword::When), parse_phrase()),
                preceded(parse_keyword(Keyword::To), parse_literal()),
                preceded(parse_keyword(Keyword::Then), parse_chain()),
            ),
            |(location, subject, target, then_chain)| EventRule {
                subject,
                target,
                then_chain,
                location,
            },
        ),
        "event rule",
    )
}

/// `step ('then' step)*`
pub fn parse_chain() -> impl Parser<TokenSpan, Vec<ActionStep>> {
    map(
        tuple2(
            parse_action_step(),
            many(preceded(parse_keyword(Keyword::Then), parse_action_step())),
        ),
        |(first, rest)| {
            let mut steps = vec![first];
            steps.extend(rest);
            steps
        },
    )
}

/// `verb-phrase literal? ('using' service)?`
pub fn parse_action_step() -> impl Parser<TokenSpan, ActionStep> {
    with_context(
        map(
            tuple4(
                parse_location(),
                parse_extended_phrase(),
                optional(parse_literal()),
                optional(preceded(
                    parse_keyword(Keyword::Using),
                    parse_service_ref(),
                )),
            ),
            |(location, verb, object, service)| ActionStep {
                verb,
                object,
                service,
                location,
            },
        ),
        "action step",
    )
}

/// A quoted string or a capitalised word names a service; other words refer
/// to a variable.
pub fn parse_service_ref() -> impl Parser<TokenSpan, ServiceRef> {
    satisfy("service name or variable", |span: &TokenSpan| {
        match &span.token {
            Token::Literal(Literal::String(name)) => Some(ServiceRef::Literal(name.clone())),
            Token::Identifier(word) => Some(service_ref_from_word(word)),
            _ => None,
        }
    })
}

fn service_ref_from_word(word: &str) -> ServiceRef {
    if word.starts_with(|c: char| c.is_uppercase()) {
        ServiceRef::Literal(word.to_string())
    } else {
        ServiceRef::Variable(word.to_string())
    }
}
