use super::super::{core::*, prelude::*};
use crate::ast::{self, Location};
use crate::tokenizer::{
    keyword::Keyword,
    symbol::{Delimiter, Operator},
    token::{Token, TokenSpan},
};

// 基本的なパーサー
pub fn parse_word() -> impl Parser<TokenSpan, String> {
    satisfy("identifier", |span: &TokenSpan| match &span.token {
        Token::Identifier(s) => Some(s.clone()),
        _ => None,
    })
}

pub fn parse_keyword(keyword: Keyword) -> impl Parser<TokenSpan, ()> {
    as_unit::<TokenSpan, _, _>(equal(Token::Keyword(keyword)))
}

pub fn parse_colon() -> impl Parser<TokenSpan, ()> {
    as_unit::<TokenSpan, _, _>(equal(Token::Delimiter(Delimiter::Colon)))
}

pub fn parse_newline() -> impl Parser<TokenSpan, ()> {
    as_unit::<TokenSpan, _, _>(equal(Token::Newline))
}

/// Accepts the end marker; `expected` names what a stray token should have
/// been instead.
pub fn parse_end(expected: &str) -> impl Parser<TokenSpan, ()> {
    satisfy(expected, |span: &TokenSpan| match span.token {
        Token::Eof => Some(()),
        _ => None,
    })
}

pub fn parse_literal() -> impl Parser<TokenSpan, ast::Literal> {
    satisfy("literal", |span: &TokenSpan| match &span.token {
        Token::Literal(literal) => Some(literal.clone()),
        _ => None,
    })
}

pub fn parse_comparator() -> impl Parser<TokenSpan, Operator> {
    satisfy("comparison operator", |span: &TokenSpan| match span.token {
        Token::Operator(op) => Some(op),
        _ => None,
    })
}

/// A run of words, e.g. `order status`.
pub fn parse_phrase() -> impl Parser<TokenSpan, String> {
    map(many1(parse_word()), |words| words.join(" "))
}

/// A phrase that may also contain `to <word>`, e.g. `uploaded to S3`.
pub fn parse_extended_phrase() -> impl Parser<TokenSpan, String> {
    map(
        tuple2(
            parse_word(),
            many(choice(vec![
                Box::new(parse_word()),
                Box::new(map(
                    preceded(parse_keyword(Keyword::To), parse_word()),
                    |word| format!("{} {}", Keyword::To, word),
                )),
            ])),
        ),
        |(first, rest)| {
            let mut words = vec![first];
            words.extend(rest);
            words.join(" ")
        },
    )
}

/// Location of the current token, consuming nothing.
pub fn parse_location() -> impl Parser<TokenSpan, Location> {
    CurrentLocation
}

struct CurrentLocation;

impl Parser<TokenSpan, Location> for CurrentLocation {
    fn parse(&self, input: &[TokenSpan], pos: usize) -> ParseResult<Location> {
        let location = input
            .get(pos)
            .or_else(|| input.last())
            .map(|span| Location {
                line: span.line,
                column: span.column,
            })
            .unwrap_or_default();
        Ok((pos, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::{Preprocessor, TokenPreprocessor};
    use crate::tokenizer::token::Tokenizer;

    fn spans(source: &str) -> Vec<TokenSpan> {
        TokenPreprocessor::default().process(Tokenizer::new().tokenize(source).unwrap())
    }

    #[test]
    fn test_phrase_stops_at_keyword() {
        let input = spans("order status to \"shipped\"");
        let (pos, phrase) = parse_phrase().parse(&input, 0).unwrap();
        assert_eq!(phrase, "order status");
        assert_eq!(pos, 2);
    }

    #[test]
    fn test_unit_token_parsers() {
        let input = spans("limit: 3\nif");
        let (pos, _) = parse_colon().parse(&input, 1).unwrap();
        assert_eq!(pos, 2);
        let (pos, _) = parse_newline().parse(&input, 3).unwrap();
        assert_eq!(pos, 4);
        let (pos, _) = parse_keyword(Keyword::If).parse(&input, 4).unwrap();
        assert_eq!(pos, 5);
        assert!(parse_keyword(Keyword::When).parse(&input, 4).is_err());
    }

    #[test]
    fn test_extended_phrase_keeps_to() {
        let input = spans("uploaded to S3 == true");
        let (pos, phrase) = parse_extended_phrase().parse(&input, 0).unwrap();
        assert_eq!(phrase, "uploaded to S3");
        assert_eq!(pos, 3);
    }

    #[test]
    fn test_extended_phrase_rejects_dangling_to() {
        let input = spans("uploaded to 5");
        let error = parse_extended_phrase().parse(&input, 0).unwrap_err();
        assert_eq!(error.get_position(), 2);
        assert_eq!(error.expected(), "identifier");
    }

    #[test]
    fn test_location_is_peeked() {
        let input = spans("\n  x: 1");
        let (pos, location) = parse_location().parse(&input, 0).unwrap();
        assert_eq!(pos, 0);
        assert_eq!((location.line, location.column), (2, 3));
    }

    #[test]
    fn test_end_reports_expectation() {
        let input = spans("x y");
        let error = parse_end("end of line").parse(&input, 1).unwrap_err();
        assert_eq!(
            error,
            ParseError::Unexpected {
                expected: "end of line".to_string(),
                found: "`y`".to_string(),
                position: 1,
            }
        );
    }
}
