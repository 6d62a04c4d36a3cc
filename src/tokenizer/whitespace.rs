//! # Whitespace Token Handling
//!
//! Spaces and tabs are kept as [`Token::Whitespace`] so that every token keeps
//! an exact source span; line breaks become [`Token::Newline`] because they
//! terminate statements. The preprocessor decides which of them survive.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::map,
    error::context,
};

use super::token::{ParserResult, Token};

/// Parses a run of spaces and tabs.
///
/// ```
/// # use ruleflow::tokenizer::whitespace::parse_whitespace;
/// # use ruleflow::tokenizer::token::Token;
/// let (rest, token) = parse_whitespace("   then").unwrap();
/// assert_eq!(token, Token::Whitespace("   ".to_string()));
/// assert_eq!(rest, "then");
/// ```
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_whitespace(input: &str) -> ParserResult<Token> {
    context(
        "whitespace expected",
        map(take_while1(|c| c == ' ' || c == '\t'), |ws: &str| {
            Token::Whitespace(ws.to_string())
        }),
    )(input)
}

/// Parses a Unix (`\n`) or Windows (`\r\n`) line break.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_newline(input: &str) -> ParserResult<Token> {
    context(
        "newline expected",
        map(alt((tag("\r\n"), tag("\n"))), |_| Token::Newline),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace() {
        let input = "   hello";
        let (rest, token) = parse_whitespace(input).unwrap();
        assert_eq!(token, Token::Whitespace("   ".to_string()));
        assert_eq!(rest, "hello");

        let input = "\t\t  hello";
        let (rest, token) = parse_whitespace(input).unwrap();
        assert_eq!(token, Token::Whitespace("\t\t  ".to_string()));
        assert_eq!(rest, "hello");
    }

    #[test]
    fn test_newline() {
        let input = "\nhello";
        let (rest, token) = parse_newline(input).unwrap();
        assert_eq!(token, Token::Newline);
        assert_eq!(rest, "hello");

        let input = "\r\nworld";
        let (rest, token) = parse_newline(input).unwrap();
        assert_eq!(token, Token::Newline);
        assert_eq!(rest, "world");
    }

    #[test]
    fn test_whitespace_does_not_eat_newlines() {
        let (rest, _) = parse_whitespace("  \nnext").unwrap();
        assert_eq!(rest, "\nnext");
        assert!(parse_whitespace("hello").is_err());
        assert!(parse_newline("hello").is_err());
    }
}
