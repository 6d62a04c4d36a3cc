//! # Preprocessor
//!
//! Normalises the token stream between the [`tokenizer`](crate::tokenizer)
//! and the [`analyzer`](crate::analyzer).
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Parser → Binder → Evaluator
//! ```
//!
//! After preprocessing, every remaining [`Token::Newline`] terminates a
//! statement:
//!
//! * whitespace and comment tokens are dropped
//! * runs of blank lines collapse into one line break
//! * leading and trailing line breaks are removed
//! * a line break directly before `then` or `else` is removed, so a chain may
//!   continue on the next line

use crate::tokenizer::token::{Token, TokenSpan};

/// A trait for preprocessing different types of input
pub trait Preprocessor<T, U = T> {
    /// Process the input of type T and return the processed result
    fn process(&self, input: T) -> U;
}

/// Token-specific preprocessor implementation
#[derive(Debug, Default, Clone)]
pub struct TokenPreprocessor {}

impl TokenPreprocessor {
    pub fn new() -> Self {
        Self {}
    }
}

impl Preprocessor<Vec<TokenSpan>> for TokenPreprocessor {
    fn process(&self, input: Vec<TokenSpan>) -> Vec<TokenSpan> {
        let significant = input
            .into_iter()
            .filter(|span| !span.token.is_comment() && !span.token.is_whitespace());

        let mut output: Vec<TokenSpan> = Vec::new();
        for span in significant {
            if span.token.is_newline() {
                // leading or repeated line break
                if output.last().map_or(true, |prev| prev.token.is_newline()) {
                    continue;
                }
            } else if span.token.continues_chain() || span.token == Token::Eof {
                if output.last().is_some_and(|prev| prev.token.is_newline()) {
                    output.pop();
                }
            }
            output.push(span);
        }

        tracing::trace!(tokens = output.len(), "preprocessed token stream");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{keyword::Keyword, token::Tokenizer};

    fn preprocess(source: &str) -> Vec<Token> {
        let spans = Tokenizer::new().tokenize(source).unwrap();
        TokenPreprocessor::default()
            .process(spans)
            .into_iter()
            .map(|span| span.token)
            .collect()
    }

    #[test]
    fn test_drops_whitespace_and_comments() {
        let tokens = preprocess("x: 1 // trailing\n/* block */ y: 2");
        assert!(!tokens.iter().any(|t| t.is_whitespace() || t.is_comment()));
        assert_eq!(tokens.iter().filter(|t| t.is_newline()).count(), 1);
    }

    #[test]
    fn test_collapses_and_strips_blank_lines() {
        let tokens = preprocess("\n\n  x: 1\n\n\n\ny: 2\n\n");
        assert_eq!(tokens.first(), Some(&Token::Identifier("x".to_string())));
        assert_eq!(tokens.iter().filter(|t| t.is_newline()).count(), 1);
        assert_eq!(tokens.last(), Some(&Token::Eof));
    }

    #[test]
    fn test_chain_continuation_joins_lines() {
        let tokens = preprocess("when a to 1 then b\n    then c\nelse then d");
        assert!(!tokens.iter().any(|t| t.is_newline()));
        assert_eq!(
            tokens
                .iter()
                .filter(|t| **t == Token::Keyword(Keyword::Then))
                .count(),
            3
        );
    }

    #[test]
    fn test_positions_survive() {
        let spans = Tokenizer::new().tokenize("x: 1\n\n  y: 2").unwrap();
        let processed = TokenPreprocessor::new().process(spans);
        let y = processed
            .iter()
            .find(|s| s.token == Token::Identifier("y".to_string()))
            .unwrap();
        assert_eq!((y.line, y.column), (3, 3));
    }
}
