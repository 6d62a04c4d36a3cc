//! # Core Parser Definitions
//!
//! This module defines the fundamental parser interface and error types
//! that form the foundation of the rule parser combinator system.

use thiserror::Error;

/// Parser trait defines the core parsing interface.
///
/// All parsers in the system implement this trait, which takes an input slice
/// and a position, and returns either a success result with a new position and
/// output value, or a parse error.
///
/// # Type Parameters
///
/// * `I` - The input token type
/// * `O` - The output value type
pub trait Parser<I, O> {
    /// Attempts to parse the input starting at the given position.
    ///
    /// # Returns
    ///
    /// * `Ok((new_pos, output))` - If parsing succeeds, returns the new position and the parsed value
    /// * `Err(error)` - If parsing fails, returns a ParseError
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

/// Result type for parsing operations.
///
/// On success, returns a tuple of the new position and the parsed value.
/// On failure, returns a ParseError.
pub type ParseResult<O> = Result<(usize, O), ParseError>;

/// Error type for parsing operations.
///
/// `position` is the index of the offending token in the parser input. The
/// position is what [`Choice`](super::combinators::Choice) uses to pick the
/// alternative that got furthest and what `Many`/`Optional` use to detect a
/// partially consumed item.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected end of input
    #[error("unexpected end of input at token {position}, expected {expected}")]
    UnexpectedEof { expected: String, position: usize },
    /// Unexpected token
    #[error("expected {expected}, found {found} at token {position}")]
    Unexpected {
        expected: String,
        found: String,
        position: usize,
    },
    /// No alternative matched
    #[error("no alternative matched at token {position}")]
    NoAlternative { position: usize },
    /// Error annotated with the construct being parsed
    #[error("{message}: {inner}")]
    WithContext {
        message: String,
        inner: Box<ParseError>,
    },
}

impl ParseError {
    pub fn get_position(&self) -> usize {
        match self {
            ParseError::UnexpectedEof { position, .. } => *position,
            ParseError::Unexpected { position, .. } => *position,
            ParseError::NoAlternative { position } => *position,
            ParseError::WithContext { inner, .. } => inner.get_position(),
        }
    }

    /// What the parser wanted at the failing position.
    pub fn expected(&self) -> String {
        match self {
            ParseError::UnexpectedEof { expected, .. } => expected.clone(),
            ParseError::Unexpected { expected, .. } => expected.clone(),
            ParseError::NoAlternative { .. } => "statement".to_string(),
            ParseError::WithContext { inner, .. } => inner.expected(),
        }
    }

    /// Description of the token actually found, if any.
    pub fn found(&self) -> Option<String> {
        match self {
            ParseError::Unexpected { found, .. } => Some(found.clone()),
            ParseError::WithContext { inner, .. } => inner.found(),
            _ => None,
        }
    }

    /// Outermost context message, e.g. `"event rule"`.
    pub fn context(&self) -> Option<&str> {
        match self {
            ParseError::WithContext { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Keeps the error that progressed further; equal positions merge their
    /// expectations.
    pub fn furthest(self, other: ParseError) -> ParseError {
        let (mine, theirs) = (self.get_position(), other.get_position());
        if mine > theirs {
            return self;
        }
        if theirs > mine {
            return other;
        }

        let mut expected = self.expected();
        let alternative = other.expected();
        if !expected.split(" or ").any(|e| e == alternative) {
            expected = format!("{} or {}", expected, alternative);
        }
        match self.found().or_else(|| other.found()) {
            Some(found) => ParseError::Unexpected {
                expected,
                found,
                position: mine,
            },
            None => ParseError::UnexpectedEof {
                expected,
                position: mine,
            },
        }
    }
}
