//! # Rule Analyzer (Parser)
//!
//! Transforms the preprocessed token stream into a [`Program`](crate::ast::Program)
//! using a parser combinator pattern.
//!
//! ## Core Components
//!
//! * **Parser Trait**: the core parsing interface ([`core`])
//! * **Combinators**: building blocks for composing parsers ([`combinators`], [`prelude`])
//! * **Grammar Parsers**: statements, chains and conditions ([`parsers`])
//!
//! ## Position in the Pipeline
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Analyzer → Binder → Evaluator
//! ```
//!
//! Parsing is fail-fast: the first deviation aborts the whole program and is
//! reported as a [`SyntaxError`] carrying the line and column of the
//! offending token.
//!
//! ## Usage Example
//!
//! ```
//! use ruleflow::analyzer::parse_tokens;
//! use ruleflow::preprocessor::{Preprocessor, TokenPreprocessor};
//! use ruleflow::tokenizer::token::Tokenizer;
//!
//! let tokens = Tokenizer::new().tokenize("retries: 3").unwrap();
//! let tokens = TokenPreprocessor::default().process(tokens);
//! let program = parse_tokens(&tokens).unwrap();
//! assert_eq!(program.statements.len(), 1);
//! ```

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;

use thiserror::Error;

use crate::ast::Program;
use crate::tokenizer::token::TokenSpan;

/// A parse failure mapped back to source coordinates.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("syntax error at line {line}, column {column}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub expected: String,
    pub found: String,
    pub line: usize,
    pub column: usize,
    /// Innermost construct being parsed, e.g. `"event rule"`.
    pub context: Option<String>,
}

impl SyntaxError {
    pub fn from_parse_error(error: &ParseError, tokens: &[TokenSpan]) -> Self {
        let position = error.get_position();
        let span = tokens.get(position).or_else(|| tokens.last());
        let found = error
            .found()
            .or_else(|| span.map(|s| s.token.to_string()))
            .unwrap_or_else(|| "end of input".to_string());
        Self {
            expected: error.expected(),
            found,
            line: span.map_or(1, |s| s.line),
            column: span.map_or(1, |s| s.column),
            context: innermost_context(error),
        }
    }
}

fn innermost_context(error: &ParseError) -> Option<String> {
    match error {
        ParseError::WithContext { message, inner } => {
            innermost_context(inner).or_else(|| Some(message.clone()))
        }
        _ => None,
    }
}

/// Parses a preprocessed token stream into a [`Program`].
#[tracing::instrument(level = "debug", skip(tokens), fields(tokens = tokens.len()))]
pub fn parse_tokens(tokens: &[TokenSpan]) -> Result<Program, SyntaxError> {
    parsers::parse_program()
        .parse(tokens, 0)
        .map(|(_, program)| program)
        .map_err(|e| {
            let error = SyntaxError::from_parse_error(&e, tokens);
            tracing::debug!(%error, "parse failed");
            error
        })
}
