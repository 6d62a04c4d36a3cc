use thiserror::Error;

use crate::analyzer::SyntaxError;
use crate::binder::error::BindErrors;
use crate::config::ConfigError;
use crate::eval::error::RuntimeError;
use crate::formatter::error::FormatterError;
use crate::tokenizer::token::TokenizerError;

/// Why a source text did not produce a bound program.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("Lex error: {0}")]
    Lex(#[from] TokenizerError),
    #[error("Parse error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Bind errors:\n{0}")]
    Bind(#[from] BindErrors),
}

impl CompileError {
    /// `(line, column)` of the first reported problem.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            CompileError::Lex(error) => Some((error.span().line, error.span().column)),
            CompileError::Syntax(error) => Some((error.line, error.column)),
            CompileError::Bind(errors) => errors
                .errors
                .first()
                .map(|error| (error.location().line, error.location().column)),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Format error: {0}")]
    Format(#[from] FormatterError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RuleflowResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
