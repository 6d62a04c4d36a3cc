//! # Tokenizer Component
//!
//! Lexical analysis of rule source text: raw text in, a flat stream of
//! [`TokenSpan`](token::TokenSpan)s out.
//!
//! ## Design Principles
//!
//! * **Position Information**: every token records byte offsets plus a 1-based
//!   line and column so later stages can report errors precisely.
//! * **Format Preservation**: whitespace, line breaks and comments are kept as
//!   tokens; the [`preprocessor`](crate::preprocessor) decides which of them
//!   matter.
//! * **Single Words**: identifiers are single words. Multi-word phrases such as
//!   `file size` or `send notification` are assembled by the parser.
//!
//! ## Component Structure
//!
//! * [`token`]: token types and the tokenizer loop
//! * [`keyword`]: reserved words
//! * [`symbol`]: comparison operators and the assignment colon
//! * [`literal`]: string, number and boolean literals
//! * [`whitespace`]: spaces, tabs and line breaks
//! * [`comment`]: line and block comments
//!
//! ## Error Handling
//!
//! [`TokenizerError`](token::TokenizerError) is raised for an unterminated
//! string, an unterminated block comment or an illegal character, and always
//! carries the [`Span`](token::Span) where lexing stopped.
//!
//! ## Usage Example
//!
//! ```rust
//! use ruleflow::tokenizer::token::{Token, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::new();
//! let tokens = tokenizer.tokenize("retries: 3").unwrap();
//! assert_eq!(tokens.last().map(|t| &t.token), Some(&Token::Eof));
//! ```

pub mod comment;
pub mod keyword;
pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;
