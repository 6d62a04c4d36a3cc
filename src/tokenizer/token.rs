use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    combinator::recognize,
    error::{context, VerboseError},
    sequence::pair,
    IResult,
};
use thiserror::Error;

use super::{
    comment::parse_comment,
    keyword::Keyword,
    literal::{
        boolean_from_word, invalid_escape_offset, is_unterminated_string, out_of_range_integer,
        parse_literal, Literal,
    },
    symbol::{parse_delimiter, parse_operator, Delimiter, Operator},
    whitespace::{parse_newline, parse_whitespace},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Keyword(Keyword),
    // Identifiers (single words; phrases are built by the parser)
    Identifier(String),
    // Symbols
    Operator(Operator),
    Delimiter(Delimiter),
    // Literals
    Literal(Literal),
    // Formatting
    Whitespace(String),
    Newline,
    Comment {
        content: String,
        comment_type: CommentType,
    },
    // End marker, always the last token of a stream
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentType {
    Line,  // //
    Block, // /* */
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, Token::Newline)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment { .. })
    }

    /// True for `then` and `else`, which continue a statement across a line
    /// break.
    pub fn continues_chain(&self) -> bool {
        matches!(self, Token::Keyword(kw) if kw.continues_chain())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "`{}`", kw),
            Token::Identifier(word) => write!(f, "`{}`", word),
            Token::Operator(op) => write!(f, "`{}`", op),
            Token::Delimiter(d) => write!(f, "`{}`", d),
            Token::Literal(Literal::String(s)) => write!(f, "{:?}", s),
            Token::Literal(Literal::Integer(i)) => write!(f, "{}", i),
            Token::Literal(Literal::Float(x)) => write!(f, "{}", x),
            Token::Literal(Literal::Boolean(b)) => write!(f, "`{}`", b),
            Token::Whitespace(_) => write!(f, "whitespace"),
            Token::Newline => write!(f, "end of line"),
            Token::Comment { .. } => write!(f, "comment"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Single-pass tokenizer that tracks byte offset, line and column.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    current_position: usize,
    current_line: usize,
    current_column: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_line: 1,   // 1-based
            current_column: 1, // 1-based
        }
    }

    /// Tokenizes the whole input, stopping at the first lexical error.
    #[tracing::instrument(level = "debug", skip(self, input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let tokens = self.stream(input).collect::<TokenizerResult<Vec<_>>>();
        if let Err(error) = &tokens {
            tracing::error!("{}", error);
        }
        tokens
    }

    /// Lazily yields tokens; the last item is either an error or
    /// [`Token::Eof`].
    pub fn stream<'t, 'a>(&'t mut self, input: &'a str) -> TokenStream<'t, 'a> {
        TokenStream {
            tokenizer: self,
            input,
            remaining: input,
            finished: false,
        }
    }

    fn current_span(&self, width: usize) -> Span {
        Span {
            start: self.current_position,
            end: self.current_position + width,
            line: self.current_line,
            column: self.current_column,
        }
    }

    fn next_token(&mut self, remaining: &str) -> TokenizerResult<(usize, TokenSpan)> {
        let start_position = self.current_position;
        let start_line = self.current_line;
        let start_column = self.current_column;

        let result = alt((
            // Formatting
            parse_whitespace,
            parse_newline,
            // Literals
            parse_literal,
            // Comments
            parse_comment,
            // Code elements
            parse_operator,
            parse_delimiter,
            parse_word,
        ))(remaining);

        match result {
            Ok((new_remaining, token)) => {
                let consumed = remaining.len() - new_remaining.len();
                self.update_position(&remaining[..consumed]);
                Ok((
                    consumed,
                    TokenSpan {
                        token,
                        start: start_position,
                        end: self.current_position,
                        line: start_line,
                        column: start_column,
                    },
                ))
            }
            Err(_) => Err(self.classify_error(remaining)),
        }
    }

    /// Span of `width` bytes starting `offset` bytes into the current line.
    fn span_at(&self, remaining: &str, offset: usize, width: usize) -> Span {
        let start = self.current_position + offset;
        Span {
            start,
            end: start + width,
            line: self.current_line,
            column: self.current_column + remaining[..offset].chars().count(),
        }
    }

    fn classify_error(&self, remaining: &str) -> TokenizerError {
        if let Some(offset) = invalid_escape_offset(remaining) {
            let sequence: String = remaining[offset..].chars().take(2).collect();
            return TokenizerError::InvalidEscape {
                span: self.span_at(remaining, offset, sequence.len()),
                sequence,
            };
        }
        if is_unterminated_string(remaining) {
            let width = remaining.find(['\n', '\r']).unwrap_or(remaining.len());
            return TokenizerError::UnterminatedString {
                span: self.current_span(width),
            };
        }
        if remaining.starts_with("/*") {
            return TokenizerError::UnterminatedComment {
                span: self.current_span(remaining.len()),
            };
        }
        if let Some(width) = out_of_range_integer(remaining) {
            return TokenizerError::NumberOutOfRange {
                literal: remaining[..width].to_string(),
                span: self.current_span(width),
            };
        }
        let found = remaining.chars().next().unwrap_or('\0');
        TokenizerError::IllegalCharacter {
            found,
            span: self.current_span(found.len_utf8()),
        }
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            if c == '\n' {
                self.current_line += 1;
                self.current_column = 1;
            } else {
                self.current_column += 1;
            }
        }
    }
}

/// Iterator returned by [`Tokenizer::stream`].
pub struct TokenStream<'t, 'a> {
    tokenizer: &'t mut Tokenizer,
    input: &'a str,
    remaining: &'a str,
    finished: bool,
}

impl Iterator for TokenStream<'_, '_> {
    type Item = TokenizerResult<TokenSpan>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.remaining.is_empty() {
            self.finished = true;
            let span = self.tokenizer.current_span(0);
            return Some(Ok(TokenSpan {
                token: Token::Eof,
                start: span.start,
                end: span.end,
                line: span.line,
                column: span.column,
            }));
        }
        match self.tokenizer.next_token(self.remaining) {
            Ok((consumed, token)) => {
                self.remaining = &self.remaining[consumed..];
                Some(Ok(token))
            }
            Err(error) => {
                self.finished = true;
                tracing::debug!(
                    offset = self.input.len() - self.remaining.len(),
                    "tokenizer stopped"
                );
                Some(Err(error))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl TokenSpan {
    pub fn span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
            line: self.line,
            column: self.column,
        }
    }
}

impl AsRef<Token> for TokenSpan {
    fn as_ref(&self) -> &Token {
        &self.token
    }
}

impl std::fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.token.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Reads one word and classifies it as keyword, word operator, boolean
/// literal or identifier.
#[tracing::instrument(level = "debug", skip(input))]
fn parse_word(input: &str) -> ParserResult<Token> {
    let (input, word) = context(
        "identifier",
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
    )(input)?;

    // Check if identifier is not a specials
    if let Ok(kw) = Keyword::try_from(word) {
        return Ok((input, Token::Keyword(kw)));
    }
    if word == Operator::Contains.as_ref() {
        return Ok((input, Token::Operator(Operator::Contains)));
    }
    if let Some(literal) = boolean_from_word(word) {
        return Ok((input, Token::Literal(literal)));
    }

    Ok((input, Token::Identifier(word.to_string())))
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("unterminated string literal at {span}")]
    UnterminatedString { span: Span },
    #[error("unterminated block comment at {span}")]
    UnterminatedComment { span: Span },
    #[error("invalid escape sequence {sequence:?} at {span}")]
    InvalidEscape { sequence: String, span: Span },
    #[error("integer literal {literal} is out of range at {span}")]
    NumberOutOfRange { literal: String, span: Span },
    #[error("illegal character {found:?} at {span}")]
    IllegalCharacter { found: char, span: Span },
}

impl TokenizerError {
    pub fn span(&self) -> &Span {
        match self {
            TokenizerError::UnterminatedString { span }
            | TokenizerError::UnterminatedComment { span }
            | TokenizerError::InvalidEscape { span, .. }
            | TokenizerError::NumberOutOfRange { span, .. }
            | TokenizerError::IllegalCharacter { span, .. } => span,
        }
    }
}
