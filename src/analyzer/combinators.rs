//! # Parser Combinators
//!
//! This module implements the core parser combinators that form the building blocks
//! of the rule parser. These combinators allow for the composition of simple
//! parsers into more complex ones.
//!
//! ## Combinator Types
//!
//! * **Basic Combinators**: `Equal`, `Satisfy`
//! * **Sequential Combinators**: `Preceded`, `Tuple2`, `Tuple3`, `Tuple4`
//! * **Alternative Combinators**: `Choice`
//! * **Repetition Combinators**: `Many`, `Many1`, `Optional`
//! * **Transformation Combinators**: `Map`, `AsUnit`
//! * **Error Handling Combinators**: `WithContext`
//!
//! ## Commitment
//!
//! Parsing is fail-fast. `Many`, `Many1` and `Optional` stop quietly only when
//! the inner parser fails at the position where it started; an item that fails
//! after consuming tokens aborts the enclosing parse with that error.

use super::core::ParseError;
use super::core::ParseResult;
use super::core::Parser;
use std::fmt;
use std::marker::PhantomData;

/// Equal: Matches a specific value in the input
///
/// This parser succeeds if the current input item holds the specified value.
/// It consumes one item from the input on success.
#[derive(Clone)]
pub struct Equal<T> {
    /// The value to match against
    value: T,
}

impl<T> Equal<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<I, T> Parser<I, T> for Equal<T>
where
    I: AsRef<T> + fmt::Display,
    T: Clone + PartialEq + fmt::Display,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<T> {
        match input.get(pos) {
            Some(item) if *item.as_ref() == self.value => Ok((pos + 1, self.value.clone())),
            Some(item) => Err(ParseError::Unexpected {
                expected: self.value.to_string(),
                found: item.to_string(),
                position: pos,
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: self.value.to_string(),
                position: pos,
            }),
        }
    }
}

/// Satisfy: Consumes one item when the predicate maps it to a value
///
/// `expected` describes the accepted items in error messages.
#[derive(Clone)]
pub struct Satisfy<I, O, F> {
    expected: String,
    f: F,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O, F> Satisfy<I, O, F> {
    pub fn new(expected: &str, f: F) -> Self {
        Self {
            expected: expected.to_string(),
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<I, O, F>
where
    I: fmt::Display,
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        match input.get(pos) {
            Some(item) => match (self.f)(item) {
                Some(result) => Ok((pos + 1, result)),
                None => Err(ParseError::Unexpected {
                    expected: self.expected.clone(),
                    found: item.to_string(),
                    position: pos,
                }),
            },
            None => Err(ParseError::UnexpectedEof {
                expected: self.expected.clone(),
                position: pos,
            }),
        }
    }
}

/// Choice: Tries multiple parsers and succeeds with the first successful one
///
/// If all parsers fail, the error of the alternative that progressed furthest
/// is returned; ties merge their expectations.
pub struct Choice<I, O> {
    /// The list of parsers to try
    parsers: Vec<Box<dyn Parser<I, O>>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<Box<dyn Parser<I, O>>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let mut furthest: Option<ParseError> = None;
        for parser in &self.parsers {
            match parser.parse(input, pos) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    furthest = Some(match furthest {
                        Some(prev) => prev.furthest(e),
                        None => e,
                    })
                }
            }
        }
        Err(furthest.unwrap_or(ParseError::NoAlternative { position: pos }))
    }
}

#[derive(Clone)]
pub struct Preceded<P1, P2, I, O> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O)>,
}

impl<P1, P2, I, O> Preceded<P1, P2, I, O> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O> Parser<I, O> for Preceded<P1, P2, I, O>
where
    P1: Parser<I, ()>,
    P2: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, _) = self.parser1.parse(input, pos)?;
        let (pos, result) = self.parser2.parse(input, pos)?;
        Ok((pos, result))
    }
}

/// Map: Transforms the output of a parser using a function
#[derive(Clone)]
pub struct Map<P, F, A, B> {
    /// The parser whose output will be transformed
    parser: P,
    /// The transformation function
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> Map<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        self.parser
            .parse(input, pos)
            .map(|(pos, value)| (pos, (self.f)(value)))
    }
}

#[derive(Clone)]
pub struct AsUnit<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> AsUnit<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, P, O> Parser<I, ()> for AsUnit<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        self.parser.parse(input, pos).map(|(pos, _)| (pos, ()))
    }
}

/// Many: Applies a parser zero or more times
#[derive(Clone)]
pub struct Many<P, I, O> {
    /// The parser to apply repeatedly
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Many<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let current_pos = collect_repeated(&self.parser, input, pos, &mut results)?;
        Ok((current_pos, results))
    }
}

/// Many1: Applies a parser one or more times
#[derive(Clone)]
pub struct Many1<P, I, O> {
    /// The parser to apply repeatedly
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many1<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Many1<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let (pos, first) = self.parser.parse(input, pos)?;
        let mut results = vec![first];
        let current_pos = collect_repeated(&self.parser, input, pos, &mut results)?;
        Ok((current_pos, results))
    }
}

fn collect_repeated<I, O, P>(
    parser: &P,
    input: &[I],
    pos: usize,
    results: &mut Vec<O>,
) -> Result<usize, ParseError>
where
    P: Parser<I, O>,
{
    let mut current_pos = pos;
    loop {
        match parser.parse(input, current_pos) {
            Ok((new_pos, value)) => {
                results.push(value);
                if new_pos == current_pos {
                    return Ok(current_pos);
                }
                current_pos = new_pos;
            }
            Err(e) if e.get_position() > current_pos => return Err(e),
            Err(e) => {
                tracing::trace!(
                    target: "parser::many",
                    error = %e,
                    position = current_pos,
                    items_collected = results.len(),
                    "repetition stopped"
                );
                return Ok(current_pos);
            }
        }
    }
}

#[derive(Clone)]
pub struct Optional<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Optional<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Option<O>> for Optional<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Option<O>> {
        match self.parser.parse(input, pos) {
            Ok((new_pos, value)) => Ok((new_pos, Some(value))),
            Err(e) if e.get_position() > pos => Err(e),
            Err(_) => Ok((pos, None)),
        }
    }
}

#[derive(Clone)]
pub struct Tuple2<P1, P2, I, O1, O2> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1, O2)>,
}

impl<P1, P2, I, O1, O2> Tuple2<P1, P2, I, O1, O2> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, (O1, O2)> for Tuple2<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        Ok((pos, (result1, result2)))
    }
}

#[derive(Clone)]
pub struct Tuple3<P1, P2, P3, I, O1, O2, O3> {
    parser1: P1,
    parser2: P2,
    parser3: P3,
    _phantom: PhantomData<(I, O1, O2, O3)>,
}

impl<P1, P2, P3, I, O1, O2, O3> Tuple3<P1, P2, P3, I, O1, O2, O3> {
    pub fn new(parser1: P1, parser2: P2, parser3: P3) -> Self {
        Self {
            parser1,
            parser2,
            parser3,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, P3, I, O1, O2, O3> Parser<I, (O1, O2, O3)> for Tuple3<P1, P2, P3, I, O1, O2, O3>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2, O3)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        let (pos, result3) = self.parser3.parse(input, pos)?;
        Ok((pos, (result1, result2, result3)))
    }
}

// Tuple4
#[derive(Clone)]
pub struct Tuple4<P1, P2, P3, P4, I, O1, O2, O3, O4> {
    parser1: P1,
    parser2: P2,
    parser3: P3,
    parser4: P4,
    _phantom: PhantomData<(I, O1, O2, O3, O4)>,
}

impl<P1, P2, P3, P4, I, O1, O2, O3, O4> Tuple4<P1, P2, P3, P4, I, O1, O2, O3, O4> {
    pub fn new(parser1: P1, parser2: P2, parser3: P3, parser4: P4) -> Self {
        Self {
            parser1,
            parser2,
            parser3,
            parser4,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, P3, P4, I, O1, O2, O3, O4> Parser<I, (O1, O2, O3, O4)>
    for Tuple4<P1, P2, P3, P4, I, O1, O2, O3, O4>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
    P4: Parser<I, O4>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2, O3, O4)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        let (pos, result3) = self.parser3.parse(input, pos)?;
        let (pos, result4) = self.parser4.parse(input, pos)?;
        Ok((pos, (result1, result2, result3, result4)))
    }
}

#[derive(Clone)]
pub struct WithContext<P, C> {
    parser: P,
    context: C,
}

impl<P, C> WithContext<P, C> {
    pub fn new(parser: P, context: C) -> Self {
        Self { parser, context }
    }
}

impl<I, O, P, C: ToString> Parser<I, O> for WithContext<P, C>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        self.parser
            .parse(input, pos)
            .map_err(|e| ParseError::WithContext {
                message: self.context.to_string(),
                inner: Box::new(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(char);

    impl AsRef<char> for Item {
        fn as_ref(&self) -> &char {
            &self.0
        }
    }

    impl fmt::Display for Item {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "'{}'", self.0)
        }
    }

    fn items(s: &str) -> Vec<Item> {
        s.chars().map(Item).collect()
    }

    fn digit() -> Satisfy<Item, u32, impl Fn(&Item) -> Option<u32>> {
        Satisfy::new("digit", |item: &Item| item.0.to_digit(10))
    }

    #[test]
    fn test_equal() {
        let input = items("ab");
        assert_eq!(Equal::new('a').parse(&input, 0), Ok((1, 'a')));
        assert_eq!(
            Equal::new('a').parse(&input, 1),
            Err(ParseError::Unexpected {
                expected: "a".to_string(),
                found: "'b'".to_string(),
                position: 1,
            })
        );
        assert_eq!(
            Equal::new('a').parse(&input, 2),
            Err(ParseError::UnexpectedEof {
                expected: "a".to_string(),
                position: 2,
            })
        );
    }

    #[test]
    fn test_satisfy() {
        let input = items("7x");
        assert_eq!(digit().parse(&input, 0), Ok((1, 7)));
        assert!(matches!(
            digit().parse(&input, 1),
            Err(ParseError::Unexpected { position: 1, .. })
        ));
    }

    #[test]
    fn test_choice_reports_furthest_error() {
        let input = items("ab!");
        let parser: Choice<Item, ()> = Choice::new(vec![
            Box::new(AsUnit::new(Equal::new('x'))),
            Box::new(AsUnit::new(Tuple3::new(
                Equal::new('a'),
                Equal::new('b'),
                Equal::new('c'),
            ))),
        ]);
        assert_eq!(parser.parse(&input, 0).unwrap_err().get_position(), 2);
    }

    #[test]
    fn test_many_stops_without_progress() {
        let input = items("12a");
        assert_eq!(Many::new(digit()).parse(&input, 0), Ok((2, vec![1, 2])));
        assert_eq!(Many::new(digit()).parse(&input, 2), Ok((2, vec![])));
    }

    #[test]
    fn test_many_is_committed() {
        // pairs of digits: "12" then "3a" fails after consuming "3"
        let input = items("123a");
        let pairs = Many::new(Tuple2::new(digit(), digit()));
        assert!(matches!(
            pairs.parse(&input, 0),
            Err(ParseError::Unexpected { position: 3, .. })
        ));
    }

    #[test]
    fn test_many1() {
        let input = items("a");
        assert!(Many1::new(digit()).parse(&input, 0).is_err());
        let input = items("42");
        assert_eq!(Many1::new(digit()).parse(&input, 0), Ok((2, vec![4, 2])));
    }

    #[test]
    fn test_optional() {
        let input = items("-5");
        let sign = Optional::new(Equal::new('-'));
        assert_eq!(sign.parse(&input, 0), Ok((1, Some('-'))));
        assert_eq!(sign.parse(&input, 1), Ok((1, None)));

        let committed = Optional::new(Preceded::new(AsUnit::new(Equal::new('-')), digit()));
        let input = items("-x");
        assert!(committed.parse(&input, 0).is_err());
    }

    #[test]
    fn test_map_and_tuple4() {
        let input = items("1234");
        let sum = Map::new(
            Tuple4::new(digit(), digit(), digit(), digit()),
            |(a, b, c, d)| a + b + c + d,
        );
        assert_eq!(sum.parse(&input, 0), Ok((4, 10)));
    }

    #[test]
    fn test_with_context() {
        let input = items("x");
        let error = WithContext::new(digit(), "number").parse(&input, 0).unwrap_err();
        assert_eq!(error.context(), Some("number"));
        assert_eq!(error.expected(), "digit");
    }
}
