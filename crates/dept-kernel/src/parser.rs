//! Parser for prompt expressions.
//!
//! Turns the lexer's token stream into an [`Expr`]. Uses chumsky parser
//! combinators over the logos tokens.
//!
//! ```text
//! expr    := head ('.' IDENT '(' args? ')')*
//! head    := IDENT ('(' args? ')')? | literal
//! literal := STRING | RAW | REGEX | NUMBER | '[' args? ']'
//! arg     := literal | IDENT
//! args    := arg (',' arg)*
//! ```

use std::ops::Range;

use chumsky::error::RichPattern;
use chumsky::{input::ValueInput, prelude::*};
use thiserror::Error;

use crate::ast::{Call, Expr, Head, Literal};
use crate::lexer::{Spanned, Token};

/// Span type used throughout the parser.
pub type Span = SimpleSpan;

type ParserExtra<'tokens> = extra::Err<Rich<'tokens, Token, Span>>;

/// Parse failures, with the offending span where there is one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,

    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        span: Range<usize>,
    },
}

impl ParseError {
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ParseError::Unexpected { span, .. } => Some(span.clone()),
            ParseError::Empty => None,
        }
    }

    fn from_rich(error: &Rich<'_, Token, Span>) -> Self {
        let mut expected: Vec<String> = error.expected().map(describe).collect();
        expected.sort();
        expected.dedup();
        let expected = if expected.is_empty() {
            "something else".to_string()
        } else {
            expected.join(" or ")
        };

        let found = match error.found() {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        };

        let span = error.span();
        ParseError::Unexpected {
            expected,
            found,
            span: span.start..span.end,
        }
    }
}

fn describe(pattern: &RichPattern<'_, Token>) -> String {
    match pattern {
        RichPattern::Token(token) => Token::to_string(token),
        RichPattern::Label(label) => label.to_string(),
        RichPattern::EndOfInput => "end of input".to_string(),
        _ => "something else".to_string(),
    }
}

/// Parse a tokenized line into an expression.
///
/// Only the first error is reported; a line is short enough that one
/// message is all the prompt shows.
pub fn parse(tokens: &[Spanned<Token>]) -> Result<Expr, ParseError> {
    let Some(last) = tokens.last() else {
        return Err(ParseError::Empty);
    };
    let end_span: Span = (last.span.end..last.span.end).into();

    let tokens: Vec<(Token, Span)> = tokens
        .iter()
        .map(|spanned| (spanned.token.clone(), (spanned.span.start..spanned.span.end).into()))
        .collect();

    let result = expr_parser().parse(tokens.as_slice().map(end_span, |(t, s)| (t, s)));

    result.into_result().map_err(|errors| {
        errors
            .first()
            .map_or(ParseError::Empty, ParseError::from_rich)
    })
}

/// A whole line: a head, any number of method calls, then end of input.
fn expr_parser<'tokens, I>() -> impl Parser<'tokens, I, Expr, ParserExtra<'tokens>>
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    let name = select! { Token::Ident(name) => name };

    let head = name
        .clone()
        .then(call_args().or_not())
        .map(|(name, args)| Head::Call(Call { name, args }))
        .or(scalar().or(list(arg_parser())).map(Head::Literal))
        .labelled("a value");

    let method = just(Token::Dot)
        .ignore_then(name.labelled("a method name"))
        .then(call_args())
        .map(|(name, args)| Call {
            name,
            args: Some(args),
        });

    head.then(method.repeated().collect::<Vec<_>>())
        .then_ignore(end())
        .map(|(head, chain)| Expr { head, chain })
}

/// `( arg, ... )`
fn call_args<'tokens, I>() -> impl Parser<'tokens, I, Vec<Literal>, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    arg_parser()
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LParen), just(Token::RParen))
}

/// A literal or a bare identifier; lists nest.
fn arg_parser<'tokens, I>() -> impl Parser<'tokens, I, Literal, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    recursive(|arg| {
        select! { Token::Ident(name) => Literal::Ident(name) }
            .or(scalar())
            .or(list(arg))
            .labelled("an argument")
    })
}

fn scalar<'tokens, I>() -> impl Parser<'tokens, I, Literal, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    select! {
        Token::String(s) => Literal::Str(s),
        Token::RawString(s) => Literal::Str(s),
        Token::Regex(s) => Literal::Regex(s),
        Token::Number(n) => Literal::Num(n),
    }
}

fn list<'tokens, I, P>(item: P) -> impl Parser<'tokens, I, Literal, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
    P: Parser<'tokens, I, Literal, ParserExtra<'tokens>> + Clone,
{
    item.separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBracket), just(Token::RBracket))
        .map(Literal::List)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_str(source: &str) -> Result<Expr, ParseError> {
        parse(&tokenize(source).expect("lexer should succeed"))
    }

    #[test]
    fn bare_identifier_head_has_no_args() {
        let expr = parse_str("data").unwrap();
        assert_eq!(
            expr.head,
            Head::Call(Call {
                name: "data".into(),
                args: None
            })
        );
        assert!(expr.chain.is_empty());
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(&[]), Err(ParseError::Empty));
    }

    #[test]
    fn nested_list_arguments() {
        let expr = parse_str("V([1, [x]], 'a')").unwrap();
        assert_eq!(
            expr.head,
            Head::Call(Call {
                name: "V".into(),
                args: Some(vec![
                    Literal::List(vec![
                        Literal::Num(1.0),
                        Literal::List(vec![Literal::Ident("x".into())]),
                    ]),
                    Literal::Str("a".into()),
                ]),
            })
        );
    }

    #[test]
    fn method_without_parens_is_an_error() {
        let err = parse_str("data.flatten").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("`(`"), "{message}");
        assert!(message.ends_with("found end of input"), "{message}");
    }

    #[test]
    fn error_span() {
        let err = parse_str("data.split(\",\" \"x\")").unwrap_err();
        assert!(err.to_string().ends_with("found \"x\""), "{err}");
        assert_eq!(err.span(), Some(15..18));
    }
}
