//! Lexer for prompt expressions.
//!
//! The language is small: identifiers, numbers, three kinds of quoted
//! literal and a handful of punctuation.
//!
//! - `"..."` strings process escapes (`\n`, `\t`, `\r`, `\\`, `\"`, `\uXXXX`);
//!   unknown escapes keep their backslash.
//! - `'...'` strings are raw.
//! - `/.../` is a regex literal; only `\/` is unescaped.

use logos::{Logos, Span};
use std::fmt;
use thiserror::Error;

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexError {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid number")]
    InvalidNumber,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", lex_number)]
    Number(f64),

    #[regex(r#""([^"\\]|\\.)*""#, lex_string)]
    String(String),

    #[regex(r"'[^']*'", lex_raw_string)]
    RawString(String),

    #[regex(r"/([^/\\\n]|\\.)*/", lex_regex)]
    Regex(String),

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "`{s}`"),
            Token::Number(n) => write!(f, "{}", dept_types::format_number(*n)),
            Token::String(s) => write!(f, "{s:?}"),
            Token::RawString(s) => write!(f, "'{s}'"),
            Token::Regex(s) => write!(f, "/{s}/"),
            Token::Dot => write!(f, "`.`"),
            Token::Comma => write!(f, "`,`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBracket => write!(f, "`[`"),
            Token::RBracket => write!(f, "`]`"),
        }
    }
}

fn lex_number(lex: &mut logos::Lexer<Token>) -> Result<f64, LexError> {
    lex.slice().parse().map_err(|_| LexError::InvalidNumber)
}

fn lex_string(lex: &mut logos::Lexer<Token>) -> Result<String, LexError> {
    let s = lex.slice();
    unescape(&s[1..s.len() - 1])
}

fn lex_raw_string(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].to_string()
}

fn lex_regex(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].replace("\\/", "/")
}

/// Process escapes in the body of a double-quoted string.
fn unescape(inner: &str) -> Result<String, LexError> {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    return Err(LexError::InvalidEscape);
                }
                let codepoint = u32::from_str_radix(&hex, 16).map_err(|_| LexError::InvalidEscape)?;
                result.push(char::from_u32(codepoint).ok_or(LexError::InvalidEscape)?);
            }
            // Keep the backslash so `"\d+"` still reads as a regex-ish string.
            Some(next) => {
                result.push('\\');
                result.push(next);
            }
            None => result.push('\\'),
        }
    }

    Ok(result)
}

/// Tokenize a prompt line.
///
/// Collects every error rather than stopping at the first.
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>, Vec<Spanned<LexError>>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned::new(token, span)),
            Err(err) => errors.push(Spanned::new(err, span)),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("lexer should succeed")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn method_chain() {
        assert_eq!(
            lex("data.split(\",\")"),
            vec![
                Token::Ident("data".into()),
                Token::Dot,
                Token::Ident("split".into()),
                Token::LParen,
                Token::String(",".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn spans_point_into_source() {
        let tokens = tokenize("V(12)").unwrap();
        assert_eq!(tokens[2].span, 2..4);
    }

    #[test]
    fn unknown_escape_keeps_backslash() {
        assert_eq!(unescape(r"\d\n"), Ok("\\d\n".to_string()));
        assert_eq!(unescape(r"\u00e9"), Ok("é".to_string()));
        assert_eq!(unescape(r"\u12"), Err(LexError::InvalidEscape));
    }

    #[test]
    fn errors_are_collected() {
        let errors = tokenize("data # ;").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].token, LexError::UnexpectedCharacter);
        assert_eq!(errors[0].span, 5..6);
    }
}
