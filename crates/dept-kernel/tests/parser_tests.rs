//! Lexer and parser tables for the prompt language.

use dept_kernel::ast::{Call, Expr, Head, Literal};
use dept_kernel::lexer::{tokenize, LexError, Token};
use dept_kernel::parser::{parse, ParseError};
use rstest::rstest;

fn lex(source: &str) -> Vec<Token> {
    tokenize(source)
        .expect("lexer should succeed")
        .into_iter()
        .map(|s| s.token)
        .collect()
}

fn parse_str(source: &str) -> Result<Expr, ParseError> {
    parse(&tokenize(source).expect("lexer should succeed"))
}

fn call(name: &str, args: Vec<Literal>) -> Call {
    Call {
        name: name.to_string(),
        args: Some(args),
    }
}

#[rstest]
#[case("12", Token::Number(12.0))]
#[case("-1.5", Token::Number(-1.5))]
#[case("\"a\\tb\"", Token::String("a\tb".into()))]
#[case("\"say \\\"hi\\\"\"", Token::String("say \"hi\"".into()))]
#[case("'raw\\n'", Token::RawString("raw\\n".into()))]
#[case("/\\d+/", Token::Regex("\\d+".into()))]
#[case("/a\\/b/", Token::Regex("a/b".into()))]
#[case("write_file", Token::Ident("write_file".into()))]
fn single_tokens(#[case] source: &str, #[case] expected: Token) {
    assert_eq!(lex(source), vec![expected]);
}

#[test]
fn punctuation_and_whitespace() {
    assert_eq!(
        lex(" [ 1 ,\t2 ] . ( ) "),
        vec![
            Token::LBracket,
            Token::Number(1.0),
            Token::Comma,
            Token::Number(2.0),
            Token::RBracket,
            Token::Dot,
            Token::LParen,
            Token::RParen,
        ]
    );
}

#[rstest]
#[case("data;")]
#[case("V(1) & V(2)")]
#[case("\"\\uZZZZ\"")]
fn lexer_rejects(#[case] source: &str) {
    assert!(tokenize(source).is_err());
}

#[test]
fn bad_unicode_escape_is_reported() {
    let errors = tokenize("\"\\u00\"").unwrap_err();
    assert_eq!(errors[0].token, LexError::InvalidEscape);
}

#[rstest]
#[case("data", Head::Call(Call { name: "data".into(), args: None }), vec![])]
#[case("V()", Head::Call(call("V", vec![])), vec![])]
#[case(
    "V(1, 'a').reverse()",
    Head::Call(call("V", vec![Literal::Num(1.0), Literal::Str("a".into())])),
    vec![call("reverse", vec![])]
)]
#[case(
    "data.map(upper).replace(/x+/, '-')",
    Head::Call(Call { name: "data".into(), args: None }),
    vec![
        call("map", vec![Literal::Ident("upper".into())]),
        call("replace", vec![Literal::Regex("x+".into()), Literal::Str("-".into())]),
    ]
)]
#[case(
    "[1, [2, 3]].flatten()",
    Head::Literal(Literal::List(vec![
        Literal::Num(1.0),
        Literal::List(vec![Literal::Num(2.0), Literal::Num(3.0)]),
    ])),
    vec![call("flatten", vec![])]
)]
#[case("'x'", Head::Literal(Literal::Str("x".into())), vec![])]
fn parses(#[case] source: &str, #[case] head: Head, #[case] chain: Vec<Call>) {
    assert_eq!(parse_str(source), Ok(Expr { head, chain }));
}

#[rstest]
#[case("data.", "a method name", "end of input")]
#[case("data.split(','", "`)`", "end of input")]
#[case("V(1,)", "an argument", "`)`")]
#[case("data data", "`.`", "`data`")]
#[case("data.12()", "a method name", "12")]
#[case("[1 2]", "`]`", "2")]
#[case(").x()", "a value", "`)`")]
fn parse_errors(#[case] source: &str, #[case] expected: &str, #[case] found: &str) {
    let message = parse_str(source).unwrap_err().to_string();
    assert!(message.starts_with("expected "), "{message}");
    assert!(message.contains(expected), "{message}");
    assert!(message.ends_with(&format!("found {found}")), "{message}");
}

#[test]
fn empty_token_stream() {
    assert_eq!(parse(&[]), Err(ParseError::Empty));
}
