//! Lexer for the tag predicate DSL.

use winnow::ascii::space0;
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{any, take_while};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare key or value.
    Ident(String),
    /// Double-quoted key or value, escapes resolved.
    Quoted(String),

    Eq,       // =
    Ne,       // !=
    Match,    // ~
    NotMatch, // !~
    Not,      // !
    And,      // &

    Eof,
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Letters, digits, underscore, colon, dash and dot.
fn lex_ident(input: &mut &str) -> PResult<Token> {
    let s = take_while(1.., |c: char| {
        c.is_alphanumeric() || c == '_' || c == ':' || c == '-' || c == '.'
    })
    .parse_next(input)?;
    Ok(Token::Ident(s.to_string()))
}

/// `"..."` with `\"` and `\\` escapes. Other backslashes are kept so regex
/// escapes like `\.` survive.
fn lex_quoted(input: &mut &str) -> PResult<Token> {
    '"'.parse_next(input)?;
    let mut value = String::new();
    loop {
        let chunk = take_while(0.., |c: char| c != '"' && c != '\\').parse_next(input)?;
        value.push_str(chunk);
        match any.parse_next(input)? {
            '"' => return Ok(Token::Quoted(value)),
            _ => match any.parse_next(input)? {
                c @ ('"' | '\\') => value.push(c),
                c => {
                    value.push('\\');
                    value.push(c);
                }
            },
        }
    }
}

fn lex_token(input: &mut &str) -> PResult<Token> {
    space0.parse_next(input)?;

    if input.is_empty() {
        return Ok(Token::Eof);
    }

    alt((
        // Two-char operators before their one-char prefixes
        "!~".value(Token::NotMatch),
        "!=".value(Token::Ne),
        "!".value(Token::Not),
        "=".value(Token::Eq),
        "~".value(Token::Match),
        "&".value(Token::And),
        lex_quoted,
        lex_ident,
    ))
    .parse_next(input)
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        match lex_token(&mut remaining) {
            Ok(Token::Eof) => break,
            Ok(tok) => tokens.push(tok),
            Err(e) => return Err(format!("Lexer error at '{}': {:?}", remaining, e)),
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}
