//! Parser for the tag predicate DSL.
//!
//! Grammar (in rough EBNF):
//!
//! predicates = (predicate ("&" predicate)*)?
//! predicate  = "!" text | text (op text)?
//! op         = "=" | "!=" | "~" | "!~"
//! text       = IDENT | QUOTED

use super::lexer::{Token, tokenize};
use crate::query::TagPredicate;

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        let tok = self.advance();
        if tok == expected {
            Ok(())
        } else {
            Err(format!("Expected {:?}, got {:?}", expected, tok))
        }
    }

    /// predicate ("&" predicate)*
    fn parse_predicates(&mut self) -> Result<Vec<TagPredicate>, String> {
        let mut predicates = Vec::new();
        if matches!(self.peek(), Token::Eof) {
            return Ok(predicates);
        }

        predicates.push(self.parse_predicate()?);
        while matches!(self.peek(), Token::And) {
            self.advance(); // consume &
            predicates.push(self.parse_predicate()?);
        }
        Ok(predicates)
    }

    fn parse_predicate(&mut self) -> Result<TagPredicate, String> {
        if matches!(self.peek(), Token::Not) {
            self.advance(); // consume !
            let key = self.parse_text("key")?;
            return Ok(TagPredicate::not_exists(key));
        }

        let key = self.parse_text("key")?;
        let predicate = match self.peek() {
            Token::Eq => {
                self.advance();
                TagPredicate::equals(key, self.parse_text("value")?)
            }
            Token::Ne => {
                self.advance();
                TagPredicate::not_equals(key, self.parse_text("value")?)
            }
            Token::Match => {
                self.advance();
                TagPredicate::regex_match(key, self.parse_text("value")?)
            }
            Token::NotMatch => {
                self.advance();
                TagPredicate::regex_not_match(key, self.parse_text("value")?)
            }
            _ => TagPredicate::exists(key),
        };
        Ok(predicate)
    }

    fn parse_text(&mut self, what: &str) -> Result<String, String> {
        let pos = self.pos;
        match self.advance() {
            Token::Ident(s) | Token::Quoted(s) => Ok(s),
            tok => Err(format!("Expected {} at token {}, got {:?}", what, pos, tok)),
        }
    }
}

/// Parse a `&`-separated list of tag predicates. Empty input yields none.
pub fn parse_predicates(input: &str) -> Result<Vec<TagPredicate>, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let predicates = parser.parse_predicates()?;
    parser.expect(Token::Eof)?;
    Ok(predicates)
}
