//! # Token Definitions
//!
//! Tokens produced by the SQL lexer. String-carrying tokens borrow from the
//! input, so tokenization never allocates.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Create,
    Table,
    Index,
    Where,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Keyword(Keyword),
    /// Bare or double-quoted identifier.
    Ident(&'a str),
    /// Single-quoted string literal.
    Str(&'a str),
    Comma,
    Eq,
    LParen,
    RParen,
    Star,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "{}", format!("{kw:?}").to_uppercase()),
            Token::Ident(name) => write!(f, "identifier {name}"),
            Token::Str(text) => write!(f, "string '{text}'"),
            Token::Comma => write!(f, "','"),
            Token::Eq => write!(f, "'='"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Star => write!(f, "'*'"),
        }
    }
}
