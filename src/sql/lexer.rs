//! # SQL Lexer
//!
//! Zero-copy tokenizer for the supported SQL subset. All string tokens
//! (identifiers, literals) are borrowed slices pointing directly into the
//! input string.
//!
//! ## Accepted Input
//!
//! - **Keywords**: SELECT FROM CREATE TABLE INDEX WHERE ON, case-insensitive,
//!   matched through a compile-time perfect hash map (phf)
//! - **Identifiers**: `[A-Za-z_]+` bare, or double-quoted with the quoted
//!   text taken verbatim
//! - **String literals**: single-quoted, no escape processing
//! - **Punctuation**: `, = ( ) *`
//! - **Whitespace**: space, tab, newline, carriage return
//!
//! Anything else is a lexical error, as is a quoted token the input ends
//! inside of. The lexer provides one-token lookahead via `peek`.

use super::token::{Keyword, Token};
use eyre::{bail, Result};
use phf::phf_map;

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "SELECT" => Keyword::Select,
    "FROM" => Keyword::From,
    "CREATE" => Keyword::Create,
    "TABLE" => Keyword::Table,
    "INDEX" => Keyword::Index,
    "WHERE" => Keyword::Where,
    "ON" => Keyword::On,
};

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    lookahead: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            lookahead: None,
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<Token<'a>>> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan()?;
        }
        Ok(self.lookahead)
    }

    /// Consumes and returns the next token, if any.
    pub fn advance(&mut self) -> Result<Option<Token<'a>>> {
        if let Some(token) = self.lookahead.take() {
            return Ok(Some(token));
        }
        self.scan()
    }

    /// Consumes the next token; end of input is an error.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        match self.advance()? {
            Some(token) => Ok(token),
            None => bail!("lexer: unexpected eof"),
        }
    }

    pub fn is_eof(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_none())
    }

    fn scan(&mut self) -> Result<Option<Token<'a>>> {
        while let Some(&byte) = self.bytes.get(self.pos) {
            let token = match byte {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.pos += 1;
                    continue;
                }
                b',' => self.punct(Token::Comma),
                b'=' => self.punct(Token::Eq),
                b'(' => self.punct(Token::LParen),
                b')' => self.punct(Token::RParen),
                b'*' => self.punct(Token::Star),
                b'\'' => Token::Str(self.quoted(byte)?),
                b'"' => Token::Ident(self.quoted(byte)?),
                _ if is_identifier_byte(byte) => self.identifier(),
                _ => bail!("lexer: bad token: {}", char::from(byte)),
            };
            return Ok(Some(token));
        }
        Ok(None)
    }

    fn punct(&mut self, token: Token<'a>) -> Token<'a> {
        self.pos += 1;
        token
    }

    fn identifier(&mut self) -> Token<'a> {
        let begin = self.pos;
        while self.bytes.get(self.pos).is_some_and(|&b| is_identifier_byte(b)) {
            self.pos += 1;
        }
        let text = &self.input[begin..self.pos];
        match KEYWORDS.get(text.to_ascii_uppercase().as_str()) {
            Some(&keyword) => Token::Keyword(keyword),
            None => Token::Ident(text),
        }
    }

    /// Scans past the opening delimiter to the matching closing one and
    /// returns the text in between.
    fn quoted(&mut self, delim: u8) -> Result<&'a str> {
        self.pos += 1;
        let begin = self.pos;
        while let Some(&byte) = self.bytes.get(self.pos) {
            if byte == delim {
                let text = &self.input[begin..self.pos];
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        bail!("lexer: unexpected eof")
    }
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}
