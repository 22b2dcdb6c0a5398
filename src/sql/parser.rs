//! # SQL Parser
//!
//! Recursive-descent parser over the lexer's token stream. Grammar:
//!
//! ```text
//! Statement   := Select | "CREATE" "TABLE" CreateTable | "CREATE" "INDEX" CreateIndex
//! Select      := "SELECT" Expr ("," Expr)* "FROM" IDENT Cond? EOF
//! Expr        := STR | "*" | IDENT [ "(" Expr ")" ]
//! Cond        := "WHERE" ColumnRef "=" Literal
//! CreateTable := IDENT "(" ColumnDef ("," ColumnDef)* ")" EOF
//! ColumnDef   := IDENT IDENT*
//! CreateIndex := IDENT "ON" IDENT "(" IDENT ")" EOF
//! ```
//!
//! An identifier followed by `(` parses as a function call with a lowercased
//! name; column-definition modifier words are lowercased the same way. Every
//! entry point consumes its statement to end of input.

use super::ast::{
    ColumnDef, CreateIndexStmt, CreateTableStmt, Expr, Filter, Literal, SelectStmt, Statement,
};
use super::lexer::Lexer;
use super::token::{Keyword, Token};
use eyre::{bail, ensure, Result};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { lexer: Lexer::new(input) }
    }

    /// Parses a full statement, dispatching on the leading token.
    pub fn statement(&mut self) -> Result<Statement> {
        if self.peek_keyword(Keyword::Create)? {
            self.expect_keyword(Keyword::Create)?;
            if self.peek_keyword(Keyword::Index)? {
                self.expect_keyword(Keyword::Index)?;
                Ok(Statement::CreateIndex(self.create_index_body()?))
            } else {
                self.expect_keyword(Keyword::Table)?;
                Ok(Statement::CreateTable(self.create_table_body()?))
            }
        } else {
            Ok(Statement::Select(self.select()?))
        }
    }

    pub fn select(&mut self) -> Result<SelectStmt> {
        self.expect_keyword(Keyword::Select)?;
        let mut columns = Vec::new();
        while !self.peek_keyword(Keyword::From)? {
            columns.push(self.expr()?);
            if !self.peek_keyword(Keyword::From)? {
                self.expect_token(Token::Comma)?;
            }
        }
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_ident()?.to_owned();
        let filter = if self.peek_keyword(Keyword::Where)? {
            Some(self.cond()?)
        } else {
            None
        };
        self.expect_eof()?;
        Ok(SelectStmt { columns, filter, table })
    }

    pub fn create_table(&mut self) -> Result<CreateTableStmt> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;
        self.create_table_body()
    }

    pub fn create_index(&mut self) -> Result<CreateIndexStmt> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Index)?;
        self.create_index_body()
    }

    fn create_table_body(&mut self) -> Result<CreateTableStmt> {
        let name = self.expect_ident()?.to_owned();
        self.expect_token(Token::LParen)?;
        let mut columns = Vec::new();
        while !self.peek_is(Token::RParen)? {
            columns.push(self.column_def()?);
            if !self.peek_is(Token::RParen)? {
                self.expect_token(Token::Comma)?;
            }
        }
        self.expect_token(Token::RParen)?;
        self.expect_eof()?;
        Ok(CreateTableStmt { name, columns })
    }

    fn create_index_body(&mut self) -> Result<CreateIndexStmt> {
        let name = self.expect_ident()?.to_owned();
        self.expect_keyword(Keyword::On)?;
        let table = self.expect_ident()?.to_owned();
        self.expect_token(Token::LParen)?;
        let column = self.expect_ident()?.to_owned();
        self.expect_token(Token::RParen)?;
        self.expect_eof()?;
        Ok(CreateIndexStmt { name, table, column })
    }

    fn column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_ident()?.to_owned();
        let mut modifiers = Vec::new();
        while !self.peek_is(Token::Comma)? && !self.peek_is(Token::RParen)? {
            modifiers.push(self.expect_ident()?.to_ascii_lowercase());
        }
        Ok(ColumnDef { name, modifiers })
    }

    fn expr(&mut self) -> Result<Expr> {
        match self.lexer.next_token()? {
            Token::Str(text) => Ok(Expr::Literal(Literal::Str(text.to_owned()))),
            Token::Star => Ok(Expr::Star),
            Token::Ident(name) => {
                if self.peek_is(Token::LParen)? {
                    self.fn_call(name)
                } else {
                    Ok(Expr::Column(name.to_owned()))
                }
            }
            token => bail!("parser: bad expr: {token}"),
        }
    }

    fn fn_call(&mut self, name: &str) -> Result<Expr> {
        self.expect_token(Token::LParen)?;
        let arg = self.expr()?;
        self.expect_token(Token::RParen)?;
        Ok(Expr::FnCall {
            name: name.to_ascii_lowercase(),
            args: vec![arg],
        })
    }

    fn cond(&mut self) -> Result<Filter> {
        self.expect_keyword(Keyword::Where)?;
        let column = match self.expr()? {
            Expr::Column(name) => name,
            expr => bail!("parser: want column name, got {expr:?}"),
        };
        self.expect_token(Token::Eq)?;
        let value = match self.expr()? {
            Expr::Literal(literal) => literal,
            expr => bail!("parser: want literal, got {expr:?}"),
        };
        Ok(Filter { column, value })
    }

    fn peek_is(&mut self, want: Token<'_>) -> Result<bool> {
        Ok(self.lexer.peek()? == Some(want))
    }

    fn peek_keyword(&mut self, keyword: Keyword) -> Result<bool> {
        self.peek_is(Token::Keyword(keyword))
    }

    fn expect_token(&mut self, want: Token<'_>) -> Result<()> {
        let token = self.lexer.next_token()?;
        ensure!(token == want, "parser: want {want}, got {token}");
        Ok(())
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        self.expect_token(Token::Keyword(keyword))
    }

    fn expect_ident(&mut self) -> Result<&'a str> {
        match self.lexer.next_token()? {
            Token::Ident(name) => Ok(name),
            token => bail!("parser: want identifier, got {token}"),
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        if let Some(token) = self.lexer.peek()? {
            bail!("parser: expected eof, got {token}");
        }
        Ok(())
    }
}
