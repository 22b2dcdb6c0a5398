//! # SQL Abstract Syntax Tree
//!
//! AST nodes produced by the parser. The supported statement forms are a
//! `SELECT` subset plus the two `CREATE` shapes needed to interpret catalog
//! schema text; the query engine rejects `CREATE` statements at evaluation
//! time.

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStmt),
    CreateTable(CreateTableStmt),
    CreateIndex(CreateIndexStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub columns: Vec<Expr>,
    pub filter: Option<Filter>,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `*`
    Star,
    /// `name(arg)` — the name is lowercased by the parser.
    FnCall { name: String, args: Vec<Expr> },
    /// Bare column reference.
    Column(String),
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
}

/// `WHERE column = literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

/// A column declaration: its name plus every following type or constraint
/// word, lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    pub name: String,
    pub table: String,
    pub column: String,
}
