//! # Query Engine
//!
//! Binds a parsed statement to the storage layer and evaluates it.
//!
//! ## Evaluation Flow
//!
//! 1. Parse the input into a statement.
//! 2. `CREATE` statements are rejected — this engine is read-only.
//! 3. For a `SELECT`, resolve the table, then gather rows: with a `WHERE`
//!    clause, an index covering the filter column turns the scan into point
//!    lookups by the index's matching rowids; otherwise every row is scanned
//!    and filtered by structural equality.
//! 4. Project: a function call anywhere in the select list makes the result
//!    a single aggregate row (`count` is the supported function); otherwise
//!    each row maps through the column/literal expressions.
//!
//! A rowid produced by an index but absent from its table is a broken
//! database invariant and aborts evaluation.

use super::ast::{Expr, Filter, Literal, SelectStmt, Statement};
use super::parser::Parser;
use crate::storage::{Index, StorageEngine, Table, TableRow};
use crate::types::Value;
use eyre::{bail, Result};

pub struct QueryEngine<'a> {
    db: &'a StorageEngine,
}

impl<'a> QueryEngine<'a> {
    pub fn new(db: &'a StorageEngine) -> Self {
        Self { db }
    }

    /// Evaluates one SQL statement into result rows.
    pub fn evaluate(&self, sql: &str) -> Result<Vec<Vec<Value>>> {
        match Parser::new(sql).statement()? {
            Statement::CreateTable(_) => bail!("table creation not supported"),
            Statement::CreateIndex(_) => bail!("index creation not supported"),
            Statement::Select(select) => self.select(select),
        }
    }

    fn select(&self, stmt: SelectStmt) -> Result<Vec<Vec<Value>>> {
        let table = self
            .db
            .table(&stmt.table)?
            .ok_or_else(|| eyre::eyre!("no such table: {}", stmt.table))?;
        let rows = match &stmt.filter {
            Some(filter) => self.filtered_rows(&table, filter)?,
            None => table.rows()?,
        };
        project(&table, &stmt.columns, rows)
    }

    /// Index-assisted retrieval when an index covers the filter column on the
    /// queried table; full scan otherwise.
    fn filtered_rows(&self, table: &Table<'_>, filter: &Filter) -> Result<Vec<TableRow>> {
        let Literal::Str(text) = &filter.value;
        let needle = Value::Text(text.clone());

        if let Some(index) = self.find_index(table, filter)? {
            let mut rows = Vec::new();
            for row_id in index.find_matching_record_ids(&filter.column, &needle)? {
                let row = table.get(row_id)?.ok_or_else(|| {
                    eyre::eyre!("row not found in table for indexed id {row_id}")
                })?;
                rows.push(row);
            }
            return Ok(rows);
        }

        let mut rows = Vec::new();
        for row in table.rows()? {
            if *table.value(&row, &filter.column)? == needle {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn find_index(&self, table: &Table<'_>, filter: &Filter) -> Result<Option<Index<'a>>> {
        Ok(self
            .db
            .indices()?
            .into_iter()
            .find(|index| index.table_name() == table.name() && index.column() == filter.column))
    }
}

fn is_aggregation(expr: &Expr) -> bool {
    matches!(expr, Expr::FnCall { .. })
}

fn project(table: &Table<'_>, columns: &[Expr], rows: Vec<TableRow>) -> Result<Vec<Vec<Value>>> {
    if columns.iter().any(is_aggregation) {
        let row = columns
            .iter()
            .map(|expr| aggregate(table, expr, &rows))
            .collect::<Result<Vec<_>>>()?;
        return Ok(vec![row]);
    }
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|expr| evaluate_expr(table, expr, row))
                .collect()
        })
        .collect()
}

fn aggregate(table: &Table<'_>, expr: &Expr, rows: &[TableRow]) -> Result<Value> {
    match expr {
        Expr::FnCall { name, .. } if name == "count" => Ok(Value::Int(rows.len() as i64)),
        Expr::FnCall { name, .. } => bail!("unknown function: {name}"),
        _ if rows.is_empty() => Ok(Value::Null),
        expr => evaluate_expr(table, expr, &rows[0]),
    }
}

fn evaluate_expr(table: &Table<'_>, expr: &Expr, row: &TableRow) -> Result<Value> {
    match expr {
        Expr::Column(name) => Ok(table.value(row, name)?.clone()),
        Expr::Literal(Literal::Str(text)) => Ok(Value::Text(text.clone())),
        expr => bail!("invalid expr: {expr:?}"),
    }
}
