//! # Table B-Tree Walker
//!
//! A `Table` pairs a parsed `CREATE TABLE` definition with the root page of a
//! table B-tree and walks the tree on demand: `rows()` is a left-to-right
//! depth-first scan, `get(row_id)` descends the interior pointers whose rowid
//! range contains the target.
//!
//! Row decoding is schema-aware: the column declared `INTEGER PRIMARY KEY` is
//! an alias for the rowid, so its on-disk record slot holds NULL and the row
//! materializes the rowid there instead.

use crate::sql::ast::{ColumnDef, CreateTableStmt};
use crate::sql::parser::Parser;
use crate::storage::page::{LeafRow, TablePage};
use crate::storage::pointer::Pointer;
use crate::storage::StorageEngine;
use crate::types::Value;
use eyre::{Result, WrapErr};

pub struct Table<'a> {
    storage: &'a StorageEngine,
    name: String,
    root: u32,
    definition: CreateTableStmt,
    integer_pk: Option<usize>,
}

/// A decoded table row: the rowid plus one value per declared column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    row_id: i64,
    values: Vec<Value>,
}

impl TableRow {
    pub fn row_id(&self) -> i64 {
        self.row_id
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

fn is_integer_primary_key(column: &ColumnDef) -> bool {
    let mods = &column.modifiers;
    mods.iter().any(|m| m == "integer")
        && mods.iter().any(|m| m == "primary")
        && mods.iter().any(|m| m == "key")
}

impl<'a> Table<'a> {
    pub(crate) fn new(
        storage: &'a StorageEngine,
        name: String,
        root: u32,
        schema: &str,
    ) -> Result<Self> {
        let definition = Parser::new(schema)
            .create_table()
            .wrap_err_with(|| format!("table {name}: malformed schema"))?;
        let integer_pk = definition.columns.iter().position(is_integer_primary_key);
        Ok(Self { storage, name, root, definition, integer_pk })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of a column in this table's declaration order.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.definition
            .columns
            .iter()
            .position(|c| c.name == column)
    }

    /// Looks a named column up in a row of this table.
    pub fn value<'r>(&self, row: &'r TableRow, column: &str) -> Result<&'r Value> {
        let index = self
            .column_index(column)
            .ok_or_else(|| eyre::eyre!("no such column: {column}"))?;
        Ok(&row.values[index])
    }

    /// All rows, in left-to-right depth-first order.
    pub fn rows(&self) -> Result<Vec<TableRow>> {
        let mut rows = Vec::new();
        let root = self.storage.get_page(self.root)?.into_table()?;
        self.collect(root, &mut rows)?;
        Ok(rows)
    }

    /// Point lookup by rowid.
    pub fn get(&self, row_id: i64) -> Result<Option<TableRow>> {
        let root = self.storage.get_page(self.root)?.into_table()?;
        self.lookup(root, row_id)
    }

    fn collect(&self, page: TablePage, rows: &mut Vec<TableRow>) -> Result<()> {
        match page {
            TablePage::Leaf(leaf) => {
                for raw in leaf.rows()? {
                    rows.push(self.decode_row(raw));
                }
            }
            TablePage::Interior(interior) => {
                for pointer in interior.pointers()? {
                    let child = self.storage.get_page(pointer.child)?.into_table()?;
                    self.collect(child, rows)?;
                }
            }
        }
        Ok(())
    }

    fn lookup(&self, page: TablePage, row_id: i64) -> Result<Option<TableRow>> {
        match page {
            TablePage::Leaf(leaf) => {
                for raw in leaf.rows()? {
                    if raw.row_id == row_id {
                        return Ok(Some(self.decode_row(raw)));
                    }
                }
                Ok(None)
            }
            TablePage::Interior(interior) => {
                for pointer in interior.pointers()? {
                    if contains(&pointer, row_id) {
                        let child = self.storage.get_page(pointer.child)?.into_table()?;
                        return self.lookup(child, row_id);
                    }
                }
                Ok(None)
            }
        }
    }

    fn decode_row(&self, raw: LeafRow) -> TableRow {
        let LeafRow { row_id, record } = raw;
        let mut record = record.into_iter();
        let values = (0..self.definition.columns.len())
            .map(|index| {
                let stored = record.next().unwrap_or(Value::Null);
                if self.integer_pk == Some(index) {
                    Value::Int(row_id)
                } else {
                    stored
                }
            })
            .collect();
        TableRow { row_id, values }
    }
}

/// Inclusive range test: both endpoints admit the rowid unless bounded and
/// exceeded.
fn contains(pointer: &Pointer<i64>, row_id: i64) -> bool {
    pointer.left.map_or(true, |left| left <= row_id)
        && pointer.right.map_or(true, |right| row_id <= right)
}
