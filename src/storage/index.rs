//! # Index B-Tree Walker
//!
//! An `Index` pairs a parsed `CREATE INDEX` definition with the root page of
//! an index B-tree and answers equality searches: which rowids have the given
//! value in the indexed column.
//!
//! Index trees store real entries in interior cells, not just separators, so
//! the search collects matches from three places: leaf entries, and the left
//! and right bracketing keys of every interior pointer it descends. A hash
//! set deduplicates the bracketing keys, which appear on two adjacent
//! pointers.

use crate::sql::ast::CreateIndexStmt;
use crate::sql::parser::Parser;
use crate::storage::page::{IndexEntry, IndexPage};
use crate::storage::pointer::Pointer;
use crate::storage::StorageEngine;
use crate::types::Value;
use eyre::{ensure, Result, WrapErr};
use hashbrown::HashSet;
use std::cmp::Ordering;

pub struct Index<'a> {
    storage: &'a StorageEngine,
    name: String,
    root: u32,
    definition: CreateIndexStmt,
}

impl<'a> Index<'a> {
    pub(crate) fn new(
        storage: &'a StorageEngine,
        name: String,
        root: u32,
        schema: &str,
    ) -> Result<Self> {
        let definition = Parser::new(schema)
            .create_index()
            .wrap_err_with(|| format!("index {name}: malformed schema"))?;
        Ok(Self { storage, name, root, definition })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.definition.table
    }

    /// The single column this index covers.
    pub fn column(&self) -> &str {
        &self.definition.column
    }

    /// Rowids of all entries whose indexed column equals `value`, in
    /// unspecified order.
    pub fn find_matching_record_ids(&self, column: &str, value: &Value) -> Result<Vec<i64>> {
        ensure!(
            self.definition.column == column,
            "index {} does not cover column {column}",
            self.name
        );
        let mut rows = HashSet::new();
        let root = self.storage.get_page(self.root)?.into_index()?;
        self.collect(root, &mut rows, value)?;
        Ok(rows.into_iter().collect())
    }

    fn collect(&self, page: IndexPage, rows: &mut HashSet<i64>, value: &Value) -> Result<()> {
        match page {
            IndexPage::Leaf(leaf) => {
                for entry in leaf.entries()? {
                    if matches(&entry, value) {
                        rows.insert(entry.row_id);
                    }
                }
            }
            IndexPage::Interior(interior) => {
                for pointer in interior.pointers()? {
                    if !may_contain(&pointer, value) {
                        continue;
                    }
                    for key in [&pointer.left, &pointer.right].into_iter().flatten() {
                        if matches(key, value) {
                            rows.insert(key.row_id);
                        }
                    }
                    let child = self.storage.get_page(pointer.child)?.into_index()?;
                    self.collect(child, rows, value)?;
                }
            }
        }
        Ok(())
    }
}

fn matches(entry: &IndexEntry, value: &Value) -> bool {
    entry.first() == Some(value)
}

/// Range test on the first indexed component: unbounded sides match, bounded
/// sides compare against the endpoint key's first value. Keys that do not
/// order against the needle cannot contain it.
fn may_contain(pointer: &Pointer<IndexEntry>, value: &Value) -> bool {
    let cmp = |key: &IndexEntry| key.first().and_then(|first| first.partial_cmp(value));
    let below = |key: &IndexEntry| matches!(cmp(key), Some(Ordering::Less | Ordering::Equal));
    let above = |key: &IndexEntry| matches!(cmp(key), Some(Ordering::Greater | Ordering::Equal));
    pointer.left.as_ref().map_or(true, below) && pointer.right.as_ref().map_or(true, above)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, row_id: i64) -> IndexEntry {
        IndexEntry { key: vec![Value::Text(text.into())], row_id }
    }

    #[test]
    fn range_test_on_first_component() {
        let pointer = Pointer::new(Some(entry("b", 1)), Some(entry("m", 2)), 4);
        assert!(may_contain(&pointer, &Value::Text("b".into())));
        assert!(may_contain(&pointer, &Value::Text("g".into())));
        assert!(may_contain(&pointer, &Value::Text("m".into())));
        assert!(!may_contain(&pointer, &Value::Text("a".into())));
        assert!(!may_contain(&pointer, &Value::Text("z".into())));
    }

    #[test]
    fn unbounded_sides_match() {
        assert!(may_contain(
            &Pointer::new(None, Some(entry("m", 1)), 4),
            &Value::Text("a".into())
        ));
        assert!(may_contain(
            &Pointer::new(Some(entry("m", 1)), None, 4),
            &Value::Text("z".into())
        ));
    }

    #[test]
    fn unorderable_needle_is_never_contained() {
        let pointer = Pointer::new(Some(entry("b", 1)), Some(entry("m", 2)), 4);
        assert!(!may_contain(&pointer, &Value::Int(5)));
    }

    #[test]
    fn match_compares_first_component_structurally() {
        assert!(matches(&entry("x", 1), &Value::Text("x".into())));
        assert!(!matches(&entry("x", 1), &Value::Text("y".into())));
        assert!(!matches(&entry("x", 1), &Value::Int(1)));
    }
}
