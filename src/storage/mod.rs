//! # Storage Layer
//!
//! This module provides read-only access to a SQLite-format database file:
//! the 100-byte file header, fixed-size B-tree pages fetched on demand, and
//! the schema catalog that describes every table and index in the file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │    StorageEngine (this module)      │   header fields, page fetch,
//! ├──────────────────┬──────────────────┤   schema enumeration
//! │      Table       │      Index       │   schema-aware B-tree walkers
//! ├──────────────────┴──────────────────┤
//! │      Page (4 typed variants)        │   cell parsing, pointers
//! ├─────────────────────────────────────┤
//! │        Record / VarInt              │   payload decoding
//! ├─────────────────────────────────────┤
//! │          BackingFile                │   seek + read
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Schema Bootstrap
//!
//! Page 1 holds the root of `antdb_schema`, the catalog table listing every
//! other object (`type, name, tbl_name, rootpage, sql`). Its fixed `CREATE
//! TABLE` text runs through the same SQL parser user queries use, so there is
//! exactly one schema representation in the system. Tables and indices are
//! materialized by projecting the catalog's rows and parsing their stored
//! `sql` columns the same way.
//!
//! ## Resource Model
//!
//! Single-threaded and synchronous. Every page fetch is a fresh seek + read
//! against the backing file; no page cache sits in between. Page buffers are
//! owned by their typed view and dropped with it.

mod file;
mod header;
mod index;
mod page;
mod pointer;
mod record;
mod table;

pub use file::BackingFile;
pub use header::{DbHeader, TextEncoding, HEADER_SIZE};
pub use index::Index;
pub use page::{
    IndexEntry, IndexInteriorPage, IndexLeafPage, IndexPage, LeafRow, Page, TableInteriorPage,
    TableLeafPage, TablePage,
};
pub use pointer::Pointer;
pub use record::parse_record;
pub use table::{Table, TableRow};

use crate::types::Value;
use eyre::{bail, ensure, Result};
use std::path::Path;

/// Name of the catalog table rooted at page 1.
pub const SCHEMA_TABLE: &str = "antdb_schema";

const SCHEMA_SQL: &str = "CREATE TABLE antdb_schema(\
    type text, \
    name text, \
    tbl_name text, \
    rootpage integer, \
    sql text\
)";

/// Header-derived facts reported by `.dbinfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbInfo {
    pub page_size: u32,
    pub page_count: u32,
    pub table_count: usize,
}

/// One catalog row, every field rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObject {
    pub name: String,
    pub tbl_name: String,
    pub object_type: String,
    pub rootpage: String,
    pub sql: String,
}

#[derive(Debug)]
pub struct StorageEngine {
    file: BackingFile,
    page_size: u32,
    page_count: u32,
    encoding: TextEncoding,
}

impl StorageEngine {
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(BackingFile::open(path)?)
    }

    pub fn new(file: BackingFile) -> Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        file.seek(0)?;
        let read = file.read(&mut bytes)?;
        ensure!(read == HEADER_SIZE, "invalid header: must contain 100 bytes");
        let header = DbHeader::from_bytes(&bytes)?;
        let encoding = header.text_encoding()?;
        Ok(Self {
            page_size: header.page_size(),
            page_count: header.page_count(),
            encoding,
            file,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Fetches page `page_number` (1-based) and builds its typed view.
    pub fn get_page(&self, page_number: u32) -> Result<Page> {
        let mut data = vec![0u8; self.page_size as usize];
        let offset = u64::from(page_number - 1) * u64::from(self.page_size);
        self.file.seek(offset)?;
        let read = self.file.read(&mut data)?;
        ensure!(read == data.len(), "bad page size: want {}, got {read}", data.len());
        let base = if page_number == 1 { HEADER_SIZE } else { 0 };
        Page::parse(data, base, self.encoding)
    }

    /// Header-derived facts plus the table count.
    pub fn info(&self) -> Result<DbInfo> {
        Ok(DbInfo {
            page_size: self.page_size,
            page_count: self.page_count,
            table_count: self.tables()?.len(),
        })
    }

    /// The catalog table itself, bootstrapped from its fixed definition.
    fn schema(&self) -> Result<Table<'_>> {
        Table::new(self, SCHEMA_TABLE.to_owned(), 1, SCHEMA_SQL)
    }

    /// Every catalog row, all fields rendered for display.
    pub fn objects(&self) -> Result<Vec<SchemaObject>> {
        let schema = self.schema()?;
        let mut objects = Vec::new();
        for row in schema.rows()? {
            objects.push(SchemaObject {
                name: schema.value(&row, "name")?.to_string(),
                tbl_name: schema.value(&row, "tbl_name")?.to_string(),
                object_type: schema.value(&row, "type")?.to_string(),
                rootpage: schema.value(&row, "rootpage")?.to_string(),
                sql: schema.value(&row, "sql")?.to_string(),
            });
        }
        Ok(objects)
    }

    /// All tables in the catalog, including internal `sqlite_` ones.
    pub fn tables(&self) -> Result<Vec<Table<'_>>> {
        let schema = self.schema()?;
        let mut tables = Vec::new();
        for row in schema.rows()? {
            if schema.value(&row, "type")?.as_text()? != "table" {
                continue;
            }
            let name = schema.value(&row, "name")?.as_text()?.to_owned();
            let root = root_page(schema.value(&row, "rootpage")?)?;
            let sql = schema.value(&row, "sql")?.as_text()?.to_owned();
            tables.push(Table::new(self, name, root, &sql)?);
        }
        Ok(tables)
    }

    /// All secondary indices in the catalog. Internal autoindexes carry no
    /// `sql` text and are skipped.
    pub fn indices(&self) -> Result<Vec<Index<'_>>> {
        let schema = self.schema()?;
        let mut indices = Vec::new();
        for row in schema.rows()? {
            if schema.value(&row, "type")?.as_text()? != "index" {
                continue;
            }
            if schema.value(&row, "sql")?.is_null() {
                continue;
            }
            let name = schema.value(&row, "name")?.as_text()?.to_owned();
            let tbl_name = schema.value(&row, "tbl_name")?.as_text()?;
            if self.table(tbl_name)?.is_none() {
                bail!("index {name}: table does not exist: {tbl_name}");
            }
            let root = root_page(schema.value(&row, "rootpage")?)?;
            let sql = schema.value(&row, "sql")?.as_text()?.to_owned();
            indices.push(Index::new(self, name, root, &sql)?);
        }
        Ok(indices)
    }

    /// Looks a table up by name.
    pub fn table(&self, name: &str) -> Result<Option<Table<'_>>> {
        Ok(self.tables()?.into_iter().find(|t| t.name() == name))
    }
}

fn root_page(value: &Value) -> Result<u32> {
    let root = value.as_int()?;
    u32::try_from(root).map_err(|_| eyre::eyre!("invalid root page number: {root}"))
}
