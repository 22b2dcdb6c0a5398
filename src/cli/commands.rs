//! # Command Handlers
//!
//! Maps each dot command, and the SQL fallthrough, to the storage and query
//! layers. Output shapes:
//!
//! | Command | Output |
//! |-----------|------------------------------------------------------|
//! | `.dbinfo` | `key: value` per header-derived field |
//! | `.tables` | user table names, space-joined on one line |
//! | `.schema` | `key: 'value'` blocks, blank line between objects |
//! | `.indices`| `index:` / `table:` / `fields:` lines per index |
//! | SQL | one line per row, columns joined by `\|` |

use crate::sql::QueryEngine;
use crate::storage::StorageEngine;
use eyre::Result;

/// Runs one command against an open database and returns its output.
pub fn dispatch(storage: &StorageEngine, command: &str) -> Result<String> {
    match command {
        ".dbinfo" => dbinfo(storage),
        ".tables" => tables(storage),
        ".schema" => schema(storage),
        ".indices" => indices(storage),
        sql => query(storage, sql),
    }
}

fn dbinfo(storage: &StorageEngine) -> Result<String> {
    let info = storage.info()?;
    Ok(format!(
        "database page size: {}\ndatabase page count: {}\nnumber of tables: {}",
        info.page_size, info.page_count, info.table_count
    ))
}

fn tables(storage: &StorageEngine) -> Result<String> {
    let names: Vec<String> = storage
        .tables()?
        .iter()
        .map(|table| table.name().to_owned())
        .filter(|name| !name.starts_with("sqlite_"))
        .collect();
    Ok(names.join(" "))
}

fn schema(storage: &StorageEngine) -> Result<String> {
    let blocks: Vec<String> = storage
        .objects()?
        .iter()
        .map(|object| {
            format!(
                "name: '{}'\ntbl_name: '{}'\ntype: '{}'\nrootpage: '{}'\nsql: '{}'",
                object.name, object.tbl_name, object.object_type, object.rootpage, object.sql
            )
        })
        .collect();
    Ok(blocks.join("\n\n"))
}

fn indices(storage: &StorageEngine) -> Result<String> {
    let blocks: Vec<String> = storage
        .indices()?
        .iter()
        .map(|index| {
            format!(
                "index: {}\ntable: {}\nfields: {}",
                index.name(),
                index.table_name(),
                index.column()
            )
        })
        .collect();
    Ok(blocks.join("\n"))
}

fn query(storage: &StorageEngine, sql: &str) -> Result<String> {
    let rows = QueryEngine::new(storage).evaluate(sql)?;
    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect();
    Ok(lines.join("\n"))
}
