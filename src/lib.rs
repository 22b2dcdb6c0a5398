//! # antdb - Read-Only SQLite File Query Engine
//!
//! antdb answers dot commands and a restricted `SELECT` subset over database
//! files in the SQLite 3 on-disk format, without linking SQLite. The storage
//! layer reproduces the file format bit-exactly for reads: the 100-byte
//! header, varints, serial-type records, and the four B-tree page shapes.
//! Equality filters run through an existing secondary index when one covers
//! the filter column.
//!
//! ## Quick Start
//!
//! ```ignore
//! use antdb::sql::QueryEngine;
//! use antdb::storage::StorageEngine;
//!
//! let storage = StorageEngine::open(Path::new("sample.db"))?;
//! let rows = QueryEngine::new(&storage)
//!     .evaluate("SELECT name FROM companies WHERE country = 'fr'")?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        CLI Dispatch (cli)           │
//! ├─────────────────────────────────────┤
//! │  SQL Layer (lexer/parser/executor)  │
//! ├─────────────────────────────────────┤
//! │   Table / Index B-tree walkers      │
//! ├─────────────────────────────────────┤
//! │  Pages, records, varints (storage)  │
//! ├─────────────────────────────────────┤
//! │      BackingFile (seek + read)      │
//! └─────────────────────────────────────┘
//! ```
//!
//! Everything is read-only and single-threaded: one file, one command, one
//! pass. Every page fetch is a fresh seek + read; entities built during a
//! query are dropped when it completes.
//!
//! ## Module Overview
//!
//! - [`storage`]: header, pages, records, B-tree walkers
//! - [`sql`]: lexer, parser, AST, query engine
//! - [`types`]: runtime `Value`
//! - [`encoding`]: SQLite varints
//! - [`cli`]: dot-command and SQL dispatch

pub mod cli;
pub mod encoding;
pub mod sql;
pub mod storage;
pub mod types;

pub use sql::QueryEngine;
pub use storage::StorageEngine;
pub use types::Value;
