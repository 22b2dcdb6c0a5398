//! # CLI Module
//!
//! One-shot command dispatch for the `antdb` binary:
//!
//! ```text
//! antdb <db-path> <command>
//! ```
//!
//! where `<command>` is a dot command (`.dbinfo`, `.tables`, `.schema`,
//! `.indices`) or a single SQL statement. Command handlers format their
//! output into a `String`; printing and the process exit code belong to the
//! binary entry point.

mod commands;

pub use commands::dispatch;
