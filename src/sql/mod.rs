//! # SQL Front-End
//!
//! Scanner → parser → evaluator pipeline for the supported SQL subset.
//!
//! ## Module Structure
//!
//! - `token`: token and keyword definitions
//! - `lexer`: zero-copy tokenizer with one-token lookahead
//! - `ast`: statement and expression nodes
//! - `parser`: recursive-descent parser
//! - `executor`: query engine binding statements to storage
//!
//! The same parser serves user queries and the catalog's stored `CREATE`
//! text, so the schema has a single representation throughout the system.

pub mod ast;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod token;

pub use executor::QueryEngine;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Keyword, Token};
