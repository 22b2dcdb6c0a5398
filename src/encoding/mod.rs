//! # Encoding Primitives
//!
//! Low-level byte encodings used by the storage layer.
//!
//! - `varint`: SQLite's 1–9-byte big-endian variable-length integer

pub mod varint;

pub use varint::{decode_varint, encode_varint};
