//! # Variable-Length Integer Encoding
//!
//! This module implements SQLite's big-endian varint, used on disk for cell
//! payload sizes, row ids, and record serial types.
//!
//! ## Encoding Format
//!
//! A varint is one to nine bytes. Each of the first eight bytes contributes
//! its low 7 bits, most significant group first; a set high bit signals that
//! another byte follows. If the eighth byte still has its high bit set, a
//! ninth byte contributes all 8 of its bits, completing a 64-bit value.
//!
//! | Value width | Bytes | Layout |
//! |-------------|-------|--------|
//! | ≤ 7 bits | 1 | `0xxxxxxx` |
//! | ≤ 14 bits | 2 | `1xxxxxxx 0xxxxxxx` |
//! | ... | ... | one continuation byte per 7 bits |
//! | ≤ 56 bits | 8 | `1xxxxxxx × 7, 0xxxxxxx` |
//! | 64 bits | 9 | `1xxxxxxx × 8, xxxxxxxx` |
//!
//! Values are reinterpreted as `i64` two's complement, so negative numbers
//! (for example a rowid of -1) always occupy the full nine bytes.
//!
//! ## API
//!
//! Both functions operate on byte slices and perform no allocation:
//! - `decode_varint` reads from a slice, returns `(value, bytes_read)`
//! - `encode_varint` writes into a slice of at least 9 bytes, returns the
//!   number of bytes written
//!
//! ## Error Handling
//!
//! `decode_varint` returns `eyre::Result`; the only failure mode is a slice
//! that ends mid-encoding (`truncated varint`).

use eyre::{bail, Result};

/// Maximum encoded size of a varint in bytes.
pub const MAX_VARINT_LEN: usize = 9;

pub fn decode_varint(buf: &[u8]) -> Result<(i64, usize)> {
    let mut value: u64 = 0;
    for i in 0..8 {
        let Some(&byte) = buf.get(i) else {
            bail!("truncated varint: {} bytes", buf.len());
        };
        value = (value << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok((value as i64, i + 1));
        }
    }
    let Some(&byte) = buf.get(8) else {
        bail!("truncated varint: {} bytes", buf.len());
    };
    value = (value << 8) | u64::from(byte);
    Ok((value as i64, 9))
}

pub fn encode_varint(value: i64, buf: &mut [u8]) -> usize {
    let v = value as u64;
    if v > 0x00ff_ffff_ffff_ffff {
        buf[8] = v as u8;
        let mut rest = v >> 8;
        for i in (0..8).rev() {
            buf[i] = (rest & 0x7f) as u8 | 0x80;
            rest >>= 7;
        }
        return 9;
    }
    let mut len = 1;
    while v >> (7 * len) != 0 {
        len += 1;
    }
    for i in 0..len {
        let shift = 7 * (len - 1 - i);
        let mut byte = ((v >> shift) & 0x7f) as u8;
        if i != len - 1 {
            byte |= 0x80;
        }
        buf[i] = byte;
    }
    len
}
