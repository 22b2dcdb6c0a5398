//! # Record Decoding
//!
//! A cell payload is a *record*: a varint header length (inclusive of its own
//! bytes), a run of serial-type varints filling the rest of the header, then
//! the packed column bodies in declaration order.
//!
//! ## Serial Types
//!
//! | n | Body bytes | Value |
//! |---|------------|-------|
//! | 0 | 0 | Null |
//! | 1 | 1 | signed 8-bit integer |
//! | 2 | 2 | big-endian signed 16-bit integer |
//! | 3 | 3 | big-endian signed 24-bit integer |
//! | 4 | 4 | big-endian signed 32-bit integer |
//! | 8 | 0 | the integer 0 |
//! | 9 | 0 | the integer 1 |
//! | n ≥ 12, even | (n−12)/2 | blob |
//! | n ≥ 13, odd | (n−13)/2 | text in the database encoding |
//!
//! Serial types 5, 6, 7, 10 and 11 (48/64-bit integers, floats, reserved) are
//! outside the supported subset and decode as a storage error.

use crate::encoding::decode_varint;
use crate::storage::header::TextEncoding;
use crate::types::Value;
use eyre::{bail, ensure, Result};
use smallvec::SmallVec;

pub fn parse_record(payload: &[u8], encoding: TextEncoding) -> Result<Vec<Value>> {
    let (header_size, prefix) = decode_varint(payload)?;
    let header_size = usize::try_from(header_size)
        .map_err(|_| eyre::eyre!("invalid record header size: {header_size}"))?;
    ensure!(
        header_size >= prefix && header_size <= payload.len(),
        "record header size {header_size} does not fit payload of {} bytes",
        payload.len()
    );

    let mut serial_types: SmallVec<[i64; 16]> = SmallVec::new();
    let mut offset = prefix;
    while offset < header_size {
        let (serial_type, read) = decode_varint(&payload[offset..header_size])?;
        serial_types.push(serial_type);
        offset += read;
    }

    let mut values = Vec::with_capacity(serial_types.len());
    let mut body = header_size;
    for &serial_type in &serial_types {
        let (value, size) = decode_value(serial_type, &payload[body..], encoding)?;
        values.push(value);
        body += size;
    }
    Ok(values)
}

fn decode_value(serial_type: i64, body: &[u8], encoding: TextEncoding) -> Result<(Value, usize)> {
    match serial_type {
        0 => Ok((Value::Null, 0)),
        1 => {
            let bytes = body_bytes(body, 1)?;
            Ok((Value::Int(i64::from(bytes[0] as i8)), 1))
        }
        2 => {
            let bytes = body_bytes(body, 2)?;
            Ok((Value::Int(i64::from(i16::from_be_bytes([bytes[0], bytes[1]]))), 2))
        }
        3 => {
            let bytes = body_bytes(body, 3)?;
            let raw = (i32::from(bytes[0] as i8) << 16)
                | (i32::from(bytes[1]) << 8)
                | i32::from(bytes[2]);
            Ok((Value::Int(i64::from(raw)), 3))
        }
        4 => {
            let bytes = body_bytes(body, 4)?;
            let raw = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            Ok((Value::Int(i64::from(raw)), 4))
        }
        8 => Ok((Value::Int(0), 0)),
        9 => Ok((Value::Int(1), 0)),
        n if n >= 12 && n % 2 == 0 => {
            let size = (n as usize - 12) / 2;
            let bytes = body_bytes(body, size)?;
            Ok((Value::Blob(bytes.to_vec()), size))
        }
        n if n >= 13 => {
            let size = (n as usize - 13) / 2;
            let bytes = body_bytes(body, size)?;
            Ok((Value::Text(encoding.decode(bytes)?), size))
        }
        n => bail!("invalid serial type: {n}"),
    }
}

fn body_bytes(body: &[u8], size: usize) -> Result<&[u8]> {
    body.get(..size)
        .ok_or_else(|| eyre::eyre!("record body truncated: need {size} bytes, have {}", body.len()))
}
