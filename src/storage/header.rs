//! # Database File Header
//!
//! The first 100 bytes of a database file form the header. All multi-byte
//! fields are big-endian; the zerocopy `big_endian` wrapper types handle the
//! conversion on access, so the struct can be read in place from the raw
//! buffer without copying.
//!
//! ## Header Layout (consumed fields)
//!
//! ```text
//! Offset  Size  Field          Description
//! ------  ----  -------------  -----------------------------------------
//! 16      2     page_size      Page size in bytes (u16, read unsigned)
//! 28      4     page_count     Number of pages in the file
//! 56      4     text_encoding  1 = UTF-8, 2 = UTF-16LE, 3 = UTF-16BE
//! ```
//!
//! The remaining fields are laid out for completeness but never consulted.
//! A page size above 32768 is encoded by SQLite as the literal value 1; that
//! case is not handled.

use eyre::{bail, ensure, Result};
use zerocopy::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

pub const HEADER_SIZE: usize = 100;

/// Text encoding for every text column body in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(s) => Ok(s.to_owned()),
                Err(e) => bail!("invalid utf-8 in text value: {e}"),
            },
            TextEncoding::Utf16Le => decode_utf16_with(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => decode_utf16_with(bytes, u16::from_be_bytes),
        }
    }
}

fn decode_utf16_with(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    ensure!(
        bytes.len() % 2 == 0,
        "utf-16 text has odd byte length: {}",
        bytes.len()
    );
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| eyre::eyre!("invalid utf-16 in text value: {e}"))
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct DbHeader {
    magic: [u8; 16],
    page_size: U16,
    write_version: u8,
    read_version: u8,
    reserved_per_page: u8,
    max_payload_fraction: u8,
    min_payload_fraction: u8,
    leaf_payload_fraction: u8,
    change_counter: U32,
    page_count: U32,
    freelist_head: U32,
    freelist_count: U32,
    schema_cookie: U32,
    schema_format: U32,
    default_cache_size: U32,
    largest_root_page: U32,
    text_encoding: U32,
    user_version: U32,
    incremental_vacuum: U32,
    application_id: U32,
    reserved: [u8; 20],
    version_valid_for: U32,
    sqlite_version: U32,
}

const _: () = assert!(std::mem::size_of::<DbHeader>() == HEADER_SIZE);

impl DbHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() >= HEADER_SIZE,
            "invalid header: must contain 100 bytes"
        );
        Self::ref_from_bytes(&bytes[..HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse database header: {e:?}"))
    }

    pub fn page_size(&self) -> u32 {
        u32::from(self.page_size.get())
    }

    pub fn page_count(&self) -> u32 {
        self.page_count.get()
    }

    pub fn text_encoding(&self) -> Result<TextEncoding> {
        match self.text_encoding.get() {
            1 => Ok(TextEncoding::Utf8),
            2 => Ok(TextEncoding::Utf16Le),
            3 => Ok(TextEncoding::Utf16Be),
            n => bail!("bad encoding: {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(page_size: u16, page_count: u32, encoding: u32) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..16].copy_from_slice(b"SQLite format 3\0");
        bytes[16..18].copy_from_slice(&page_size.to_be_bytes());
        bytes[28..32].copy_from_slice(&page_count.to_be_bytes());
        bytes[56..60].copy_from_slice(&encoding.to_be_bytes());
        bytes
    }

    #[test]
    fn consumed_fields_read_big_endian() {
        let bytes = header_bytes(4096, 17, 1);
        let header = DbHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.page_size(), 4096);
        assert_eq!(header.page_count(), 17);
        assert_eq!(header.text_encoding().unwrap(), TextEncoding::Utf8);
    }

    #[test]
    fn all_three_encodings_are_recognized() {
        for (tag, want) in [
            (1, TextEncoding::Utf8),
            (2, TextEncoding::Utf16Le),
            (3, TextEncoding::Utf16Be),
        ] {
            let bytes = header_bytes(512, 1, tag);
            let header = DbHeader::from_bytes(&bytes).unwrap();
            assert_eq!(header.text_encoding().unwrap(), want);
        }
    }

    #[test]
    fn unknown_encoding_tag_errors() {
        let bytes = header_bytes(512, 1, 4);
        let header = DbHeader::from_bytes(&bytes).unwrap();
        assert!(header.text_encoding().is_err());
    }

    #[test]
    fn short_buffer_errors() {
        assert!(DbHeader::from_bytes(&[0u8; 99]).is_err());
    }

    #[test]
    fn utf16_decoding_both_orders() {
        let text = "reign élan";
        let le: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let be: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        assert_eq!(TextEncoding::Utf16Le.decode(&le).unwrap(), text);
        assert_eq!(TextEncoding::Utf16Be.decode(&be).unwrap(), text);
    }

    #[test]
    fn invalid_text_payloads_error() {
        assert!(TextEncoding::Utf8.decode(&[0xff, 0xfe]).is_err());
        assert!(TextEncoding::Utf16Le.decode(&[0x00]).is_err());
        let unpaired = 0xd800u16.to_le_bytes();
        assert!(TextEncoding::Utf16Le.decode(&unpaired).is_err());
    }
}
