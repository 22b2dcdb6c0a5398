//! # Fixture Builder
//!
//! Writes bit-exact SQLite database images to disk for the integration
//! tests: the 100-byte file header, a schema page rooted at page 1, and
//! table/index B-tree pages in any shape a test needs.
//!
//! Cells are packed from the end of each page downward, with the cell
//! pointer array growing up from the B-tree header, exactly as SQLite lays
//! pages out. Records are encoded through the same serial-type table the
//! crate decodes.

use antdb::encoding::encode_varint;
use antdb::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const PAGE_TABLE_LEAF: u8 = 0x0d;
pub const PAGE_TABLE_INTERIOR: u8 = 0x05;
pub const PAGE_INDEX_LEAF: u8 = 0x0a;
pub const PAGE_INDEX_INTERIOR: u8 = 0x02;

pub const UTF8: u32 = 1;
pub const UTF16LE: u32 = 2;

/// A generated database file; the backing directory lives as long as this
/// value does.
pub struct TestDb {
    pub path: PathBuf,
    _dir: TempDir,
}

pub fn varint(value: i64) -> Vec<u8> {
    let mut buf = [0u8; 9];
    let len = encode_varint(value, &mut buf);
    buf[..len].to_vec()
}

fn utf8_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

fn utf16le_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn encode_value(value: &Value, text: fn(&str) -> Vec<u8>) -> (i64, Vec<u8>) {
    match value {
        Value::Null => (0, Vec::new()),
        Value::Int(0) => (8, Vec::new()),
        Value::Int(1) => (9, Vec::new()),
        Value::Int(n) if i8::try_from(*n).is_ok() => (1, vec![*n as u8]),
        Value::Int(n) if i16::try_from(*n).is_ok() => (2, (*n as i16).to_be_bytes().to_vec()),
        Value::Int(n) if (-(1 << 23)..1 << 23).contains(n) => {
            (3, (*n as i32).to_be_bytes()[1..4].to_vec())
        }
        Value::Int(n) => {
            let n = i32::try_from(*n).expect("fixture integers fit 32 bits");
            (4, n.to_be_bytes().to_vec())
        }
        Value::Blob(bytes) => (12 + 2 * bytes.len() as i64, bytes.clone()),
        Value::Text(s) => {
            let bytes = text(s);
            (13 + 2 * bytes.len() as i64, bytes)
        }
    }
}

fn record_with(values: &[Value], text: fn(&str) -> Vec<u8>) -> Vec<u8> {
    let encoded: Vec<(i64, Vec<u8>)> = values.iter().map(|v| encode_value(v, text)).collect();
    let serials: Vec<u8> = encoded.iter().flat_map(|(serial, _)| varint(*serial)).collect();
    let header_size = serials.len() + 1;
    assert!(header_size < 128, "fixture record header too large");
    let mut payload = vec![header_size as u8];
    payload.extend(serials);
    for (_, body) in &encoded {
        payload.extend(body);
    }
    payload
}

/// Record payload with UTF-8 text bodies.
pub fn record(values: &[Value]) -> Vec<u8> {
    record_with(values, utf8_bytes)
}

/// Record payload with UTF-16LE text bodies, for encoding-2 databases.
pub fn record_utf16le(values: &[Value]) -> Vec<u8> {
    record_with(values, utf16le_bytes)
}

/// Index entry payload: the indexed values followed by the rowid.
pub fn index_entry(values: &[Value], row_id: i64) -> Vec<u8> {
    let mut full = values.to_vec();
    full.push(Value::Int(row_id));
    record(&full)
}

fn write_page(
    page_size: usize,
    base: usize,
    page_type: u8,
    right_child: Option<u32>,
    cells: &[Vec<u8>],
) -> Vec<u8> {
    let mut page = vec![0u8; page_size];
    page[base] = page_type;
    page[base + 3..base + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
    let header_size = match right_child {
        Some(child) => {
            page[base + 8..base + 12].copy_from_slice(&child.to_be_bytes());
            12
        }
        None => 8,
    };
    let mut content = page_size;
    for (index, cell) in cells.iter().enumerate() {
        content -= cell.len();
        page[content..content + cell.len()].copy_from_slice(cell);
        let entry = base + header_size + index * 2;
        assert!(entry + 2 <= content, "fixture page overflow");
        page[entry..entry + 2].copy_from_slice(&(content as u16).to_be_bytes());
    }
    page[base + 5..base + 7].copy_from_slice(&(content as u16).to_be_bytes());
    page
}

/// Table leaf page from `(rowid, record payload)` pairs. Pass `base` 100 for
/// page 1, 0 otherwise.
pub fn table_leaf(page_size: usize, base: usize, rows: &[(i64, Vec<u8>)]) -> Vec<u8> {
    let cells: Vec<Vec<u8>> = rows
        .iter()
        .map(|(row_id, payload)| {
            let mut cell = varint(payload.len() as i64);
            cell.extend(varint(*row_id));
            cell.extend(payload);
            cell
        })
        .collect();
    write_page(page_size, base, PAGE_TABLE_LEAF, None, &cells)
}

/// Table interior page from `(child page, max rowid in child)` pairs plus the
/// right-most child.
pub fn table_interior(page_size: usize, cells: &[(u32, i64)], right_child: u32) -> Vec<u8> {
    let cells: Vec<Vec<u8>> = cells
        .iter()
        .map(|(child, row_id)| {
            let mut cell = child.to_be_bytes().to_vec();
            cell.extend(varint(*row_id));
            cell
        })
        .collect();
    write_page(page_size, 0, PAGE_TABLE_INTERIOR, Some(right_child), &cells)
}

/// Index leaf page from entry payloads (see [`index_entry`]).
pub fn index_leaf(page_size: usize, payloads: &[Vec<u8>]) -> Vec<u8> {
    let cells: Vec<Vec<u8>> = payloads
        .iter()
        .map(|payload| {
            let mut cell = varint(payload.len() as i64);
            cell.extend(payload.clone());
            cell
        })
        .collect();
    write_page(page_size, 0, PAGE_INDEX_LEAF, None, &cells)
}

/// Index interior page from `(child page, bracketing entry payload)` pairs
/// plus the right-most child.
pub fn index_interior(page_size: usize, cells: &[(u32, Vec<u8>)], right_child: u32) -> Vec<u8> {
    let cells: Vec<Vec<u8>> = cells
        .iter()
        .map(|(child, payload)| {
            let mut cell = child.to_be_bytes().to_vec();
            cell.extend(varint(payload.len() as i64));
            cell.extend(payload.clone());
            cell
        })
        .collect();
    write_page(page_size, 0, PAGE_INDEX_INTERIOR, Some(right_child), &cells)
}

/// Schema-table record for one catalog object. `sql` is `None` for internal
/// objects stored without schema text.
pub fn schema_object(
    object_type: &str,
    name: &str,
    tbl_name: &str,
    rootpage: i64,
    sql: Option<&str>,
) -> Vec<u8> {
    record(&[
        Value::Text(object_type.into()),
        Value::Text(name.into()),
        Value::Text(tbl_name.into()),
        Value::Int(rootpage),
        sql.map_or(Value::Null, |s| Value::Text(s.into())),
    ])
}

pub fn file_header(page_size: u32, page_count: u32, encoding: u32) -> [u8; 100] {
    let mut header = [0u8; 100];
    header[..16].copy_from_slice(b"SQLite format 3\0");
    header[16..18].copy_from_slice(&(page_size as u16).to_be_bytes());
    header[18] = 1; // file format write version
    header[19] = 1; // file format read version
    header[21] = 64;
    header[22] = 32;
    header[23] = 32;
    header[28..32].copy_from_slice(&page_count.to_be_bytes());
    header[47] = 4; // schema format number
    header[56..60].copy_from_slice(&encoding.to_be_bytes());
    header
}

/// Assembles pages into a database file on disk. `pages[0]` must have been
/// built with base 100; the file header is written over its first 100 bytes.
pub fn build_db(page_size: usize, encoding: u32, mut pages: Vec<Vec<u8>>) -> TestDb {
    let header = file_header(page_size as u32, pages.len() as u32, encoding);
    pages[0][..100].copy_from_slice(&header);
    let bytes: Vec<u8> = pages.concat();

    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("test.db");
    fs::write(&path, bytes).expect("write database image");
    TestDb { path, _dir: dir }
}
