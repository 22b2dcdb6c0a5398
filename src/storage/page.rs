//! # B-Tree Page Variants
//!
//! Every page of the database file is a B-tree node in one of four shapes:
//! table or index crossed with leaf or interior. This module provides a typed
//! view over a raw page buffer with uniform cell-pointer access and
//! per-variant cell parsing.
//!
//! ## Page Header Layout
//!
//! The B-tree header sits at the page's *base*: byte 100 on page 1 (after the
//! file header), byte 0 everywhere else.
//!
//! ```text
//! Offset  Size  Field          Description
//! ------  ----  -------------  ---------------------------------------
//! 0       1     page_type      0x02 / 0x05 / 0x0a / 0x0d (see below)
//! 1       2     free_block     First free block (not consumed)
//! 3       2     cell_count     Number of cells in this page
//! 5       2     content_start  Start of cell content (not consumed)
//! 7       1     frag_bytes     Fragmented free bytes (not consumed)
//! 8       4     right_child    Right-most child page (interior only)
//! ```
//!
//! The cell-pointer array follows the header (8 bytes for leaves, 12 for
//! interiors): `cell_count` big-endian u16 offsets from the page start.
//!
//! ## Page Types
//!
//! | Byte | Variant | Cell layout |
//! |------|---------------|------------------------------------------------|
//! | 0x0d | table leaf | varint payload size, varint rowid, record |
//! | 0x05 | table interior| u32 child page, varint rowid |
//! | 0x0a | index leaf | varint payload size, record (rowid last) |
//! | 0x02 | index interior| u32 child page, varint payload size, record |
//!
//! Any other type byte is a storage error. Payloads must fit in the page;
//! overflow chains are not handled and surface as a storage error.
//!
//! ## Iteration
//!
//! Leaf pages yield one decoded item per cell. Interior pages yield N+1
//! [`Pointer`] values bracketing their children's key ranges; see the
//! `pointer` module for endpoint semantics.

use crate::encoding::decode_varint;
use crate::storage::header::TextEncoding;
use crate::storage::pointer::Pointer;
use crate::storage::record::parse_record;
use crate::types::Value;
use eyre::{bail, Result};

pub const TABLE_LEAF: u8 = 0x0d;
pub const TABLE_INTERIOR: u8 = 0x05;
pub const INDEX_LEAF: u8 = 0x0a;
pub const INDEX_INTERIOR: u8 = 0x02;

const LEAF_HEADER_SIZE: usize = 8;
const INTERIOR_HEADER_SIZE: usize = 12;

/// A row as stored in a table leaf cell: the rowid plus the record body.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafRow {
    pub row_id: i64,
    pub record: Vec<Value>,
}

/// An index entry: the indexed column values plus the rowid they point at.
/// On disk the rowid is the final value of the entry's record.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub key: Vec<Value>,
    pub row_id: i64,
}

impl IndexEntry {
    fn from_payload(payload: &[u8], encoding: TextEncoding) -> Result<Self> {
        let mut values = parse_record(payload, encoding)?;
        let row_id = match values.pop() {
            Some(value) => value.as_int()?,
            None => bail!("index record has no values"),
        };
        Ok(Self { key: values, row_id })
    }

    /// First indexed column value, the component equality search compares on.
    pub fn first(&self) -> Option<&Value> {
        self.key.first()
    }
}

/// Raw page buffer plus the base offset of its B-tree header.
#[derive(Debug)]
struct PageBuf {
    data: Vec<u8>,
    base: usize,
    cell_count: u16,
    encoding: TextEncoding,
}

impl PageBuf {
    fn new(data: Vec<u8>, base: usize, encoding: TextEncoding) -> Result<Self> {
        let cell_count = be_u16(&data, base + 3)?;
        Ok(Self { data, base, cell_count, encoding })
    }

    fn cell_offset(&self, header_size: usize, index: usize) -> Result<usize> {
        let entry = self.base + header_size + index * 2;
        Ok(usize::from(be_u16(&self.data, entry)?))
    }

    fn tail(&self, offset: usize) -> Result<&[u8]> {
        self.data
            .get(offset..)
            .ok_or_else(|| eyre::eyre!("cell offset {offset} out of page bounds"))
    }

    fn payload(&self, offset: usize, size: i64) -> Result<&[u8]> {
        let size = usize::try_from(size)
            .map_err(|_| eyre::eyre!("invalid cell payload size: {size}"))?;
        self.data.get(offset..offset + size).ok_or_else(|| {
            eyre::eyre!("cell payload of {size} bytes overruns page (overflow pages not supported)")
        })
    }
}

fn be_u16(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or_else(|| eyre::eyre!("page offset {offset} out of bounds"))?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn be_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| eyre::eyre!("page offset {offset} out of bounds"))?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// One of the four typed page views.
#[derive(Debug)]
pub enum Page {
    TableLeaf(TableLeafPage),
    TableInterior(TableInteriorPage),
    IndexLeaf(IndexLeafPage),
    IndexInterior(IndexInteriorPage),
}

/// Pages a table B-tree may contain.
#[derive(Debug)]
pub enum TablePage {
    Leaf(TableLeafPage),
    Interior(TableInteriorPage),
}

/// Pages an index B-tree may contain.
#[derive(Debug)]
pub enum IndexPage {
    Leaf(IndexLeafPage),
    Interior(IndexInteriorPage),
}

impl Page {
    /// Builds the typed view for a raw page buffer. `base` is 100 on page 1
    /// and 0 everywhere else.
    pub fn parse(data: Vec<u8>, base: usize, encoding: TextEncoding) -> Result<Page> {
        let type_byte = *data
            .get(base)
            .ok_or_else(|| eyre::eyre!("page of {} bytes has no header at {base}", data.len()))?;
        let buf = PageBuf::new(data, base, encoding)?;
        match type_byte {
            TABLE_LEAF => Ok(Page::TableLeaf(TableLeafPage { buf })),
            TABLE_INTERIOR => Ok(Page::TableInterior(TableInteriorPage::new(buf)?)),
            INDEX_LEAF => Ok(Page::IndexLeaf(IndexLeafPage { buf })),
            INDEX_INTERIOR => Ok(Page::IndexInterior(IndexInteriorPage::new(buf)?)),
            t => bail!("invalid page type: {t:02x}"),
        }
    }

    pub fn into_table(self) -> Result<TablePage> {
        match self {
            Page::TableLeaf(page) => Ok(TablePage::Leaf(page)),
            Page::TableInterior(page) => Ok(TablePage::Interior(page)),
            other => bail!("wanted table page, got {}", other.type_name()),
        }
    }

    pub fn into_index(self) -> Result<IndexPage> {
        match self {
            Page::IndexLeaf(page) => Ok(IndexPage::Leaf(page)),
            Page::IndexInterior(page) => Ok(IndexPage::Interior(page)),
            other => bail!("wanted index page, got {}", other.type_name()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Page::TableLeaf(_) => "table leaf page",
            Page::TableInterior(_) => "table interior page",
            Page::IndexLeaf(_) => "index leaf page",
            Page::IndexInterior(_) => "index interior page",
        }
    }
}

#[derive(Debug)]
pub struct TableLeafPage {
    buf: PageBuf,
}

impl TableLeafPage {
    pub fn cell_count(&self) -> u16 {
        self.buf.cell_count
    }

    pub fn rows(&self) -> Result<Vec<LeafRow>> {
        (0..usize::from(self.buf.cell_count))
            .map(|index| self.row(index))
            .collect()
    }

    fn row(&self, index: usize) -> Result<LeafRow> {
        let mut offset = self.buf.cell_offset(LEAF_HEADER_SIZE, index)?;
        let (payload_size, read) = decode_varint(self.buf.tail(offset)?)?;
        offset += read;
        let (row_id, read) = decode_varint(self.buf.tail(offset)?)?;
        offset += read;
        let payload = self.buf.payload(offset, payload_size)?;
        Ok(LeafRow {
            row_id,
            record: parse_record(payload, self.buf.encoding)?,
        })
    }
}

#[derive(Debug)]
pub struct TableInteriorPage {
    buf: PageBuf,
    right_child: u32,
}

impl TableInteriorPage {
    fn new(buf: PageBuf) -> Result<Self> {
        let right_child = be_u32(&buf.data, buf.base + 8)?;
        Ok(Self { buf, right_child })
    }

    /// Yields the N+1 child pointers bracketing this page's rowid ranges.
    pub fn pointers(&self) -> Result<Vec<Pointer<i64>>> {
        let count = usize::from(self.buf.cell_count);
        let mut cells = Vec::with_capacity(count);
        for index in 0..count {
            cells.push(self.cell(index)?);
        }
        Ok(bracket(cells, self.right_child))
    }

    fn cell(&self, index: usize) -> Result<(u32, i64)> {
        let offset = self.buf.cell_offset(INTERIOR_HEADER_SIZE, index)?;
        let child = be_u32(&self.buf.data, offset)?;
        let (row_id, _) = decode_varint(self.buf.tail(offset + 4)?)?;
        Ok((child, row_id))
    }
}

#[derive(Debug)]
pub struct IndexLeafPage {
    buf: PageBuf,
}

impl IndexLeafPage {
    pub fn cell_count(&self) -> u16 {
        self.buf.cell_count
    }

    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        (0..usize::from(self.buf.cell_count))
            .map(|index| self.entry(index))
            .collect()
    }

    fn entry(&self, index: usize) -> Result<IndexEntry> {
        let mut offset = self.buf.cell_offset(LEAF_HEADER_SIZE, index)?;
        let (payload_size, read) = decode_varint(self.buf.tail(offset)?)?;
        offset += read;
        let payload = self.buf.payload(offset, payload_size)?;
        IndexEntry::from_payload(payload, self.buf.encoding)
    }
}

#[derive(Debug)]
pub struct IndexInteriorPage {
    buf: PageBuf,
    right_child: u32,
}

impl IndexInteriorPage {
    fn new(buf: PageBuf) -> Result<Self> {
        let right_child = be_u32(&buf.data, buf.base + 8)?;
        Ok(Self { buf, right_child })
    }

    /// Yields the N+1 child pointers bracketing this page's key ranges. The
    /// bracketing keys are real index entries; their rowids count as matches.
    pub fn pointers(&self) -> Result<Vec<Pointer<IndexEntry>>> {
        let count = usize::from(self.buf.cell_count);
        let mut cells = Vec::with_capacity(count);
        for index in 0..count {
            cells.push(self.cell(index)?);
        }
        Ok(bracket(cells, self.right_child))
    }

    fn cell(&self, index: usize) -> Result<(u32, IndexEntry)> {
        let mut offset = self.buf.cell_offset(INTERIOR_HEADER_SIZE, index)?;
        let child = be_u32(&self.buf.data, offset)?;
        offset += 4;
        let (payload_size, read) = decode_varint(self.buf.tail(offset)?)?;
        offset += read;
        let payload = self.buf.payload(offset, payload_size)?;
        Ok((child, IndexEntry::from_payload(payload, self.buf.encoding)?))
    }
}

/// Turns N interior cells into the N+1 pointer sequence: the first pointer is
/// left-unbounded, the last right-unbounded with `right_child` as its child,
/// and every key bounds the cells on both of its sides.
fn bracket<K: Clone>(cells: Vec<(u32, K)>, right_child: u32) -> Vec<Pointer<K>> {
    let count = cells.len();
    if count == 0 {
        return vec![Pointer::new(None, None, right_child)];
    }
    let mut pointers = Vec::with_capacity(count + 1);
    for index in 0..=count {
        let pointer = if index == 0 {
            Pointer::new(None, Some(cells[0].1.clone()), cells[0].0)
        } else if index == count {
            Pointer::new(Some(cells[count - 1].1.clone()), None, right_child)
        } else {
            Pointer::new(
                Some(cells[index - 1].1.clone()),
                Some(cells[index].1.clone()),
                cells[index].0,
            )
        };
        pointers.push(pointer);
    }
    pointers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_varint;

    const PAGE_SIZE: usize = 512;

    fn varint(value: i64) -> Vec<u8> {
        let mut buf = [0u8; 9];
        let len = encode_varint(value, &mut buf);
        buf[..len].to_vec()
    }

    /// Minimal record with a single one-byte integer column.
    fn int_record(value: i8) -> Vec<u8> {
        vec![0x02, 0x01, value as u8]
    }

    fn build_page(page_type: u8, base: usize, right_child: Option<u32>, cells: &[Vec<u8>]) -> Vec<u8> {
        let mut page = vec![0u8; PAGE_SIZE];
        page[base] = page_type;
        page[base + 3..base + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
        let header_size = match right_child {
            Some(child) => {
                page[base + 8..base + 12].copy_from_slice(&child.to_be_bytes());
                INTERIOR_HEADER_SIZE
            }
            None => LEAF_HEADER_SIZE,
        };
        let mut content = PAGE_SIZE;
        for (index, cell) in cells.iter().enumerate() {
            content -= cell.len();
            page[content..content + cell.len()].copy_from_slice(cell);
            let entry = base + header_size + index * 2;
            page[entry..entry + 2].copy_from_slice(&(content as u16).to_be_bytes());
        }
        page
    }

    fn parse(data: Vec<u8>) -> Result<Page> {
        Page::parse(data, 0, TextEncoding::Utf8)
    }

    #[test]
    fn table_leaf_yields_one_row_per_cell() {
        let cells: Vec<Vec<u8>> = [(1i64, 10i8), (2, 20), (7, 70)]
            .iter()
            .map(|&(row_id, v)| {
                let record = int_record(v);
                let mut cell = varint(record.len() as i64);
                cell.extend(varint(row_id));
                cell.extend(record);
                cell
            })
            .collect();
        let page = build_page(TABLE_LEAF, 0, None, &cells);

        let Page::TableLeaf(leaf) = parse(page).unwrap() else {
            panic!("wanted table leaf");
        };
        let rows = leaf.rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], LeafRow { row_id: 1, record: vec![Value::Int(10)] });
        assert_eq!(rows[2], LeafRow { row_id: 7, record: vec![Value::Int(70)] });
    }

    #[test]
    fn table_interior_brackets_cells_into_n_plus_one_pointers() {
        let cells: Vec<Vec<u8>> = [(4u32, 10i64), (5, 20)]
            .iter()
            .map(|&(child, key)| {
                let mut cell = child.to_be_bytes().to_vec();
                cell.extend(varint(key));
                cell
            })
            .collect();
        let page = build_page(TABLE_INTERIOR, 0, Some(6), &cells);

        let Page::TableInterior(interior) = parse(page).unwrap() else {
            panic!("wanted table interior");
        };
        let pointers = interior.pointers().unwrap();
        assert_eq!(
            pointers,
            vec![
                Pointer::new(None, Some(10), 4),
                Pointer::new(Some(10), Some(20), 5),
                Pointer::new(Some(20), None, 6),
            ]
        );
    }

    #[test]
    fn first_page_reads_header_at_offset_100() {
        let cell = {
            let record = int_record(1);
            let mut cell = varint(record.len() as i64);
            cell.extend(varint(1));
            cell.extend(record);
            cell
        };
        let page = build_page(TABLE_LEAF, 100, None, &[cell]);
        let parsed = Page::parse(page, 100, TextEncoding::Utf8).unwrap();
        let Page::TableLeaf(leaf) = parsed else {
            panic!("wanted table leaf");
        };
        assert_eq!(leaf.rows().unwrap().len(), 1);
    }

    #[test]
    fn index_leaf_splits_rowid_off_the_record() {
        // entry ("ab", rowid 9): record [text "ab", int 9]
        let record = vec![0x03, 17, 0x01, b'a', b'b', 9];
        let mut cell = varint(record.len() as i64);
        cell.extend(record);
        let page = build_page(INDEX_LEAF, 0, None, &[cell]);

        let Page::IndexLeaf(leaf) = parse(page).unwrap() else {
            panic!("wanted index leaf");
        };
        let entries = leaf.entries().unwrap();
        assert_eq!(
            entries,
            vec![IndexEntry { key: vec![Value::Text("ab".into())], row_id: 9 }]
        );
    }

    #[test]
    fn index_interior_carries_entries_as_bounds() {
        let record = vec![0x03, 17, 0x01, b'm', b'n', 3];
        let mut cell = 8u32.to_be_bytes().to_vec();
        cell.extend(varint(record.len() as i64));
        cell.extend(record);
        let page = build_page(INDEX_INTERIOR, 0, Some(9), &[cell]);

        let Page::IndexInterior(interior) = parse(page).unwrap() else {
            panic!("wanted index interior");
        };
        let pointers = interior.pointers().unwrap();
        assert_eq!(pointers.len(), 2);
        let entry = IndexEntry { key: vec![Value::Text("mn".into())], row_id: 3 };
        assert_eq!(pointers[0], Pointer::new(None, Some(entry.clone()), 8));
        assert_eq!(pointers[1], Pointer::new(Some(entry), None, 9));
    }

    #[test]
    fn unknown_page_type_errors() {
        let page = build_page(0x07, 0, None, &[]);
        let err = parse(page).unwrap_err();
        assert!(err.to_string().contains("invalid page type: 07"), "{err}");
    }

    #[test]
    fn narrowing_to_the_wrong_family_errors() {
        let page = build_page(TABLE_LEAF, 0, None, &[]);
        let err = parse(page).unwrap().into_index().unwrap_err();
        assert!(err.to_string().contains("wanted index page"), "{err}");

        let page = build_page(INDEX_LEAF, 0, None, &[]);
        let err = parse(page).unwrap().into_table().unwrap_err();
        assert!(err.to_string().contains("wanted table page"), "{err}");
    }

    #[test]
    fn cell_payload_overrunning_page_errors() {
        // payload size claims 200 bytes at the very end of the page
        let mut cell = varint(200);
        cell.extend(varint(1));
        let page = build_page(TABLE_LEAF, 0, None, &[cell]);
        let Page::TableLeaf(leaf) = parse(page).unwrap() else {
            panic!("wanted table leaf");
        };
        assert!(leaf.rows().is_err());
    }
}
