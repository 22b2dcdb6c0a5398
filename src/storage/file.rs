//! # Backing File
//!
//! Seekable byte source over the database file. The page-fetch contract is a
//! fresh seek followed by a read for every page; no buffering or mapping layer
//! sits in between. The file handle closes on drop, covering every exit path.

use eyre::{Result, WrapErr};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

#[derive(Debug)]
pub struct BackingFile {
    file: File,
}

impl BackingFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .wrap_err_with(|| format!("failed to open database file: {}", path.display()))?;
        Ok(Self { file })
    }

    pub fn new(file: File) -> Self {
        Self { file }
    }

    /// Repositions the read cursor to an absolute byte offset.
    pub fn seek(&self, pos: u64) -> Result<()> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(pos))
            .wrap_err_with(|| format!("failed to seek to offset {pos}"))?;
        Ok(())
    }

    /// Fills as much of `buf` as the file yields from the current position,
    /// looping over partial reads. Returns the number of bytes read; a count
    /// short of `buf.len()` means the file ended.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let mut file = &self.file;
        let mut filled = 0;
        while filled < buf.len() {
            let n = file
                .read(&mut buf[filled..])
                .wrap_err("failed to read from database file")?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}
