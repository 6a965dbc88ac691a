use crate::error::Converter;
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom, Write};

pub const PAGE_SIZE: u64 = 1024;
const CRC_SIZE: u64 = 4;
const PAGE_PAYLOAD_SIZE: usize = (PAGE_SIZE - CRC_SIZE) as usize;

/// Writes logical E57 data into physical pages of 1020 payload bytes followed by a CRC-32C.
///
/// The page under the cursor is kept in memory and only stored when it is full,
/// when flushing or before seeking. Seeking loads existing page content back
/// into memory, so already written sections can be patched in place.
pub struct PagedWriter<T: Read + Write + Seek> {
    inner: T,
    page: [u8; PAGE_SIZE as usize],
    page_index: u64,
    page_offset: usize,
}

impl<T: Read + Write + Seek> PagedWriter<T> {
    /// Wraps an empty writer that must also support reading and seeking.
    pub fn new(mut inner: T) -> Result<Self> {
        let end = inner
            .seek(SeekFrom::End(0))
            .write_err("Unable to determine length of writer")?;
        if end != 0 {
            Error::invalid("Supplied writer is not empty")?
        }
        Ok(Self {
            inner,
            page: [0_u8; PAGE_SIZE as usize],
            page_index: 0,
            page_offset: 0,
        })
    }

    /// Physical offset of the cursor, including the CRC bytes of all previous pages.
    pub fn physical_position(&self) -> u64 {
        self.page_index * PAGE_SIZE + self.page_offset as u64
    }

    /// Moves the cursor to a physical offset inside the already written data.
    pub fn physical_seek(&mut self, pos: u64) -> Result<()> {
        self.flush().write_err("Failed to store current page before seeking")?;

        let end = self
            .inner
            .seek(SeekFrom::End(0))
            .write_err("Failed to seek to end of writer")?;
        if pos > end {
            Error::invalid(format!("Cannot seek to {pos} behind end of file at {end}"))?
        }
        let offset = (pos % PAGE_SIZE) as usize;
        if offset >= PAGE_PAYLOAD_SIZE {
            Error::invalid(format!("Cannot seek to {pos} inside a page checksum"))?
        }

        self.page_index = pos / PAGE_SIZE;
        self.page_offset = offset;
        self.load_page()
            .write_err("Failed to load existing page after seeking")
    }

    /// Physical size of all data written so far, always a multiple of the page size.
    pub fn physical_size(&mut self) -> Result<u64> {
        self.flush().write_err("Failed to store current page")?;
        self.inner
            .seek(SeekFrom::End(0))
            .write_err("Failed to seek to end of writer")
    }

    /// Writes zero bytes until the cursor is on a 4-byte-aligned offset.
    pub fn align(&mut self) -> Result<()> {
        let misalignment = self.page_offset % 4;
        if misalignment != 0 {
            let zeros = [0_u8; 4];
            self.write_all(&zeros[misalignment..])
                .write_err("Failed to write zero bytes for alignment")?;
        }
        Ok(())
    }

    fn load_page(&mut self) -> std::io::Result<()> {
        self.inner
            .seek(SeekFrom::Start(self.page_index * PAGE_SIZE))?;
        let mut filled = 0;
        while filled < self.page.len() {
            let read = self.inner.read(&mut self.page[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        self.page[filled..].fill(0);
        Ok(())
    }

    fn store_page(&mut self) -> std::io::Result<()> {
        let crc = crc32c::crc32c(&self.page[..PAGE_PAYLOAD_SIZE]);
        self.page[PAGE_PAYLOAD_SIZE..].copy_from_slice(&crc.to_be_bytes());
        self.inner
            .seek(SeekFrom::Start(self.page_index * PAGE_SIZE))?;
        self.inner.write_all(&self.page)
    }
}

impl<T: Read + Write + Seek> Write for PagedWriter<T> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let writable = buf.len().min(PAGE_PAYLOAD_SIZE - self.page_offset);
        self.page[self.page_offset..self.page_offset + writable]
            .copy_from_slice(&buf[..writable]);
        self.page_offset += writable;
        if self.page_offset == PAGE_PAYLOAD_SIZE {
            self.store_page()?;
            self.page_index += 1;
            self.page_offset = 0;
            self.load_page()?;
        }
        Ok(writable)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // An untouched page at a page boundary does not need to exist yet
        if self.page_offset > 0 {
            self.store_page()?;
        }
        self.inner.flush()
    }
}

impl<T: Read + Write + Seek> Drop for PagedWriter<T> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            log::warn!("Failed to flush last E57 page on drop: {err}");
        }
    }
}
