use crate::error::Converter;
use crate::paged_writer::PagedWriter;
use crate::section::BlobSectionHeader;
use crate::xml;
use crate::Result;
use std::io::{Read, Seek, Write};

/// Location of a binary blob inside an E57 file.
#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    /// Physical offset of the blob section header.
    pub offset: u64,
    /// Logical length of the blob content in bytes.
    pub length: u64,
}

impl Blob {
    /// Writes the data as new blob section at the current position of the writer.
    pub(crate) fn write<T: Read + Write + Seek>(
        writer: &mut PagedWriter<T>,
        data: &[u8],
    ) -> Result<Self> {
        let offset = writer.physical_position();
        let length = data.len() as u64;
        BlobSectionHeader {
            section_length: BlobSectionHeader::SIZE + length,
        }
        .write(writer)?;
        writer
            .write_all(data)
            .write_err("Failed to write blob content")?;
        writer.align()?;
        log::debug!("Wrote blob with {length} bytes at offset {offset}");
        Ok(Self { offset, length })
    }

    pub(crate) fn xml_string(&self, tag_name: &str) -> String {
        xml::blob_node(tag_name, self.offset, self.length)
    }
}
