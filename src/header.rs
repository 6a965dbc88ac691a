use crate::error::Converter;
use crate::paged_writer::PAGE_SIZE;
use crate::Result;
use std::io::Write;

const SIGNATURE: &[u8; 8] = b"ASTM-E57";
const MAJOR_VERSION: u32 = 1;
const MINOR_VERSION: u32 = 0;

/// The 48 byte structure at the start of every E57 file.
///
/// A freshly created archive starts with a default header where XML offset
/// and length are zero. Readers reject such files, so an archive that was
/// never closed cannot be mistaken for a complete one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileHeader {
    /// Physical length of the whole file including all CRC bytes.
    pub phys_length: u64,
    /// Physical offset of the XML section.
    pub phys_xml_offset: u64,
    /// Logical length of the XML section without CRC bytes.
    pub xml_length: u64,
}

impl FileHeader {
    pub const SIZE: usize = 48;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0_u8; Self::SIZE];
        bytes[0..8].copy_from_slice(SIGNATURE);
        bytes[8..12].copy_from_slice(&MAJOR_VERSION.to_le_bytes());
        bytes[12..16].copy_from_slice(&MINOR_VERSION.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.phys_length.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.phys_xml_offset.to_le_bytes());
        bytes[32..40].copy_from_slice(&self.xml_length.to_le_bytes());
        bytes[40..48].copy_from_slice(&PAGE_SIZE.to_le_bytes());
        bytes
    }

    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        writer
            .write_all(&self.to_bytes())
            .write_err("Failed to write E57 file header")
    }
}
