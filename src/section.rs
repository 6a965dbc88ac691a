use crate::error::Converter;
use crate::Result;
use std::io::Write;

/// Header of a binary section containing compressed vector data packets.
#[derive(Debug, Default)]
pub struct CompressedVectorSectionHeader {
    /// Logical length of the section including this header and all packets.
    pub section_length: u64,
    /// Physical offset of the first data packet.
    pub data_offset: u64,
    /// Physical offset of the first index packet, zero if there is none.
    pub index_offset: u64,
}

impl CompressedVectorSectionHeader {
    pub const SIZE: u64 = 32;
    const SECTION_ID: u8 = 1;

    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        let mut buffer = [0_u8; Self::SIZE as usize];
        buffer[0] = Self::SECTION_ID;
        buffer[8..16].copy_from_slice(&self.section_length.to_le_bytes());
        buffer[16..24].copy_from_slice(&self.data_offset.to_le_bytes());
        buffer[24..32].copy_from_slice(&self.index_offset.to_le_bytes());
        writer
            .write_all(&buffer)
            .write_err("Failed to write compressed vector section header")
    }
}

/// Header in front of each data packet inside a compressed vector section.
pub struct DataPacketHeader {
    /// Logical length of the packet including header, must be a multiple of four.
    pub packet_length: u64,
    /// Number of byte streams, one per prototype field.
    pub bytestream_count: u16,
}

impl DataPacketHeader {
    pub const SIZE: usize = 6;
    const PACKET_TYPE: u8 = 1;

    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        let mut buffer = [0_u8; Self::SIZE];
        buffer[0] = Self::PACKET_TYPE;
        // Flags stay zero, this writer never requests a compressor restart
        let length = (self.packet_length - 1) as u16;
        buffer[2..4].copy_from_slice(&length.to_le_bytes());
        buffer[4..6].copy_from_slice(&self.bytestream_count.to_le_bytes());
        writer
            .write_all(&buffer)
            .write_err("Failed to write data packet header")
    }
}

/// Header in front of the binary content of a blob.
pub struct BlobSectionHeader {
    /// Logical length of the section including this header.
    pub section_length: u64,
}

impl BlobSectionHeader {
    pub const SIZE: u64 = 16;
    const SECTION_ID: u8 = 0;

    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        let mut buffer = [0_u8; Self::SIZE as usize];
        buffer[0] = Self::SECTION_ID;
        buffer[8..16].copy_from_slice(&self.section_length.to_le_bytes());
        writer
            .write_all(&buffer)
            .write_err("Failed to write blob section header")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_vector_header_bytes() {
        let mut bytes = Vec::new();
        CompressedVectorSectionHeader {
            section_length: 132,
            data_offset: 80,
            index_offset: 0,
        }
        .write(&mut bytes)
        .unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..8].iter().all(|b| *b == 0));
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 132);
        assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 80);
        assert_eq!(u64::from_le_bytes(bytes[24..32].try_into().unwrap()), 0);
    }

    #[test]
    fn data_packet_stores_length_minus_one() {
        let mut bytes = Vec::new();
        DataPacketHeader {
            packet_length: 36,
            bytestream_count: 6,
        }
        .write(&mut bytes)
        .unwrap();
        assert_eq!(bytes, [1, 0, 35, 0, 6, 0]);
    }

    #[test]
    fn blob_header_bytes() {
        let mut bytes = Vec::new();
        BlobSectionHeader { section_length: 16 + 300 }
            .write(&mut bytes)
            .unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 316);
    }
}
