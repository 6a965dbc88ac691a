use crate::error::Converter;
use crate::paged_writer::PagedWriter;
use crate::scan::PROTOTYPE;
use crate::section::{CompressedVectorSectionHeader, DataPacketHeader};
use crate::{Error, PointRecords, Result};
use std::io::{Read, Seek, Write};

const VALUE_SIZE: usize = std::mem::size_of::<f64>();

/// Writes all points as compressed vector section and returns the physical section offset.
///
/// Every prototype field becomes one byte stream of little endian doubles.
/// Points are split into data packets that stay below the 64 KiB packet limit.
pub(crate) fn write_points<T: Read + Write + Seek>(
    writer: &mut PagedWriter<T>,
    points: &PointRecords,
) -> Result<u64> {
    // Preliminary header, length and data offset are patched in at the end
    let section_offset = writer.physical_position();
    let mut section_header = CompressedVectorSectionHeader {
        section_length: CompressedVectorSectionHeader::SIZE,
        ..Default::default()
    };
    section_header.write(writer)?;
    section_header.data_offset = writer.physical_position();

    let columns = points.columns();
    let max_points = max_packet_points();
    let mut start = 0;
    let mut packets = 0;
    while start < points.len() {
        let end = points.len().min(start + max_points);
        let packet_length = write_packet(writer, &columns, start..end)?;
        section_header.section_length += packet_length;
        packets += 1;
        start = end;
    }

    let end_offset = writer.physical_position();
    writer.physical_seek(section_offset)?;
    section_header.write(writer)?;
    writer.physical_seek(end_offset)?;

    log::debug!(
        "Wrote {} points in {packets} data packets at offset {section_offset}",
        points.len()
    );
    Ok(section_offset)
}

fn write_packet<T: Read + Write + Seek>(
    writer: &mut PagedWriter<T>,
    columns: &[&[f64]; 6],
    range: std::ops::Range<usize>,
) -> Result<u64> {
    let stream_size = range.len() * VALUE_SIZE;
    let unaligned = DataPacketHeader::SIZE + columns.len() * (2 + stream_size);
    let packet_length = unaligned.next_multiple_of(4);
    if packet_length > u16::MAX as usize + 1 {
        Error::internal(format!("Data packet with {packet_length} bytes is too big"))?
    }

    DataPacketHeader {
        packet_length: packet_length as u64,
        bytestream_count: columns.len() as u16,
    }
    .write(writer)?;
    let stream_length =
        u16::try_from(stream_size).internal_err("Byte stream does not fit into a data packet")?;
    for _ in columns.iter() {
        writer
            .write_all(&stream_length.to_le_bytes())
            .write_err("Failed to write byte stream length")?;
    }

    let mut stream = Vec::with_capacity(stream_size);
    for column in columns {
        stream.clear();
        for value in &column[range.clone()] {
            stream.extend_from_slice(&value.to_le_bytes());
        }
        writer
            .write_all(&stream)
            .write_err("Failed to write byte stream into data packet")?;
    }
    writer.align()?;

    Ok(packet_length as u64)
}

/// Maximum number of points per data packet.
/// The packet length field is 16 bits wide and also has to fit
/// the packet header and the length of each byte stream.
fn max_packet_points() -> usize {
    const SAFETY_MARGIN: usize = 500;
    let headers_size = DataPacketHeader::SIZE + PROTOTYPE.len() * 2;
    let point_size = PROTOTYPE.len() * VALUE_SIZE;
    (u16::MAX as usize - headers_size - SAFETY_MARGIN) / point_size
}
