use crate::error::Converter;
use crate::{Error, PointRecords, Result};
use las::Reader;
use std::path::Path;

/// Loads positions and colors of all points from a LAS or LAZ file.
///
/// Colors are rescaled with [`PointRecords::rescale_colors`] after reading.
/// Point formats without RGB colors are rejected.
pub fn load_las(path: impl AsRef<Path>) -> Result<PointRecords> {
    let path = path.as_ref();
    let mut reader = Reader::from_path(path)
        .source_err(format!("Unable to open LAS file {}", path.display()))?;
    read_las(&mut reader)
}

/// Reads all points of an already opened LAS reader.
pub fn read_las(reader: &mut Reader) -> Result<PointRecords> {
    let header = reader.header();
    if !header.point_format().has_color {
        return Err(Error::SourceRead {
            desc: format!(
                "LAS point format {:?} contains no RGB colors",
                header.point_format()
            ),
            source: None,
        });
    }
    let count = header.number_of_points() as usize;

    let mut x = Vec::with_capacity(count);
    let mut y = Vec::with_capacity(count);
    let mut z = Vec::with_capacity(count);
    let mut red = Vec::with_capacity(count);
    let mut green = Vec::with_capacity(count);
    let mut blue = Vec::with_capacity(count);
    for (index, point) in reader.points().enumerate() {
        let point = point.source_err(format!("Failed to read LAS point #{index}"))?;
        let color = point
            .color
            .source_err(format!("LAS point #{index} has no color"))?;
        x.push(point.x);
        y.push(point.y);
        z.push(point.z);
        red.push(color.red as f64);
        green.push(color.green as f64);
        blue.push(color.blue as f64);
    }

    let mut records = PointRecords::new(x, y, z, red, green, blue)?;
    if records.rescale_colors() {
        log::info!("Rescaled 16 bit LAS colors of {} points to 8 bit range", records.len());
    }
    log::debug!("Read {} points from LAS", records.len());
    Ok(records)
}
