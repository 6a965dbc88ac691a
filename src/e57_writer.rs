use crate::error::Converter;
use crate::header::FileHeader;
use crate::paged_writer::PagedWriter;
use crate::root::serialize_root;
use crate::scan_writer::write_points;
use crate::xml::is_valid_text;
use crate::{
    Blob, ColorLimits, DateTime, Error, ImageHeader, ImageMetadata, PointRecords, Pose, Result,
    ScanHeader, ScanOptions,
};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Life cycle state of an [`E57Writer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterState {
    /// File header placeholder is written, waiting for the scan.
    Created,
    /// The scan is written, images can be appended.
    ScanWritten,
    /// The scan and the given number of images are written.
    ImagesAppended(usize),
    /// XML section and final header are written, nothing can be added anymore.
    Closed,
    /// A write operation failed and the file content is undefined.
    Failed,
}

/// Creates a new random GUID wrapped in curly braces.
pub fn generate_guid() -> String {
    format!("{{{}}}", uuid::Uuid::new_v4())
}

/// Main interface for writing E57 files with one colored scan and a list of panorama images.
pub struct E57Writer<T: Read + Write + Seek> {
    writer: PagedWriter<T>,
    guid: String,
    creation: DateTime,
    state: WriterState,
    scans: Vec<ScanHeader>,
    images: Vec<ImageHeader>,
}

impl E57Writer<File> {
    /// Creates or truncates the file at the given path and starts a new E57 file.
    pub fn create(path: impl AsRef<Path>, guid: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .create_err(format!("Unable to open file '{}' for writing", path.display()))?;
        Self::new(file, guid)
    }
}

impl<T: Read + Write + Seek> E57Writer<T> {
    /// Creates a new E57 generator from an empty writer that must also implement Read and Seek.
    ///
    /// Keep in mind that File::create() will not work as input because it only opens the file for writing!
    pub fn new(writer: T, guid: &str) -> Result<Self> {
        if guid.is_empty() {
            Error::invalid("The file GUID must not be empty")?
        }
        check_text(guid, "file GUID")?;
        let mut writer = PagedWriter::new(writer)?;

        // Placeholder without XML section, readers reject the file until it is closed
        FileHeader::default()
            .write(&mut writer)
            .create_err("Failed to write placeholder file header")?;

        Ok(Self {
            writer,
            guid: guid.to_owned(),
            creation: DateTime::now(),
            state: WriterState::Created,
            scans: Vec::new(),
            images: Vec::new(),
        })
    }

    /// Current life cycle state.
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// GUID of the whole file.
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Metadata of all written scans.
    pub fn scans(&self) -> &[ScanHeader] {
        &self.scans
    }

    /// Metadata of the scan with the given index.
    pub fn scan(&self, index: usize) -> Result<&ScanHeader> {
        self.scans
            .get(index)
            .invalid_err(format!("There is no scan with index {index}"))
    }

    /// Metadata of all appended images.
    pub fn images(&self) -> &[ImageHeader] {
        &self.images
    }

    /// Writes the points as the one scan of this file and returns its index.
    pub fn write_scan(&mut self, points: &PointRecords, options: &ScanOptions) -> Result<usize> {
        match self.state {
            WriterState::Created => {}
            WriterState::ScanWritten | WriterState::ImagesAppended(_) => {
                Error::state("A scan was already written, only one scan is supported")?
            }
            state => Error::state(format!("Cannot write scan in state {state:?}"))?,
        }
        check_pose(&options.pose, "scan")?;
        let guid = options.guid.clone().unwrap_or_else(generate_guid);
        if guid.is_empty() || guid == self.guid {
            Error::invalid(format!("The scan GUID '{guid}' is not unique"))?
        }
        check_text(&guid, "scan GUID")?;
        check_optional_texts(
            "scan",
            &[&options.name, &options.description, &options.sensor_vendor],
        )?;

        let file_offset = self.failing(|w| write_points(&mut w.writer, points))?;
        let header = ScanHeader {
            guid,
            name: options.name.clone(),
            description: options.description.clone(),
            sensor_vendor: options.sensor_vendor.clone(),
            records: points.len() as u64,
            file_offset,
            pose: options.pose.clone(),
            cartesian_bounds: points.cartesian_bounds(),
            color_limits: ColorLimits::covering(points.max_color().unwrap_or_default()),
        };
        log::info!(
            "Wrote scan {} with {} points at offset {file_offset}",
            header.guid,
            header.records
        );
        self.scans.push(header);
        self.state = WriterState::ScanWritten;
        Ok(self.scans.len() - 1)
    }

    /// Writes the JPEG data as blob and appends the image to the file.
    /// The image is associated with the previously written scan.
    /// Returns the index of the new image.
    pub fn add_image(&mut self, metadata: ImageMetadata, jpeg: &[u8]) -> Result<usize> {
        let scan_guid = match self.state {
            WriterState::ScanWritten | WriterState::ImagesAppended(_) => self.scan(0)?.guid.clone(),
            WriterState::Created => Error::state("Cannot add an image before the scan was written")?,
            state => Error::state(format!("Cannot add image in state {state:?}"))?,
        };
        if jpeg.is_empty() {
            Error::encode(format!("JPEG data of image '{}' is empty", metadata.name))?
        }
        self.check_image(&metadata)?;

        let blob = self.failing(|w| Blob::write(&mut w.writer, jpeg))?;
        log::debug!(
            "Added image {} with {} JPEG bytes at offset {}",
            metadata.guid,
            blob.length,
            blob.offset
        );
        self.images.push(ImageHeader {
            metadata,
            scan_guid: Some(scan_guid),
            jpeg: blob,
        });
        self.state = WriterState::ImagesAppended(self.images.len());
        Ok(self.images.len() - 1)
    }

    /// Writes the XML section and the final file header.
    ///
    /// Closing an already closed writer does nothing.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            WriterState::Closed => return Ok(()),
            WriterState::ScanWritten | WriterState::ImagesAppended(_) => {}
            WriterState::Created => Error::state("Cannot close a file without scan")?,
            WriterState::Failed => Error::state("Cannot close a file after a failed write")?,
        }

        let xml = serialize_root(&self.guid, &self.creation, &self.scans, &self.images);
        self.failing(|w| w.write_xml(xml.as_bytes()))?;
        self.state = WriterState::Closed;
        log::info!(
            "Closed E57 file with {} scan(s) and {} image(s)",
            self.scans.len(),
            self.images.len()
        );
        Ok(())
    }

    fn write_xml(&mut self, xml: &[u8]) -> Result<()> {
        let xml_offset = self.writer.physical_position();
        self.writer
            .write_all(xml)
            .write_err("Failed to write XML data")?;
        let phys_length = self.writer.physical_size()?;

        let header = FileHeader {
            phys_length,
            phys_xml_offset: xml_offset,
            xml_length: xml.len() as u64,
        };
        self.writer.physical_seek(0)?;
        header.write(&mut self.writer)?;
        self.writer
            .flush()
            .write_err("Failed to flush writer at the end")
    }

    fn check_image(&self, metadata: &ImageMetadata) -> Result<()> {
        let guid = &metadata.guid;
        let taken = *guid == self.guid
            || self.scans.iter().any(|s| s.guid == *guid)
            || self.images.iter().any(|i| i.metadata.guid == *guid);
        if guid.is_empty() || taken {
            Error::invalid(format!("The image GUID '{guid}' is not unique"))?
        }
        check_text(guid, "image GUID")?;
        check_text(&metadata.name, "image name")?;
        check_optional_texts("image", &[&metadata.description, &metadata.sensor_vendor])?;
        check_pose(&metadata.pose, "image")?;
        let sp = &metadata.spherical;
        if sp.width == 0 || sp.height == 0 {
            Error::invalid(format!(
                "Image '{}' has invalid dimensions {}x{}",
                metadata.name, sp.width, sp.height
            ))?
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(sp.pixel_width) || !valid(sp.pixel_height) {
            Error::invalid(format!(
                "Image '{}' has invalid pixel size {}x{}",
                metadata.name, sp.pixel_width, sp.pixel_height
            ))?
        }
        Ok(())
    }

    /// Runs a write operation and freezes the writer if it fails.
    fn failing<R>(&mut self, op: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let res = op(self);
        if res.is_err() {
            self.state = WriterState::Failed;
        }
        res
    }
}

fn check_pose(pose: &Pose, owner: &str) -> Result<()> {
    if !pose.is_finite() {
        Error::invalid(format!("The {owner} pose contains non-finite values"))?
    }
    if pose.rotation.norm() == 0.0 {
        Error::invalid(format!("The {owner} rotation quaternion has zero length"))?
    }
    Ok(())
}

/// Strings end up in CDATA sections of the XML section, which cannot hold control characters.
fn check_text(value: &str, what: &str) -> Result<()> {
    if !is_valid_text(value) {
        Error::invalid(format!(
            "The {what} {value:?} contains characters that are not allowed in XML"
        ))?
    }
    Ok(())
}

fn check_optional_texts(owner: &str, values: &[&Option<String>]) -> Result<()> {
    for value in values.iter().copied().flatten() {
        check_text(value, &format!("{owner} metadata"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SphericalProperties;
    use std::cell::Cell;
    use std::io::{Cursor, ErrorKind, SeekFrom};
    use std::rc::Rc;

    /// In-memory writer whose writes start failing once the shared flag is set.
    struct BrokenDisk {
        data: Cursor<Vec<u8>>,
        broken: Rc<Cell<bool>>,
    }

    impl Read for BrokenDisk {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.data.read(buf)
        }
    }

    impl Seek for BrokenDisk {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.data.seek(pos)
        }
    }

    impl Write for BrokenDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.broken.get() {
                return Err(std::io::Error::new(ErrorKind::Other, "disk full"));
            }
            self.data.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.data.flush()
        }
    }

    fn points() -> PointRecords {
        PointRecords::new(
            vec![0.0, 1.0],
            vec![0.0, 2.0],
            vec![0.0, 3.0],
            vec![10.0, 20.0],
            vec![30.0, 40.0],
            vec![50.0, 60.0],
        )
        .unwrap()
    }

    fn image(guid: &str) -> ImageMetadata {
        ImageMetadata {
            guid: guid.to_owned(),
            name: String::from("pano"),
            description: None,
            sensor_vendor: None,
            pose: Pose::default(),
            spherical: SphericalProperties {
                width: 4,
                height: 2,
                pixel_width: 1.5,
                pixel_height: 1.5,
            },
        }
    }

    #[test]
    fn state_transitions() {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = E57Writer::new(&mut buffer, "{file}").unwrap();
        assert_eq!(writer.state(), WriterState::Created);

        let res = writer.add_image(image("{a}"), b"jpeg");
        assert!(matches!(res, Err(Error::ArchiveState { .. })));
        assert_eq!(writer.state(), WriterState::Created);

        assert_eq!(writer.write_scan(&points(), &ScanOptions::default()).unwrap(), 0);
        assert_eq!(writer.state(), WriterState::ScanWritten);
        let res = writer.write_scan(&points(), &ScanOptions::default());
        assert!(matches!(res, Err(Error::ArchiveState { .. })));

        assert_eq!(writer.add_image(image("{a}"), b"jpeg").unwrap(), 0);
        assert_eq!(writer.add_image(image("{b}"), b"jpeg").unwrap(), 1);
        assert_eq!(writer.state(), WriterState::ImagesAppended(2));

        writer.close().unwrap();
        assert_eq!(writer.state(), WriterState::Closed);
        let res = writer.add_image(image("{c}"), b"jpeg");
        assert!(matches!(res, Err(Error::ArchiveState { .. })));
    }

    #[test]
    fn second_close_is_noop() {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = E57Writer::new(&mut buffer, "{file}").unwrap();
        writer.write_scan(&points(), &ScanOptions::default()).unwrap();
        writer.close().unwrap();
        let size = writer.writer.physical_size().unwrap();
        writer.close().unwrap();
        assert_eq!(writer.state(), WriterState::Closed);
        assert_eq!(writer.writer.physical_size().unwrap(), size);
        drop(writer);
        assert_eq!(buffer.get_ref().len() as u64, size);
        assert_eq!(size % 1024, 0);
    }

    #[test]
    fn closing_without_scan_fails() {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = E57Writer::new(&mut buffer, "{file}").unwrap();
        assert!(matches!(writer.close(), Err(Error::ArchiveState { .. })));
        assert_eq!(writer.state(), WriterState::Created);
    }

    #[test]
    fn validation_errors_keep_writer_usable() {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = E57Writer::new(&mut buffer, "{file}").unwrap();
        let options = ScanOptions {
            guid: Some(String::from("{scan}")),
            ..Default::default()
        };
        writer.write_scan(&points(), &options).unwrap();

        let res = writer.add_image(image("{scan}"), b"jpeg");
        assert!(matches!(res, Err(Error::Invalid { .. })));
        let res = writer.add_image(image("{a}"), b"");
        assert!(matches!(res, Err(Error::ImageEncode { .. })));
        let mut zero_pixel = image("{a}");
        zero_pixel.spherical.pixel_width = 0.0;
        let res = writer.add_image(zero_pixel, b"jpeg");
        assert!(matches!(res, Err(Error::Invalid { .. })));
        assert_eq!(writer.state(), WriterState::ScanWritten);

        writer.add_image(image("{a}"), b"jpeg").unwrap();
        let res = writer.add_image(image("{a}"), b"jpeg");
        assert!(matches!(res, Err(Error::Invalid { .. })));
        assert_eq!(writer.images()[0].scan_guid.as_deref(), Some("{scan}"));
        writer.close().unwrap();
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut buffer = Cursor::new(Vec::new());
        assert!(matches!(
            E57Writer::new(&mut buffer, "{fi\u{1}le}"),
            Err(Error::Invalid { .. })
        ));

        let mut buffer = Cursor::new(Vec::new());
        let mut writer = E57Writer::new(&mut buffer, "{file}").unwrap();
        let options = ScanOptions {
            name: Some(String::from("scan\u{7}")),
            ..Default::default()
        };
        let res = writer.write_scan(&points(), &options);
        assert!(matches!(res, Err(Error::Invalid { .. })));
        assert_eq!(writer.state(), WriterState::Created);
        writer.write_scan(&points(), &ScanOptions::default()).unwrap();

        let mut bad_name = image("{a}");
        bad_name.name = String::from("bad\u{1}name");
        let mut bad_guid = image("{b\u{1F}}");
        bad_guid.name = String::from("fine");
        let mut bad_vendor = image("{c}");
        bad_vendor.sensor_vendor = Some(String::from("\u{C}"));
        for metadata in [bad_name, bad_guid, bad_vendor] {
            let res = writer.add_image(metadata, b"jpeg");
            assert!(matches!(res, Err(Error::Invalid { .. })));
        }
        assert_eq!(writer.state(), WriterState::ScanWritten);
        assert!(writer.images().is_empty());

        let mut tabbed = image("{d}");
        tabbed.description = Some(String::from("north\tside\r\n"));
        writer.add_image(tabbed, b"jpeg").unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.e57");
        let res = E57Writer::create(&path, "{file}");
        assert!(matches!(res, Err(Error::ArchiveCreate { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn io_error_freezes_writer() {
        let broken = Rc::new(Cell::new(false));
        let disk = BrokenDisk {
            data: Cursor::new(Vec::new()),
            broken: broken.clone(),
        };
        let mut writer = E57Writer::new(disk, "{file}").unwrap();
        writer.write_scan(&points(), &ScanOptions::default()).unwrap();

        broken.set(true);
        // Larger than one page, so the writer has to store a page
        let res = writer.add_image(image("{a}"), &[0xFF; 4096]);
        assert!(matches!(res, Err(Error::Write { .. })));
        assert_eq!(writer.state(), WriterState::Failed);
        assert!(writer.images().is_empty());

        broken.set(false);
        let res = writer.add_image(image("{b}"), b"jpeg");
        assert!(matches!(res, Err(Error::ArchiveState { .. })));
        assert!(matches!(writer.close(), Err(Error::ArchiveState { .. })));
        assert_eq!(writer.state(), WriterState::Failed);
    }

    #[test]
    fn header_is_placeholder_until_closed() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = E57Writer::new(&mut buffer, "{file}").unwrap();
            writer.write_scan(&points(), &ScanOptions::default()).unwrap();
        }
        let content = buffer.into_inner();
        assert_eq!(&content[0..8], b"ASTM-E57");
        // XML offset and length are still zero
        assert!(content[24..40].iter().all(|b| *b == 0));
    }

    #[test]
    fn generated_guids_are_braced_and_unique() {
        let a = generate_guid();
        let b = generate_guid();
        assert_ne!(a, b);
        assert!(a.starts_with('{') && a.ends_with('}'));
        assert_eq!(a.len(), 38);
    }
}
