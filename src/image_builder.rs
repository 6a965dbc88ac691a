use crate::error::Converter;
use crate::{
    generate_guid, E57Writer, Error, ImageDescriptor, ImageMetadata, Result, SphericalProperties,
};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder, ImageFormat};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Description used when neither the image nor the builder define one.
pub const DEFAULT_DESCRIPTION: &str = "My awesome image";

/// Sensor vendor used when neither the image nor the builder define one.
pub const DEFAULT_SENSOR_VENDOR: &str = "You scanner / software name";

/// JPEG quality used when nothing else is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Decoded input image, optionally with its original JPEG bytes.
pub struct SourceImage {
    image: DynamicImage,
    jpeg: Option<Vec<u8>>,
}

impl SourceImage {
    /// Loads and decodes an image file in any format supported by the image crate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .load_err(format!("Unable to read image file {}", path.display()))?;
        Self::from_bytes(bytes)
            .map_err(|err| match err {
                Error::ImageLoad { desc, source } => Error::ImageLoad {
                    desc: format!("{desc} in {}", path.display()),
                    source,
                },
                other => other,
            })
    }

    /// Decodes an encoded image from memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).load_err("Unknown image format")?;
        let image = image::load_from_memory_with_format(&bytes, format)
            .load_err(format!("Failed to decode {format:?} image"))?;
        let jpeg = (format == ImageFormat::Jpeg).then_some(bytes);
        Ok(Self { image, jpeg })
    }

    /// Wraps an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image, jpeg: None }
    }

    /// Width and height of the decoded image in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Turns input images into E57 image sections with JPEG blobs.
#[derive(Clone, Debug)]
pub struct ImageSectionBuilder {
    quality: u8,
    keep_jpeg_bytes: bool,
    description: String,
    sensor_vendor: String,
}

impl Default for ImageSectionBuilder {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            keep_jpeg_bytes: false,
            description: DEFAULT_DESCRIPTION.to_owned(),
            sensor_vendor: DEFAULT_SENSOR_VENDOR.to_owned(),
        }
    }
}

impl ImageSectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the JPEG quality between 1 (worst) and 100 (best).
    pub fn jpeg_quality(mut self, quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            Error::invalid(format!("JPEG quality {quality} is outside of 1..=100"))?
        }
        self.quality = quality;
        Ok(self)
    }

    /// Embeds JPEG input files as they are instead of encoding them again.
    pub fn keep_jpeg_bytes(mut self, keep: bool) -> Self {
        self.keep_jpeg_bytes = keep;
        self
    }

    /// Description for images that do not have their own.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sensor vendor for images that do not have their own.
    pub fn sensor_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.sensor_vendor = vendor.into();
        self
    }

    /// Loads the image file of the descriptor and appends it to the writer.
    /// Returns the index of the new image.
    pub fn append<T: Read + Write + Seek>(
        &self,
        writer: &mut E57Writer<T>,
        descriptor: &ImageDescriptor,
    ) -> Result<usize> {
        let source = SourceImage::load(&descriptor.path)?;
        self.append_source(writer, &source, descriptor)
    }

    /// Appends an already loaded image with the properties of the descriptor.
    /// The path of the descriptor is ignored.
    pub fn append_source<T: Read + Write + Seek>(
        &self,
        writer: &mut E57Writer<T>,
        source: &SourceImage,
        descriptor: &ImageDescriptor,
    ) -> Result<usize> {
        let metadata = self.metadata(source, descriptor);
        let jpeg = self.jpeg_bytes(source)?;
        writer.add_image(metadata, &jpeg)
    }

    fn metadata(&self, source: &SourceImage, descriptor: &ImageDescriptor) -> ImageMetadata {
        let (width, height) = source.dimensions();
        ImageMetadata {
            guid: descriptor.guid.clone().unwrap_or_else(generate_guid),
            name: descriptor.name.clone(),
            description: Some(
                descriptor
                    .description
                    .clone()
                    .unwrap_or_else(|| self.description.clone()),
            ),
            sensor_vendor: Some(
                descriptor
                    .sensor_vendor
                    .clone()
                    .unwrap_or_else(|| self.sensor_vendor.clone()),
            ),
            pose: descriptor.pose.clone(),
            spherical: SphericalProperties {
                width,
                height,
                pixel_width: descriptor.pixel_width,
                pixel_height: descriptor.pixel_height,
            },
        }
    }

    /// Returns the JPEG payload for the image, either the original bytes or a new encoding.
    pub fn jpeg_bytes(&self, source: &SourceImage) -> Result<Vec<u8>> {
        if self.keep_jpeg_bytes {
            if let Some(jpeg) = &source.jpeg {
                return Ok(jpeg.clone());
            }
        }

        let rgb = source.image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.quality)
            .write_image(rgb.as_raw(), width, height, ColorType::Rgb8.into())
            .encode_err(format!("Failed to encode {width}x{height} image as JPEG"))?;
        if buffer.is_empty() {
            Error::encode("JPEG encoder returned no data")?
        }
        Ok(buffer)
    }
}
