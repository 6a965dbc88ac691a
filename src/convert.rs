use crate::{
    generate_guid, load_las, load_manifest, ConversionConfig, E57Writer, Error,
    ImageDescriptor, ImageSectionBuilder, PointRecords, Result, ScanOptions,
};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Step of a conversion run.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    /// Checking the conversion settings.
    Configuration,
    /// Reading the image manifest.
    Manifest,
    /// Reading the LAS point cloud.
    PointCloud,
    /// Creating the output file.
    Archive,
    /// Writing the scan.
    Scan,
    /// Appending the image with the given manifest index.
    Image { index: usize, name: String },
    /// Writing XML section and file header.
    Finalize,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Stage::Configuration => write!(f, "configuration"),
            Stage::Manifest => write!(f, "manifest"),
            Stage::PointCloud => write!(f, "point cloud"),
            Stage::Archive => write!(f, "archive creation"),
            Stage::Scan => write!(f, "scan"),
            Stage::Image { index, name } => write!(f, "image #{index} '{name}'"),
            Stage::Finalize => write!(f, "finalization"),
        }
    }
}

/// Failure of a conversion run together with the stage that failed.
#[derive(Debug)]
pub struct ConvertError {
    pub stage: Stage,
    pub error: Error,
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Conversion failed at {} stage", self.stage)
    }
}

impl StdError for ConvertError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, ConvertError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, ConvertError> {
        self.map_err(|error| ConvertError { stage, error })
    }
}

/// Result of a successful conversion run.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionSummary {
    /// Number of points in the written scan.
    pub points: usize,
    /// Number of written images.
    pub images: usize,
    pub output_path: PathBuf,
}

/// Converts a LAS point cloud and the images of a manifest into one E57 file.
///
/// The manifest is parsed before the output file is touched.
/// If anything fails after the output file was created, it gets deleted again.
pub fn convert(config: &ConversionConfig) -> std::result::Result<ConversionSummary, ConvertError> {
    let builder = image_builder(config).at(Stage::Configuration)?;

    log::info!("Reading manifest {}", config.manifest_path.display());
    let images = load_manifest(&config.manifest_path).at(Stage::Manifest)?;

    log::info!("Reading point cloud {}", config.las_path.display());
    let points = load_las(&config.las_path).at(Stage::PointCloud)?;

    log::info!("Creating E57 file {}", config.output_path.display());
    let writer = E57Writer::create(&config.output_path, &generate_guid()).at(Stage::Archive)?;
    if let Err(err) = write_archive(writer, config, &builder, &points, &images) {
        rollback(&config.output_path);
        return Err(err);
    }

    Ok(ConversionSummary {
        points: points.len(),
        images: images.len(),
        output_path: config.output_path.clone(),
    })
}

fn image_builder(config: &ConversionConfig) -> Result<ImageSectionBuilder> {
    let mut builder = ImageSectionBuilder::new()
        .jpeg_quality(config.jpeg_quality)?
        .keep_jpeg_bytes(config.keep_jpeg_bytes);
    if let Some(desc) = &config.description {
        builder = builder.description(desc.as_str());
    }
    if let Some(vendor) = &config.sensor_vendor {
        builder = builder.sensor_vendor(vendor.as_str());
    }
    Ok(builder)
}

fn write_archive(
    mut writer: E57Writer<File>,
    config: &ConversionConfig,
    builder: &ImageSectionBuilder,
    points: &PointRecords,
    images: &[ImageDescriptor],
) -> std::result::Result<(), ConvertError> {
    log::info!("Writing scan with {} points", points.len());
    let options = ScanOptions {
        name: Some(config.scan_name.clone()),
        sensor_vendor: config.sensor_vendor.clone(),
        pose: config.scan_pose.clone(),
        ..Default::default()
    };
    let index = writer.write_scan(points, &options).at(Stage::Scan)?;
    writer.scan(index).at(Stage::Scan)?;

    for (index, image) in images.iter().enumerate() {
        log::info!("Adding image #{index} '{}'", image.name);
        let stage = Stage::Image {
            index,
            name: image.name.clone(),
        };
        builder.append(&mut writer, image).at(stage)?;
    }

    log::info!("Finalizing E57 file");
    writer.close().at(Stage::Finalize)
}

fn rollback(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::warn!("Removed incomplete output file {}", path.display()),
        Err(err) => log::error!(
            "Failed to remove incomplete output file {}: {err}",
            path.display()
        ),
    }
}
