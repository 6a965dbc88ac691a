use crate::image_builder::DEFAULT_JPEG_QUALITY;
use crate::Pose;
use std::path::PathBuf;

/// Name of the scan if nothing else is configured.
pub const DEFAULT_SCAN_NAME: &str = "Scan 0";

/// Everything needed for one conversion run of [`crate::convert`].
#[derive(Clone, Debug)]
pub struct ConversionConfig {
    /// LAS or LAZ file with the colored point cloud.
    pub las_path: PathBuf,
    /// JSON manifest listing the panorama images.
    pub manifest_path: PathBuf,
    /// E57 file to create, an existing file is replaced.
    pub output_path: PathBuf,
    /// Pose of the scan in the file coordinate system.
    pub scan_pose: Pose,
    pub scan_name: String,
    /// JPEG quality between 1 and 100 used when encoding images.
    pub jpeg_quality: u8,
    /// Embed JPEG input files without encoding them again.
    pub keep_jpeg_bytes: bool,
    /// Fallback description of images without their own.
    pub description: Option<String>,
    /// Fallback sensor vendor of scan and images without their own.
    pub sensor_vendor: Option<String>,
}

impl ConversionConfig {
    /// Creates a configuration with identity scan pose and default image settings.
    pub fn new(
        las_path: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            las_path: las_path.into(),
            manifest_path: manifest_path.into(),
            output_path: output_path.into(),
            scan_pose: Pose::default(),
            scan_name: DEFAULT_SCAN_NAME.to_owned(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            keep_jpeg_bytes: false,
            description: None,
            sensor_vendor: None,
        }
    }
}
