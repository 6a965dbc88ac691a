//! Writes LAS point clouds together with posed panorama images into E57 files.
//!
//! The [`E57Writer`] creates the paged E57 binary layout with CRC checksums,
//! one scan stored as compressed vector and any number of spherical images stored as JPEG blobs.
//! The [`convert`] function runs the complete pipeline from a LAS file and a JSON image manifest.

#![forbid(unsafe_code)]

mod blob;
mod bounds;
mod config;
mod convert;
mod date_time;
mod e57_writer;
mod error;
mod header;
mod image_builder;
mod image_header;
mod limits;
mod manifest;
mod paged_writer;
mod points;
mod pose;
mod root;
mod scan;
mod scan_writer;
mod section;
mod source;
mod xml;

pub use self::blob::Blob;
pub use self::bounds::CartesianBounds;
pub use self::config::ConversionConfig;
pub use self::config::DEFAULT_SCAN_NAME;
pub use self::convert::convert;
pub use self::convert::ConversionSummary;
pub use self::convert::ConvertError;
pub use self::convert::Stage;
pub use self::date_time::DateTime;
pub use self::e57_writer::generate_guid;
pub use self::e57_writer::E57Writer;
pub use self::e57_writer::WriterState;
pub use self::error::Error;
pub use self::error::Result;
pub use self::image_builder::ImageSectionBuilder;
pub use self::image_builder::SourceImage;
pub use self::image_builder::DEFAULT_DESCRIPTION;
pub use self::image_builder::DEFAULT_JPEG_QUALITY;
pub use self::image_builder::DEFAULT_SENSOR_VENDOR;
pub use self::image_header::ImageHeader;
pub use self::image_header::ImageMetadata;
pub use self::image_header::SphericalProperties;
pub use self::limits::ColorLimits;
pub use self::manifest::load_manifest;
pub use self::manifest::parse_manifest;
pub use self::manifest::ImageDescriptor;
pub use self::points::PointRecords;
pub use self::pose::Pose;
pub use self::pose::Quaternion;
pub use self::pose::Translation;
pub use self::scan::ScanHeader;
pub use self::scan::ScanOptions;
pub use self::scan::PROTOTYPE;
pub use self::source::load_las;
pub use self::source::read_las;
