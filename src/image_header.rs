use crate::xml;
use crate::{Blob, Pose};

/// Properties of an image with a spherical projection model.
#[derive(Clone, Debug, PartialEq)]
pub struct SphericalProperties {
    /// Width of the image in pixels.
    pub width: u32,
    /// Height of the image in pixels.
    pub height: u32,
    /// The width of a pixel in radians.
    pub pixel_width: f64,
    /// The height of a pixel in radians.
    pub pixel_height: f64,
}

/// Metadata of a spherical panorama image before its JPEG data is written.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageMetadata {
    /// Globally unique identifier of the image.
    pub guid: String,
    /// User-defined name, does not need to be unique.
    pub name: String,
    /// User-defined description of the image.
    pub description: Option<String>,
    /// Manufacturer of the camera or the software that created the image.
    pub sensor_vendor: Option<String>,
    /// Transforms the image coordinate system into the file-level coordinate system.
    pub pose: Pose,
    /// Pixel dimensions and pixel sizes of the panorama.
    pub spherical: SphericalProperties,
}

/// Metadata of an image that was written into an E57 file.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct ImageHeader {
    /// Metadata that was passed in when the image was added.
    pub metadata: ImageMetadata,
    /// GUID of the scan that was captured together with this image.
    pub scan_guid: Option<String>,
    /// Location of the JPEG data.
    pub jpeg: Blob,
}

impl ImageHeader {
    pub(crate) fn xml_string(&self) -> String {
        let meta = &self.metadata;
        let mut children = xml::string_node("guid", &meta.guid);
        children += &xml::string_node("name", &meta.name);
        if let Some(desc) = &meta.description {
            children += &xml::string_node("description", desc);
        }
        if let Some(vendor) = &meta.sensor_vendor {
            children += &xml::string_node("sensorVendor", vendor);
        }
        if let Some(scan_guid) = &self.scan_guid {
            children += &xml::string_node("associatedData3DGuid", scan_guid);
        }
        children += &meta.pose.xml_string("pose");

        let sp = &meta.spherical;
        let representation = self.jpeg.xml_string("jpegImage")
            + &xml::integer_node("imageWidth", sp.width as i64)
            + &xml::integer_node("imageHeight", sp.height as i64)
            + &xml::float_node("pixelWidth", sp.pixel_width)
            + &xml::float_node("pixelHeight", sp.pixel_height);
        children += &xml::structure("sphericalRepresentation", &representation);

        xml::structure("vectorChild", &children)
    }
}
