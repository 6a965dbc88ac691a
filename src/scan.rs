use crate::xml;
use crate::{CartesianBounds, ColorLimits, Pose};

/// Names of the fields stored for every point, in byte stream order.
///
/// All fields are written as 64 bit floats.
pub const PROTOTYPE: [&str; 6] = [
    "cartesianX",
    "cartesianY",
    "cartesianZ",
    "colorRed",
    "colorGreen",
    "colorBlue",
];

/// Optional metadata for a new scan.
#[derive(Clone, Debug, Default)]
pub struct ScanOptions {
    /// GUID of the scan, a random one is generated if missing.
    pub guid: Option<String>,
    /// User-defined name of the scan.
    pub name: Option<String>,
    /// User-defined description of the scan.
    pub description: Option<String>,
    /// Manufacturer of the sensor that captured the scan.
    pub sensor_vendor: Option<String>,
    /// Transforms the scan coordinates into the file-level coordinate system.
    pub pose: Pose,
}

/// Metadata of a scan that was written into an E57 file.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct ScanHeader {
    /// Globally unique identifier of the scan.
    pub guid: String,
    /// User-defined name of the scan.
    pub name: Option<String>,
    /// User-defined description of the scan.
    pub description: Option<String>,
    /// Manufacturer of the sensor that captured the scan.
    pub sensor_vendor: Option<String>,
    /// Number of points stored in the scan.
    pub records: u64,
    /// Physical offset of the compressed vector section.
    pub file_offset: u64,
    /// Pose of the scan.
    pub pose: Pose,
    /// Bounds of the stored coordinates, missing for empty scans.
    pub cartesian_bounds: Option<CartesianBounds>,
    /// Value range of the stored colors.
    pub color_limits: ColorLimits,
}

impl ScanHeader {
    pub(crate) fn xml_string(&self) -> String {
        let mut children = xml::string_node("guid", &self.guid);
        if let Some(name) = &self.name {
            children += &xml::string_node("name", name);
        }
        if let Some(desc) = &self.description {
            children += &xml::string_node("description", desc);
        }
        if let Some(vendor) = &self.sensor_vendor {
            children += &xml::string_node("sensorVendor", vendor);
        }
        children += &self.pose.xml_string("pose");
        if let Some(bounds) = &self.cartesian_bounds {
            children += &bounds.xml_string();
        }
        children += &self.color_limits.xml_string();
        children += &self.points_xml();
        xml::structure("vectorChild", &children)
    }

    fn points_xml(&self) -> String {
        let limits = &self.color_limits;
        let color_ranges = [
            (limits.red_min, limits.red_max),
            (limits.green_min, limits.green_max),
            (limits.blue_min, limits.blue_max),
        ];
        let mut prototype = String::new();
        for name in &PROTOTYPE[..3] {
            prototype += &format!("<{name} type=\"Float\" precision=\"double\"/>\n");
        }
        for (name, (min, max)) in PROTOTYPE[3..].iter().zip(color_ranges) {
            prototype += &format!(
                "<{name} type=\"Float\" precision=\"double\" minimum=\"{min}\" maximum=\"{max}\"/>\n"
            );
        }
        let children = xml::structure("prototype", &prototype) + &xml::vector("codecs", "");
        format!(
            "<points type=\"CompressedVector\" fileOffset=\"{}\" recordCount=\"{}\">\n{children}</points>\n",
            self.file_offset, self.records
        )
    }
}
