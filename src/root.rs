use crate::xml;
use crate::{DateTime, ImageHeader, ScanHeader};

const FORMAT_NAME: &str = "ASTM E57 3D Imaging Data File";
const NAMESPACE: &str = "http://www.astm.org/COMMIT/E57/2010-e57-v1.0";
const LIBRARY_VERSION: &str = concat!("e57-pano ", env!("CARGO_PKG_VERSION"));

/// Serializes the complete XML section of an E57 file.
pub(crate) fn serialize_root(
    guid: &str,
    creation: &DateTime,
    scans: &[ScanHeader],
    images: &[ImageHeader],
) -> String {
    let mut children = xml::string_node("formatName", FORMAT_NAME);
    children += &xml::string_node("guid", guid);
    children += &xml::integer_node("versionMajor", 1);
    children += &xml::integer_node("versionMinor", 0);
    children += &xml::string_node("e57LibraryVersion", LIBRARY_VERSION);
    children += &creation.xml_string("creationDateTime");

    let data3d: String = scans.iter().map(ScanHeader::xml_string).collect();
    children += &xml::vector("data3D", &data3d);
    let images2d: String = images.iter().map(ImageHeader::xml_string).collect();
    children += &xml::vector("images2D", &images2d);

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<e57Root type=\"Structure\" xmlns=\"{NAMESPACE}\">\n{children}</e57Root>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn empty_root() {
        let xml = serialize_root("{file}", &DateTime::from_unix_seconds(0.0), &[], &[]);
        let doc = Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert!(root.has_tag_name("e57Root"));

        let child_text = |tag: &str| {
            root.children()
                .find(|n| n.has_tag_name(tag))
                .and_then(|n| n.text())
                .map(String::from)
        };
        assert_eq!(child_text("formatName").as_deref(), Some(FORMAT_NAME));
        assert_eq!(child_text("guid").as_deref(), Some("{file}"));
        assert_eq!(child_text("versionMajor").as_deref(), Some("1"));
        assert_eq!(child_text("versionMinor").as_deref(), Some("0"));

        for tag in ["data3D", "images2D"] {
            let vector = root.children().find(|n| n.has_tag_name(tag)).unwrap();
            assert_eq!(vector.attribute("type"), Some("Vector"));
            assert_eq!(vector.children().filter(|n| n.is_element()).count(), 0);
        }
    }
}
