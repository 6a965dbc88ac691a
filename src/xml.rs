//! Small helpers to generate the typed E57 XML elements.

pub fn string_node(tag_name: &str, value: &str) -> String {
    // A CDATA section cannot contain its own terminator, so it gets split up
    let escaped = value.replace("]]>", "]]]]><![CDATA[>");
    format!("<{tag_name} type=\"String\"><![CDATA[{escaped}]]></{tag_name}>\n")
}

/// Returns true if the text only contains characters that are allowed in XML documents.
/// Control characters other than tab, line feed and carriage return are rejected.
pub fn is_valid_text(value: &str) -> bool {
    value.chars().all(|c| {
        matches!(c,
            '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}')
    })
}

pub fn float_node(tag_name: &str, value: f64) -> String {
    format!("<{tag_name} type=\"Float\">{value}</{tag_name}>\n")
}

pub fn integer_node(tag_name: &str, value: i64) -> String {
    format!("<{tag_name} type=\"Integer\">{value}</{tag_name}>\n")
}

pub fn blob_node(tag_name: &str, offset: u64, length: u64) -> String {
    format!("<{tag_name} type=\"Blob\" fileOffset=\"{offset}\" length=\"{length}\"/>\n")
}

pub fn structure(tag_name: &str, children: &str) -> String {
    format!("<{tag_name} type=\"Structure\">\n{children}</{tag_name}>\n")
}

pub fn vector(tag_name: &str, children: &str) -> String {
    format!("<{tag_name} type=\"Vector\" allowHeterogeneousChildren=\"1\">\n{children}</{tag_name}>\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_with_cdata_terminator() {
        let xml = string_node("name", "a]]>b");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let node = doc.root_element();
        assert_eq!(node.attribute("type"), Some("String"));
        let text: String = node.children().filter_map(|c| c.text()).collect();
        assert_eq!(text, "a]]>b");
    }

    #[test]
    fn control_characters_are_no_text() {
        assert!(is_valid_text("Lobby north\t2\r\n"));
        assert!(is_valid_text("Überblick 🌐"));
        assert!(is_valid_text(""));
        for bad in ["bad\u{1}name", "\u{8}", "a\u{B}", "\u{C}", "\u{1F}", "\u{FFFE}", "\0"] {
            assert!(!is_valid_text(bad), "{bad:?}");
        }
    }

    #[test]
    fn floats_round_trip() {
        for value in [0.001, -2.5, 1.0, 123456.789, f64::MIN_POSITIVE] {
            let xml = float_node("x", value);
            let doc = roxmltree::Document::parse(&xml).unwrap();
            let text = doc.root_element().text().unwrap();
            assert_eq!(text.parse::<f64>().unwrap(), value);
        }
    }

    #[test]
    fn nested_structure() {
        let children = integer_node("imageWidth", 640) + &blob_node("jpegImage", 48, 1000);
        let xml = structure("sphericalRepresentation", &children);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let blob = doc
            .descendants()
            .find(|n| n.has_tag_name("jpegImage"))
            .unwrap();
        assert_eq!(blob.attribute("fileOffset"), Some("48"));
        assert_eq!(blob.attribute("length"), Some("1000"));
        let width = doc
            .descendants()
            .find(|n| n.has_tag_name("imageWidth"))
            .unwrap();
        assert_eq!(width.text(), Some("640"));
    }
}
