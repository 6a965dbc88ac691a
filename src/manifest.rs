use crate::error::Converter;
use crate::xml::is_valid_text;
use crate::{Error, Pose, Quaternion, Result, Translation};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One panorama image described by the JSON manifest.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDescriptor {
    /// Location of the image file, relative paths are already resolved.
    pub path: PathBuf,
    /// User-defined name of the image.
    pub name: String,
    /// Width of a pixel in radians.
    pub pixel_width: f64,
    /// Height of a pixel in radians.
    pub pixel_height: f64,
    /// Placement of the panorama in the file coordinate system.
    pub pose: Pose,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub sensor_vendor: Option<String>,
}

#[derive(Deserialize)]
struct ManifestEntry {
    path: PathBuf,
    name: String,
    pos_x: f64,
    pos_y: f64,
    pos_z: f64,
    rot_w: f64,
    rot_x: f64,
    rot_y: f64,
    rot_z: f64,
    #[serde(rename = "pixelWidth")]
    pixel_width: f64,
    #[serde(rename = "pixelHeight")]
    pixel_height: f64,
    #[serde(default)]
    guid: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "sensorVendor")]
    sensor_vendor: Option<String>,
}

impl ManifestEntry {
    fn into_descriptor(self, index: usize, base_dir: &Path) -> Result<ImageDescriptor> {
        let pose = Pose::new(
            Quaternion {
                w: self.rot_w,
                x: self.rot_x,
                y: self.rot_y,
                z: self.rot_z,
            },
            Translation {
                x: self.pos_x,
                y: self.pos_y,
                z: self.pos_z,
            },
        );
        let texts = [
            ("name", Some(&self.name)),
            ("guid", self.guid.as_ref()),
            ("description", self.description.as_ref()),
            ("sensorVendor", self.sensor_vendor.as_ref()),
        ];
        for (key, value) in texts {
            if value.is_some_and(|v| !is_valid_text(v)) {
                Error::manifest(format!(
                    "Image #{index} has a '{key}' with characters that are not allowed in XML"
                ))?
            }
        }
        let name = &self.name;
        if !pose.is_finite() {
            Error::manifest(format!("Image #{index} '{name}' has a non-finite pose"))?
        }
        if pose.rotation.norm() == 0.0 {
            Error::manifest(format!(
                "Image #{index} '{name}' has a rotation quaternion with zero length"
            ))?
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.pixel_width) || !valid(self.pixel_height) {
            Error::manifest(format!(
                "Image #{index} '{name}' has invalid pixel size {}x{}",
                self.pixel_width, self.pixel_height
            ))?
        }

        let path = if self.path.is_relative() {
            base_dir.join(&self.path)
        } else {
            self.path
        };
        Ok(ImageDescriptor {
            path,
            name: self.name,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
            pose,
            guid: self.guid,
            description: self.description,
            sensor_vendor: self.sensor_vendor,
        })
    }
}

/// Parses a JSON manifest and resolves relative image paths against the base directory.
pub fn parse_manifest(json: &str, base_dir: &Path) -> Result<Vec<ImageDescriptor>> {
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(json).manifest_err("Failed to parse JSON manifest")?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_descriptor(index, base_dir))
        .collect()
}

/// Reads and parses a JSON manifest file.
/// Relative image paths are resolved against the directory of the manifest.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ImageDescriptor>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .manifest_err(format!("Unable to read manifest {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let images = parse_manifest(&json, base_dir)?;
    log::debug!("Loaded {} image(s) from {}", images.len(), path.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_IMAGE: &str = r#"[{
        "path": "a.jpg", "pos_x": 1, "pos_y": 2, "pos_z": 3,
        "rot_w": 1, "rot_x": 0, "rot_y": 0, "rot_z": 0,
        "name": "img1", "pixelWidth": 0.001, "pixelHeight": 0.001,
        "comment": "ignored"
    }]"#;

    #[test]
    fn parse_single_entry() {
        let images = parse_manifest(ONE_IMAGE, Path::new("/data")).unwrap();
        assert_eq!(images.len(), 1);
        let img = &images[0];
        assert_eq!(img.path, Path::new("/data/a.jpg"));
        assert_eq!(img.name, "img1");
        assert_eq!(img.pixel_width, 0.001);
        assert_eq!(img.pose.translation, Translation { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(img.pose.rotation, Quaternion::default());
        assert_eq!(img.guid, None);
        assert_eq!(img.sensor_vendor, None);
    }

    #[test]
    fn optional_keys() {
        let json = r#"[{
            "path": "/abs/b.png", "pos_x": 0, "pos_y": 0, "pos_z": 0,
            "rot_w": 0, "rot_x": 0, "rot_y": 0, "rot_z": 1,
            "name": "b", "pixelWidth": 1, "pixelHeight": 2,
            "guid": "{b}", "description": "desc", "sensorVendor": "vendor"
        }]"#;
        let images = parse_manifest(json, Path::new("/data")).unwrap();
        let img = &images[0];
        assert_eq!(img.path, Path::new("/abs/b.png"));
        assert_eq!(img.guid.as_deref(), Some("{b}"));
        assert_eq!(img.description.as_deref(), Some("desc"));
        assert_eq!(img.sensor_vendor.as_deref(), Some("vendor"));
    }

    #[test]
    fn empty_manifest() {
        assert!(parse_manifest("[]", Path::new(".")).unwrap().is_empty());
    }

    #[test]
    fn missing_key_is_named() {
        let json = ONE_IMAGE.replace("\"pixelHeight\": 0.001,", "");
        let err = parse_manifest(&json, Path::new(".")).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("pixelHeight"), "{source}");
    }

    #[test]
    fn invalid_values() {
        let zero_pixel = ONE_IMAGE.replace("\"pixelWidth\": 0.001", "\"pixelWidth\": 0");
        let zero_rotation = ONE_IMAGE.replace("\"rot_w\": 1", "\"rot_w\": 0");
        for json in [zero_pixel, zero_rotation, String::from("{}"), String::from("[")] {
            let res = parse_manifest(&json, Path::new("."));
            assert!(matches!(res, Err(Error::ManifestParse { .. })), "{json}");
        }
    }

    #[test]
    fn control_characters_are_rejected() {
        let bad_name = ONE_IMAGE.replace("\"img1\"", r#""bad\u0001name""#);
        let bad_vendor = ONE_IMAGE
            .replace("\"comment\"", "\"sensorVendor\"")
            .replace("\"ignored\"", r#""vendor\u001f""#);
        for json in [bad_name, bad_vendor] {
            let err = parse_manifest(&json, Path::new(".")).unwrap_err();
            assert!(matches!(err, Error::ManifestParse { .. }), "{json}");
        }
        let tabs = ONE_IMAGE.replace("\"img1\"", r#""north\tside""#);
        assert_eq!(parse_manifest(&tabs, Path::new(".")).unwrap()[0].name, "north\tside");
    }

    #[test]
    fn load_resolves_relative_to_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, ONE_IMAGE).unwrap();
        let images = load_manifest(&path).unwrap();
        assert_eq!(images[0].path, dir.path().join("a.jpg"));

        let missing = load_manifest(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(Error::ManifestParse { .. })));
    }
}
