use crate::xml;

/// Rotation of a scan or image as unit quaternion.
#[derive(Clone, Debug, PartialEq)]
pub struct Quaternion {
    /// The scalar part of the quaternion.
    pub w: f64,
    /// The i coefficient of the quaternion.
    pub x: f64,
    /// The j coefficient of the quaternion.
    pub y: f64,
    /// The k coefficient of the quaternion.
    pub z: f64,
}

impl Quaternion {
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// Position of a scan or image in meters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Translation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Rigid body transform that places a scan or an image in the file-level coordinate system.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    /// A unit quaternion, identity by default.
    pub rotation: Quaternion,
    /// The translation in meters, zero by default.
    pub translation: Translation,
}

impl Pose {
    pub fn new(rotation: Quaternion, translation: Translation) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// True if all seven components are finite numbers.
    pub fn is_finite(&self) -> bool {
        let r = &self.rotation;
        let t = &self.translation;
        [r.w, r.x, r.y, r.z, t.x, t.y, t.z]
            .iter()
            .all(|v| v.is_finite())
    }

    pub(crate) fn xml_string(&self, tag_name: &str) -> String {
        let r = &self.rotation;
        let rotation = xml::float_node("w", r.w)
            + &xml::float_node("x", r.x)
            + &xml::float_node("y", r.y)
            + &xml::float_node("z", r.z);
        let t = &self.translation;
        let translation =
            xml::float_node("x", t.x) + &xml::float_node("y", t.y) + &xml::float_node("z", t.z);
        let children =
            xml::structure("rotation", &rotation) + &xml::structure("translation", &translation);
        xml::structure(tag_name, &children)
    }
}
