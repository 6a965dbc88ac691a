use crate::xml;

/// Minimum and maximum values of the Cartesian X, Y and Z coordinates of a scan.
#[derive(Clone, Debug, PartialEq)]
pub struct CartesianBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl CartesianBounds {
    /// Computes the bounds of the given coordinates, returns `None` for empty input.
    pub fn from_coordinates(x: &[f64], y: &[f64], z: &[f64]) -> Option<Self> {
        let (x_min, x_max) = min_max(x)?;
        let (y_min, y_max) = min_max(y)?;
        let (z_min, z_max) = min_max(z)?;
        Some(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z_min,
            z_max,
        })
    }

    pub(crate) fn xml_string(&self) -> String {
        let children = xml::float_node("xMinimum", self.x_min)
            + &xml::float_node("xMaximum", self.x_max)
            + &xml::float_node("yMinimum", self.y_min)
            + &xml::float_node("yMaximum", self.y_max)
            + &xml::float_node("zMinimum", self.z_min)
            + &xml::float_node("zMaximum", self.z_max);
        xml::structure("cartesianBounds", &children)
    }
}

pub(crate) fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v))),
    )
}
