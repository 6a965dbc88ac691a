use crate::bounds::{min_max, CartesianBounds};
use crate::{Error, Result};

/// Column oriented point data with Cartesian coordinates and RGB colors.
///
/// All six columns always have the same length, one entry per point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointRecords {
    cartesian_x: Vec<f64>,
    cartesian_y: Vec<f64>,
    cartesian_z: Vec<f64>,
    color_red: Vec<f64>,
    color_green: Vec<f64>,
    color_blue: Vec<f64>,
}

impl PointRecords {
    /// Creates a new record set from parallel columns.
    ///
    /// Fails if the columns differ in length, if a coordinate is not finite
    /// or if a color value is negative or not finite.
    pub fn new(
        cartesian_x: Vec<f64>,
        cartesian_y: Vec<f64>,
        cartesian_z: Vec<f64>,
        color_red: Vec<f64>,
        color_green: Vec<f64>,
        color_blue: Vec<f64>,
    ) -> Result<Self> {
        let len = cartesian_x.len();
        let columns = [
            &cartesian_y,
            &cartesian_z,
            &color_red,
            &color_green,
            &color_blue,
        ];
        if columns.iter().any(|c| c.len() != len) {
            Error::invalid("All point columns must have the same length")?
        }
        let coordinates = [&cartesian_x, &cartesian_y, &cartesian_z];
        if coordinates.iter().any(|c| c.iter().any(|v| !v.is_finite())) {
            Error::invalid("Point coordinates must be finite")?
        }
        let colors = [&color_red, &color_green, &color_blue];
        if colors
            .iter()
            .any(|c| c.iter().any(|v| !v.is_finite() || *v < 0.0))
        {
            Error::invalid("Point colors must be finite and not negative")?
        }
        Ok(Self {
            cartesian_x,
            cartesian_y,
            cartesian_z,
            color_red,
            color_green,
            color_blue,
        })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.cartesian_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cartesian_x.is_empty()
    }

    pub fn cartesian_x(&self) -> &[f64] {
        &self.cartesian_x
    }

    pub fn cartesian_y(&self) -> &[f64] {
        &self.cartesian_y
    }

    pub fn cartesian_z(&self) -> &[f64] {
        &self.cartesian_z
    }

    pub fn color_red(&self) -> &[f64] {
        &self.color_red
    }

    pub fn color_green(&self) -> &[f64] {
        &self.color_green
    }

    pub fn color_blue(&self) -> &[f64] {
        &self.color_blue
    }

    /// Columns in the order of the scan prototype.
    pub(crate) fn columns(&self) -> [&[f64]; 6] {
        [
            &self.cartesian_x,
            &self.cartesian_y,
            &self.cartesian_z,
            &self.color_red,
            &self.color_green,
            &self.color_blue,
        ]
    }

    /// Largest value over all three color channels, `None` without points.
    pub fn max_color(&self) -> Option<f64> {
        [&self.color_red, &self.color_green, &self.color_blue]
            .iter()
            .filter_map(|c| min_max(c))
            .map(|(_, max)| max)
            .reduce(f64::max)
    }

    /// Brings 16 bit colors into the 8 bit range.
    ///
    /// If any channel of any point exceeds 255, all values of all three
    /// channels are divided by 255. Otherwise nothing changes.
    /// Returns true if the colors were rescaled.
    pub fn rescale_colors(&mut self) -> bool {
        let rescale = self.max_color().is_some_and(|max| max > 255.0);
        if rescale {
            for channel in [
                &mut self.color_red,
                &mut self.color_green,
                &mut self.color_blue,
            ] {
                channel.iter_mut().for_each(|v| *v /= 255.0);
            }
        }
        rescale
    }

    pub fn cartesian_bounds(&self) -> Option<CartesianBounds> {
        CartesianBounds::from_coordinates(&self.cartesian_x, &self.cartesian_y, &self.cartesian_z)
    }
}
