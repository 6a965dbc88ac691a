use crate::xml;

/// Value range of the red, green and blue channels of a scan.
///
/// All channels are stored as 64 bit floats, so the limits are float values as well.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorLimits {
    pub red_min: f64,
    pub red_max: f64,
    pub green_min: f64,
    pub green_max: f64,
    pub blue_min: f64,
    pub blue_max: f64,
}

impl ColorLimits {
    /// Nominal 8 bit range used as long as no stored value exceeds it.
    pub const NOMINAL_MAX: f64 = 255.0;

    /// Limits covering the nominal range of 0 to 255 and all stored values.
    pub fn covering(max_value: f64) -> Self {
        let max = max_value.max(Self::NOMINAL_MAX);
        Self {
            red_min: 0.0,
            red_max: max,
            green_min: 0.0,
            green_max: max,
            blue_min: 0.0,
            blue_max: max,
        }
    }

    pub(crate) fn xml_string(&self) -> String {
        let children = xml::float_node("colorRedMinimum", self.red_min)
            + &xml::float_node("colorRedMaximum", self.red_max)
            + &xml::float_node("colorGreenMinimum", self.green_min)
            + &xml::float_node("colorGreenMaximum", self.green_max)
            + &xml::float_node("colorBlueMinimum", self.blue_min)
            + &xml::float_node("colorBlueMaximum", self.blue_max);
        xml::structure("colorLimits", &children)
    }
}
