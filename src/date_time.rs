use crate::xml;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds between the Unix epoch and the GPS epoch (00:00 UTC on January 6, 1980).
const GPS_EPOCH_OFFSET: f64 = 315_964_800.0;

/// Leap seconds inserted into UTC since the GPS epoch.
const LEAP_SECONDS: f64 = 18.0;

/// Represents a specific date and time used in E57 files.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct DateTime {
    /// Number of seconds since GPS start epoch (00:00 UTC on January 6, 1980).
    pub gps_time: f64,
    /// True if the a global navigation satellite system device (such as GPS or GLONASS) was used to record the time.
    pub atomic_reference: bool,
}

impl DateTime {
    /// Current system time converted into GPS time.
    pub fn now() -> Self {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self::from_unix_seconds(unix)
    }

    pub fn from_unix_seconds(unix: f64) -> Self {
        Self {
            gps_time: unix - GPS_EPOCH_OFFSET + LEAP_SECONDS,
            atomic_reference: false,
        }
    }

    pub(crate) fn xml_string(&self, tag_name: &str) -> String {
        let children = xml::float_node("dateTimeValue", self.gps_time)
            + &xml::integer_node(
                "isAtomicClockReferenced",
                i64::from(self.atomic_reference),
            );
        xml::structure(tag_name, &children)
    }
}
