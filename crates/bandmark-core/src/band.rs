//! IELTS band scores and raw-score conversion.
//!
//! The conversion table is the standard reading/listening one: an ordered list
//! of (threshold, band) pairs scanned from the top, where a raw score maps to
//! the band of the highest threshold it reaches.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An IELTS band score: 1.0 to 9.0 in half-band steps.
///
/// Stored as integer tenths so equality and ordering are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Band(u8);

impl Band {
    /// The lowest band, 1.0.
    pub const MIN: Band = Band(10);
    /// The highest band, 9.0.
    pub const MAX: Band = Band(90);

    /// The band value as a float (e.g. 7.5).
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    const fn from_tenths(tenths: u8) -> Band {
        Band(tenths)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

impl TryFrom<f64> for Band {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let tenths = (value * 10.0).round();
        if !(10.0..=90.0).contains(&tenths) {
            return Err(format!("band {value} outside 1.0..=9.0"));
        }
        if (tenths - value * 10.0).abs() > 1e-9 || tenths as u64 % 5 != 0 {
            return Err(format!("band {value} is not a half-band step"));
        }
        Ok(Band(tenths as u8))
    }
}

impl Serialize for Band {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Band {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Band::try_from(value).map_err(D::Error::custom)
    }
}

/// The raw-score conversion table, highest threshold first.
///
/// A raw score maps to the band of the first entry whose threshold it meets.
const BAND_TABLE: &[(i64, Band)] = &[
    (39, Band::from_tenths(90)),
    (37, Band::from_tenths(85)),
    (35, Band::from_tenths(80)),
    (33, Band::from_tenths(75)),
    (30, Band::from_tenths(70)),
    (27, Band::from_tenths(65)),
    (23, Band::from_tenths(60)),
    (19, Band::from_tenths(55)),
    (15, Band::from_tenths(50)),
    (13, Band::from_tenths(45)),
    (10, Band::from_tenths(40)),
    (8, Band::from_tenths(35)),
    (6, Band::from_tenths(30)),
    (4, Band::from_tenths(25)),
    (2, Band::from_tenths(20)),
    (1, Band::from_tenths(15)),
    (0, Band::from_tenths(10)),
];

/// Convert a raw correct-answer count to a band score.
///
/// Total over all integers: negative scores clamp to band 1.0 and anything at
/// or above the top threshold clamps to band 9.0.
pub fn band_for_raw(raw: i64) -> Band {
    BAND_TABLE
        .iter()
        .find(|(threshold, _)| raw >= *threshold)
        .map(|(_, band)| *band)
        .unwrap_or(Band::MIN)
}
