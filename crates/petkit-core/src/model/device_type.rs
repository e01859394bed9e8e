// ── Device families and type codes ──
//
// The vendor identifies each product line by a lowercase code that doubles
// as the first URL path segment. Classification maps an account stub onto
// one of those codes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const FEEDER_CODES: &[&str] = &["feeder", "feedermini", "d3", "d4", "d4s", "d4h", "d4sh"];
pub const LITTER_CODES: &[&str] = &["t3", "t4", "t5", "t6"];
pub const FOUNTAIN_CODES: &[&str] = &["w5", "ctw2", "ctw3"];
pub const PURIFIER_CODES: &[&str] = &["k2", "k3"];
/// Models with a camera (media list and live feed).
pub const CAMERA_CODES: &[&str] = &["d4h", "d4sh", "t5", "t6"];

pub const DEFAULT_LITTER_CODE: &str = "t4";
pub const DEFAULT_FEEDER_CODE: &str = "d4";
pub const DEFAULT_FOUNTAIN_CODE: &str = "w5";
pub const DEFAULT_PURIFIER_CODE: &str = "k2";

/// Type code carried by pet entities.
pub const PET_CODE: &str = "pet";

/// Device family.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceKind {
    Feeder,
    Litter,
    WaterFountain,
    Purifier,
    Pet,
    Unknown,
}

impl DeviceKind {
    /// Family of a known type code. Unknown codes map to `Unknown`.
    pub fn from_type_code(code: &str) -> Self {
        let code = code.to_ascii_lowercase();
        let code = code.as_str();
        if FEEDER_CODES.contains(&code) {
            Self::Feeder
        } else if LITTER_CODES.contains(&code) {
            Self::Litter
        } else if FOUNTAIN_CODES.contains(&code) {
            Self::WaterFountain
        } else if PURIFIER_CODES.contains(&code) {
            Self::Purifier
        } else if code == PET_CODE {
            Self::Pet
        } else {
            Self::Unknown
        }
    }

    /// Whether the family has a `{code}/statistic` endpoint.
    pub fn has_statistics(self) -> bool {
        matches!(self, Self::Feeder | Self::Litter | Self::Purifier)
    }

    pub fn is_physical(self) -> bool {
        !matches!(self, Self::Pet | Self::Unknown)
    }
}

/// Whether a type code belongs to a camera model.
pub fn has_camera(code: &str) -> bool {
    CAMERA_CODES.contains(&code)
}

/// Every known physical type code.
pub fn known_codes() -> impl Iterator<Item = &'static str> {
    FEEDER_CODES
        .iter()
        .chain(LITTER_CODES)
        .chain(FOUNTAIN_CODES)
        .chain(PURIFIER_CODES)
        .copied()
}

/// Resolve the type code for an account stub.
///
/// An exact (case-insensitive) match on the reported type wins. Otherwise
/// the display name is checked for family keywords in this order: litter
/// (`litter`, `pura`), feeder (`feeder`, `fresh`), fountain (`fountain`,
/// `water`), purifier (`purifier`, `air`). Anything else is treated as a
/// litter box.
pub fn classify(device_type: &str, name: &str) -> &'static str {
    let ty = device_type.trim().to_ascii_lowercase();
    if let Some(code) = known_codes().find(|c| *c == ty) {
        return code;
    }

    let name = name.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

    if has(&["litter", "pura"]) {
        DEFAULT_LITTER_CODE
    } else if has(&["feeder", "fresh"]) {
        DEFAULT_FEEDER_CODE
    } else if has(&["fountain", "water"]) {
        DEFAULT_FOUNTAIN_CODE
    } else if has(&["purifier", "air"]) {
        DEFAULT_PURIFIER_CODE
    } else {
        DEFAULT_LITTER_CODE
    }
}
