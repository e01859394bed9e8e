// ── Status projections ──
//
// Flat, fully-populated views of a family state. Absent levels and
// counters read as 0, absent life-remaining values as 100, absent flags
// as false.

use serde::Serialize;

use super::state::{FeederState, FountainState, LitterState, PurifierState};

/// Sentinel for a life-remaining value the device did not report.
pub const FULL_LIFE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct LitterStatus {
    pub waste_level: i64,
    pub litter_percent: i64,
    pub deodorant_left: i64,
    pub used_times: i64,
    pub box_full: bool,
    pub sand_lack: bool,
    pub working: bool,
    pub power: bool,
    pub error: Option<String>,
}

impl From<&LitterState> for LitterStatus {
    fn from(s: &LitterState) -> Self {
        Self {
            waste_level: s.waste_level.unwrap_or(0),
            litter_percent: s.litter_percent.unwrap_or(0),
            deodorant_left: s.deodorant_left.unwrap_or(FULL_LIFE),
            used_times: s.used_times.unwrap_or(0),
            box_full: s.box_full.unwrap_or(false),
            sand_lack: s.sand_lack.unwrap_or(false),
            working: s.work_mode.is_some(),
            power: s.power.unwrap_or(false),
            error: s.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeederStatus {
    pub food_level: i64,
    pub food_level_2: i64,
    pub desiccant_left_days: i64,
    pub feeding: bool,
    pub battery_power: i64,
    pub error: Option<String>,
}

impl From<&FeederState> for FeederStatus {
    fn from(s: &FeederState) -> Self {
        Self {
            food_level: s.food_level.unwrap_or(0),
            food_level_2: s.food_level_2.unwrap_or(0),
            desiccant_left_days: s.desiccant_left_days.unwrap_or(0),
            feeding: s.feeding.unwrap_or(false),
            battery_power: s.battery_power.unwrap_or(0),
            error: s.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FountainStatus {
    pub water_level: i64,
    pub filter_percent: i64,
    pub mode: i64,
    pub power: bool,
    pub pump_running: bool,
    pub lack_warning: bool,
}

impl From<&FountainState> for FountainStatus {
    fn from(s: &FountainState) -> Self {
        Self {
            water_level: s.water_level.unwrap_or(0),
            filter_percent: s.filter_percent.unwrap_or(FULL_LIFE),
            mode: s.mode.unwrap_or(0),
            power: s.power.unwrap_or(false),
            pump_running: s.pump_running.unwrap_or(false),
            lack_warning: s.lack_warning.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurifierStatus {
    pub mode: i64,
    pub power: bool,
    pub liquid: i64,
    pub humidity: i64,
    pub temperature: f64,
    pub light: bool,
}

impl From<&PurifierState> for PurifierStatus {
    fn from(s: &PurifierState) -> Self {
        Self {
            mode: s.mode.unwrap_or(0),
            power: s.power.unwrap_or(false),
            liquid: s.liquid.unwrap_or(FULL_LIFE),
            humidity: s.humidity.unwrap_or(0),
            temperature: s.temperature.unwrap_or(0.0),
            light: s.light.unwrap_or(false),
        }
    }
}

/// Status of any physical device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DeviceStatus {
    Litter(LitterStatus),
    Feeder(FeederStatus),
    Fountain(FountainStatus),
    Purifier(PurifierStatus),
}
