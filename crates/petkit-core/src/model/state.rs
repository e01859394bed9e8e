// ── Family-specific device state ──
//
// Detail payloads differ across product lines and firmware revisions. Each
// field below is read through one priority list of candidate paths; the
// first path that yields a usable value wins. Every path is tried under the
// payload's `state` object first, then at the payload root. Dotted paths
// descend into nested objects.

use serde::Serialize;
use serde_json::Value;

use super::device_type::DeviceKind;

// ── Priority lists ───────────────────────────────────────────────────

mod fields {
    // Feeder
    pub const FOOD_LEVEL: &[&str] = &["food", "foodLevel", "food1"];
    pub const FOOD_LEVEL_2: &[&str] = &["food2"];
    pub const DESICCANT_DAYS: &[&str] = &["desiccantLeftDays", "desiccant_left_days"];
    pub const FEEDING: &[&str] = &["feeding", "feedState.feeding"];
    pub const BATTERY: &[&str] = &["batteryPower", "battery"];

    // Litter
    pub const WASTE_LEVEL: &[&str] = &["box"];
    pub const LITTER_PERCENT: &[&str] = &["sandPercent", "litterPercent"];
    pub const DEODORANT_LEFT: &[&str] = &["liquid", "deodorantLeftDays"];
    pub const USED_TIMES: &[&str] = &["usedTimes", "times"];
    pub const WORK_MODE: &[&str] = &["workState.workMode", "workMode"];
    pub const BOX_FULL: &[&str] = &["boxFull"];
    pub const SAND_LACK: &[&str] = &["sandLack"];

    // Fountain
    pub const WATER_LEVEL: &[&str] = &["waterLevel", "water_level"];
    pub const FILTER_PERCENT: &[&str] = &["filterPercent", "filter_percent"];
    pub const PUMP_RUNNING: &[&str] = &["runStatus", "pumpRunning"];
    pub const LACK_WARNING: &[&str] = &["lackWarning", "waterLack"];

    // Purifier
    pub const PURIFIER_LIQUID: &[&str] = &["liquid", "liquidLevel"];
    pub const HUMIDITY: &[&str] = &["humidity"];
    pub const TEMPERATURE: &[&str] = &["temp", "temperature"];
    pub const LIGHT: &[&str] = &["lightMode", "settings.lightMode"];

    // Shared
    pub const MODE: &[&str] = &["mode"];
    pub const POWER: &[&str] = &["power", "powerStatus"];
    pub const ERROR: &[&str] = &["errorMsg", "error.msg"];
}

// ── Lookup helpers ───────────────────────────────────────────────────

fn at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |node, key| node.get(key))
        .filter(|v| !v.is_null())
}

/// First non-null value along the priority list.
pub(crate) fn lookup<'a>(payload: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    let state = payload.get("state");
    paths.iter().find_map(|path| {
        state
            .and_then(|s| at_path(s, path))
            .or_else(|| at_path(payload, path))
    })
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i != 0)
            .or_else(|| n.as_f64().map(|f| f.abs() > f64::EPSILON)),
        Value::String(s) => match s.trim() {
            "1" | "true" | "on" => Some(true),
            "0" | "false" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn int(payload: &Value, paths: &[&str]) -> Option<i64> {
    lookup(payload, paths).and_then(as_i64)
}

fn float(payload: &Value, paths: &[&str]) -> Option<f64> {
    lookup(payload, paths).and_then(as_f64)
}

fn flag(payload: &Value, paths: &[&str]) -> Option<bool> {
    lookup(payload, paths).and_then(as_bool)
}

fn text(payload: &Value, paths: &[&str]) -> Option<String> {
    lookup(payload, paths).and_then(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// ── Family states ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeederState {
    pub food_level: Option<i64>,
    /// Second hopper on dual-hopper models.
    pub food_level_2: Option<i64>,
    pub desiccant_left_days: Option<i64>,
    pub feeding: Option<bool>,
    pub battery_power: Option<i64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LitterState {
    pub waste_level: Option<i64>,
    pub litter_percent: Option<i64>,
    pub deodorant_left: Option<i64>,
    pub used_times: Option<i64>,
    /// Current work mode; present only while a cycle is running.
    pub work_mode: Option<i64>,
    pub box_full: Option<bool>,
    pub sand_lack: Option<bool>,
    pub power: Option<bool>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FountainState {
    pub water_level: Option<i64>,
    pub filter_percent: Option<i64>,
    pub mode: Option<i64>,
    pub power: Option<bool>,
    pub pump_running: Option<bool>,
    pub lack_warning: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PurifierState {
    pub mode: Option<i64>,
    pub power: Option<bool>,
    pub liquid: Option<i64>,
    pub humidity: Option<i64>,
    pub temperature: Option<f64>,
    pub light: Option<bool>,
}

/// Typed state, one variant per device family.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DeviceState {
    Feeder(FeederState),
    Litter(LitterState),
    Fountain(FountainState),
    Purifier(PurifierState),
    Pet,
    #[default]
    Unknown,
}

impl DeviceState {
    /// Build the family state from a raw detail payload.
    pub fn from_payload(kind: DeviceKind, payload: &Value) -> Self {
        use fields as f;
        match kind {
            DeviceKind::Feeder => Self::Feeder(FeederState {
                food_level: int(payload, f::FOOD_LEVEL),
                food_level_2: int(payload, f::FOOD_LEVEL_2),
                desiccant_left_days: int(payload, f::DESICCANT_DAYS),
                feeding: flag(payload, f::FEEDING),
                battery_power: int(payload, f::BATTERY),
                error: text(payload, f::ERROR),
            }),
            DeviceKind::Litter => Self::Litter(LitterState {
                waste_level: int(payload, f::WASTE_LEVEL),
                litter_percent: int(payload, f::LITTER_PERCENT),
                deodorant_left: int(payload, f::DEODORANT_LEFT),
                used_times: int(payload, f::USED_TIMES),
                work_mode: int(payload, f::WORK_MODE),
                box_full: flag(payload, f::BOX_FULL),
                sand_lack: flag(payload, f::SAND_LACK),
                power: flag(payload, f::POWER),
                error: text(payload, f::ERROR),
            }),
            DeviceKind::WaterFountain => Self::Fountain(FountainState {
                water_level: int(payload, f::WATER_LEVEL),
                filter_percent: int(payload, f::FILTER_PERCENT),
                mode: int(payload, f::MODE),
                power: flag(payload, f::POWER),
                pump_running: flag(payload, f::PUMP_RUNNING),
                lack_warning: flag(payload, f::LACK_WARNING),
            }),
            DeviceKind::Purifier => Self::Purifier(PurifierState {
                mode: int(payload, f::MODE),
                power: flag(payload, f::POWER),
                liquid: int(payload, f::PURIFIER_LIQUID),
                humidity: int(payload, f::HUMIDITY),
                temperature: float(payload, f::TEMPERATURE),
                light: flag(payload, f::LIGHT),
            }),
            DeviceKind::Pet => Self::Pet,
            DeviceKind::Unknown => Self::Unknown,
        }
    }

    /// Empty state for a family, before any detail pass.
    pub fn empty(kind: DeviceKind) -> Self {
        Self::from_payload(kind, &Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn state_object_wins_over_root() {
        let payload = json!({ "box": 1, "state": { "box": 3 } });
        let DeviceState::Litter(s) = DeviceState::from_payload(DeviceKind::Litter, &payload) else {
            panic!("expected litter state");
        };
        assert_eq!(s.waste_level, Some(3));
    }

    #[test]
    fn priority_order_is_respected() {
        let payload = json!({ "state": { "food1": 2, "foodLevel": 1 } });
        let DeviceState::Feeder(s) = DeviceState::from_payload(DeviceKind::Feeder, &payload) else {
            panic!("expected feeder state");
        };
        assert_eq!(s.food_level, Some(1));
    }

    #[test]
    fn dotted_paths_descend() {
        let payload = json!({ "state": { "workState": { "workMode": 2 } } });
        let DeviceState::Litter(s) = DeviceState::from_payload(DeviceKind::Litter, &payload) else {
            panic!("expected litter state");
        };
        assert_eq!(s.work_mode, Some(2));
    }

    #[test]
    fn loose_types_are_coerced() {
        let payload = json!({ "state": { "power": 1, "waterLevel": "40", "runStatus": "on" } });
        let DeviceState::Fountain(s) =
            DeviceState::from_payload(DeviceKind::WaterFountain, &payload)
        else {
            panic!("expected fountain state");
        };
        assert_eq!(s.power, Some(true));
        assert_eq!(s.water_level, Some(40));
        assert_eq!(s.pump_running, Some(true));
    }

    #[test]
    fn missing_fields_stay_none() {
        assert_eq!(
            DeviceState::empty(DeviceKind::Purifier),
            DeviceState::Purifier(PurifierState::default())
        );
    }
}
