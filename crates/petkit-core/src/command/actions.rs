// ── Action table ──
//
// Static mapping from each `Action` to its vendor endpoint, parameter
// builder, and the type codes it is legal for. Builders are pure: they
// read the entity and caller settings and return the flat form map.
// Nested structures are JSON-encoded into a single `kv` field.

use serde_json::{Value, json};

use petkit_api::Params;

use super::Action;
use crate::error::CoreError;
use crate::model::device_type::{FEEDER_CODES, FOUNTAIN_CODES, LITTER_CODES, PURIFIER_CODES};
use crate::model::state::as_i64;
use crate::model::{Device, DeviceState};

/// Builds the form body for one action.
pub(crate) type ParamBuilder = fn(&Device, Option<&Value>) -> Result<Params, CoreError>;

/// Where an action is posted, relative to `{code}/`.
#[derive(Clone, Copy)]
pub(crate) enum Endpoint {
    Fixed(&'static str),
    /// Endpoint name differs by product line.
    PerType(fn(&str) -> &'static str),
}

impl Endpoint {
    pub(crate) fn resolve(self, type_code: &str) -> &'static str {
        match self {
            Self::Fixed(name) => name,
            Self::PerType(f) => f(type_code),
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ActionConfig {
    pub endpoint: Endpoint,
    pub params: ParamBuilder,
    pub supported: &'static [&'static str],
}

const LITTER_AND_PURIFIER: &[&str] = &["t3", "t4", "t5", "t6", "k2", "k3"];
const ALL_PHYSICAL: &[&str] = &[
    "feeder", "feedermini", "d3", "d4", "d4s", "d4h", "d4sh", "t3", "t4", "t5", "t6", "w5",
    "ctw2", "ctw3", "k2", "k3",
];
const DUAL_HOPPER: &[&str] = &["d4s", "d4sh"];
const REPLENISH_CODES: &[&str] = &["d4s", "d4h", "d4sh"];
const CALL_PET_CODES: &[&str] = &["d3"];

// Litter `start_action` values.
const START_CLEAN: i64 = 0;
const START_DUMP: i64 = 1;
const START_DEODORIZE: i64 = 2;
const START_RESET: i64 = 3;
const START_CALIBRATE: i64 = 4;
const LIGHT_ACTION: i64 = 7;
const START_LEVEL: i64 = 9;

/// The configuration for `action`.
pub(crate) fn config(action: Action) -> ActionConfig {
    use Endpoint::{Fixed, PerType};

    let entry = |endpoint: Endpoint, params: ParamBuilder, supported: &'static [&'static str]| {
        ActionConfig {
            endpoint,
            params,
            supported,
        }
    };

    match action {
        Action::UpdateSetting => entry(Fixed("updateSettings"), update_setting, ALL_PHYSICAL),
        Action::Clean => entry(Fixed("controlDevice"), start_clean, LITTER_CODES),
        Action::Dump => entry(Fixed("controlDevice"), start_dump, LITTER_CODES),
        Action::Deodorize => entry(Fixed("controlDevice"), start_deodorize, LITTER_CODES),
        Action::Reset => entry(Fixed("controlDevice"), start_reset, LITTER_CODES),
        Action::Calibrate => entry(Fixed("controlDevice"), start_calibrate, LITTER_CODES),
        Action::Level => entry(Fixed("controlDevice"), start_level, LITTER_CODES),
        Action::Pause => entry(Fixed("controlDevice"), pause, LITTER_CODES),
        Action::Resume => entry(Fixed("controlDevice"), resume, LITTER_CODES),
        Action::Stop => entry(Fixed("controlDevice"), stop, LITTER_CODES),
        Action::LightOn => entry(PerType(light_endpoint), light_on, LITTER_AND_PURIFIER),
        Action::LightOff => entry(PerType(light_endpoint), light_off, LITTER_AND_PURIFIER),
        Action::PowerOn => entry(Fixed("controlDevice"), power_on, LITTER_AND_PURIFIER),
        Action::PowerOff => entry(Fixed("controlDevice"), power_off, LITTER_AND_PURIFIER),
        Action::SetPurifierMode => entry(Fixed("controlDevice"), purifier_mode, PURIFIER_CODES),
        Action::SetFountainMode => entry(Fixed("controlDevice"), fountain_mode, FOUNTAIN_CODES),
        Action::ResetFilter => entry(Fixed("resetFilter"), id_only, FOUNTAIN_CODES),
        Action::Feed => entry(PerType(feed_endpoint), feed, FEEDER_CODES),
        Action::CancelFeed => entry(PerType(cancel_feed_endpoint), cancel_feed, FEEDER_CODES),
        Action::CallPet => entry(Fixed("callPet"), device_id_only, CALL_PET_CODES),
        Action::ResetDesiccant => entry(PerType(desiccant_endpoint), device_id_only, FEEDER_CODES),
        Action::FoodReplenished => entry(Fixed("added"), food_replenished, REPLENISH_CODES),
    }
}

// ── Endpoint resolvers ───────────────────────────────────────────────

/// The first-generation feeders use snake_case endpoint names.
fn is_legacy_feeder(code: &str) -> bool {
    matches!(code, "feeder" | "feedermini")
}

fn feed_endpoint(code: &str) -> &'static str {
    if is_legacy_feeder(code) {
        "save_dailyfeed"
    } else {
        "saveDailyFeed"
    }
}

fn cancel_feed_endpoint(code: &str) -> &'static str {
    if is_legacy_feeder(code) {
        "cancel_realtime_feed"
    } else {
        "cancelRealtimeFeed"
    }
}

fn desiccant_endpoint(code: &str) -> &'static str {
    if is_legacy_feeder(code) {
        "desiccant_reset"
    } else {
        "desiccantReset"
    }
}

fn light_endpoint(code: &str) -> &'static str {
    if PURIFIER_CODES.contains(&code) {
        "updateSettings"
    } else {
        "controlDevice"
    }
}

// ── Param helpers ────────────────────────────────────────────────────

fn params<const N: usize>(pairs: [(&str, String); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

/// A `controlDevice` body: `{id, type, kv}`.
fn control(device: &Device, kind: &str, kv: &Value) -> Params {
    params([
        ("id", device.id.to_string()),
        ("type", kind.to_owned()),
        ("kv", kv.to_string()),
    ])
}

fn settings_kv(device: &Device, kv: &Value) -> Params {
    params([("id", device.id.to_string()), ("kv", kv.to_string())])
}

fn required<'a>(settings: Option<&'a Value>, key: &str) -> Result<&'a Value, CoreError> {
    settings
        .and_then(|s| s.get(key))
        .filter(|v| !v.is_null())
        .ok_or_else(|| CoreError::ValidationFailed {
            message: format!("missing required setting '{key}'"),
        })
}

fn required_i64(settings: Option<&Value>, key: &str) -> Result<i64, CoreError> {
    let value = required(settings, key)?;
    as_i64(value).ok_or_else(|| CoreError::ValidationFailed {
        message: format!("setting '{key}' must be an integer, got {value}"),
    })
}

/// A setting rendered as a form value: strings verbatim, anything else as JSON.
fn required_text(settings: Option<&Value>, key: &str) -> Result<String, CoreError> {
    Ok(match required(settings, key)? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

// ── Builders ─────────────────────────────────────────────────────────

fn id_only(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(params([("id", device.id.to_string())]))
}

fn device_id_only(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(params([("deviceId", device.id.to_string())]))
}

fn update_setting(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    match settings {
        Some(kv @ Value::Object(map)) if !map.is_empty() => Ok(settings_kv(device, kv)),
        _ => Err(CoreError::ValidationFailed {
            message: "update_setting needs a non-empty settings object".into(),
        }),
    }
}

fn start(device: &Device, code: i64) -> Params {
    control(device, "start", &json!({ "start_action": code }))
}

fn start_clean(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(start(device, START_CLEAN))
}

fn start_dump(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(start(device, START_DUMP))
}

fn start_deodorize(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(start(device, START_DEODORIZE))
}

fn start_reset(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(start(device, START_RESET))
}

fn start_calibrate(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(start(device, START_CALIBRATE))
}

fn start_level(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(start(device, START_LEVEL))
}

/// The cycle a pause/resume/stop applies to: an explicit `mode` setting,
/// else the work mode the box currently reports.
fn running_mode(device: &Device, settings: Option<&Value>) -> Result<i64, CoreError> {
    if settings.and_then(|s| s.get("mode")).is_some() {
        return required_i64(settings, "mode");
    }
    match &device.state {
        DeviceState::Litter(s) => s.work_mode,
        _ => None,
    }
    .ok_or_else(|| CoreError::ValidationFailed {
        message: format!("device {} reports no running cycle", device.id),
    })
}

fn pause(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    let mode = running_mode(device, settings)?;
    Ok(control(device, "stop", &json!({ "stop_action": mode })))
}

fn resume(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    let mode = running_mode(device, settings)?;
    Ok(control(device, "continue", &json!({ "continue_action": mode })))
}

fn stop(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    let mode = running_mode(device, settings)?;
    Ok(control(device, "end", &json!({ "end_action": mode })))
}

fn light(device: &Device, on: bool) -> Params {
    if PURIFIER_CODES.contains(&device.type_code().unwrap_or_default()) {
        settings_kv(device, &json!({ "lightMode": i64::from(on) }))
    } else if on {
        control(device, "start", &json!({ "start_action": LIGHT_ACTION }))
    } else {
        control(device, "end", &json!({ "end_action": LIGHT_ACTION }))
    }
}

fn light_on(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(light(device, true))
}

fn light_off(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(light(device, false))
}

fn power_on(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(control(device, "power", &json!({ "power_action": 1 })))
}

fn power_off(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(control(device, "power", &json!({ "power_action": 0 })))
}

fn purifier_mode(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    let mode = required_i64(settings, "mode")?;
    Ok(control(device, "mode", &json!({ "mode_action": mode })))
}

fn fountain_mode(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    let mode = required_i64(settings, "mode")?;
    Ok(control(device, "mode", &json!({ "mode": mode })))
}

/// Manual feed. Dual-hopper models take one amount per hopper.
fn feed(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    let day = required_text(settings, "day")?;
    let mut out = params([
        ("deviceId", device.id.to_string()),
        ("day", day),
        ("time", "-1".to_owned()),
        ("name", String::new()),
    ]);

    if DUAL_HOPPER.contains(&device.type_code().unwrap_or_default()) {
        let amount1 = required_i64(settings, "amount1")?;
        let amount2 = required_i64(settings, "amount2")?;
        out.insert("amount1".into(), amount1.to_string());
        out.insert("amount2".into(), amount2.to_string());
    } else {
        let amount = required_i64(settings, "amount")?;
        out.insert("amount".into(), amount.to_string());
    }
    Ok(out)
}

fn cancel_feed(device: &Device, settings: Option<&Value>) -> Result<Params, CoreError> {
    let day = required_text(settings, "day")?;
    Ok(params([("deviceId", device.id.to_string()), ("day", day)]))
}

fn food_replenished(device: &Device, _: Option<&Value>) -> Result<Params, CoreError> {
    Ok(params([
        ("deviceId", device.id.to_string()),
        ("noRemind", "3".to_owned()),
    ]))
}
