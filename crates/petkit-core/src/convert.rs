// ── API-to-domain type conversions ──
//
// Bridges raw `petkit_api` account stubs and detail payloads into the
// canonical `petkit_core::model` types. Detail payloads are loosely typed
// JSON, so every field is optional and missing data stays `None`.

use serde_json::Value;

use petkit_api::models::{DeviceStub, PetStub};

use crate::model::device_type::PET_CODE;
use crate::model::state::as_i64;
use crate::model::{Device, DeviceId, DeviceInfo, DeviceKind, DeviceState};

// ── Helpers ────────────────────────────────────────────────────────

/// Read a string-ish field: strings as-is, numbers rendered.
fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match raw.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// The numeric id a detail record reports for itself.
pub(crate) fn detail_id(raw: &Value) -> Option<DeviceId> {
    ["id", "deviceId"]
        .iter()
        .find_map(|k| raw.get(*k).and_then(as_i64))
}

// ── Account stubs ──────────────────────────────────────────────────

/// Placeholder entity for a physical device listed on the account.
pub(crate) fn device_from_stub(stub: &DeviceStub, code: &str) -> Device {
    Device::stub(stub.device_id, DeviceKind::from_type_code(code))
}

/// Pets get their info block straight from the stub.
pub(crate) fn pet_from_stub(stub: &PetStub, family_id: Option<i64>) -> Device {
    let mut pet = Device::stub(stub.pet_id, DeviceKind::Pet);
    pet.info = Some(DeviceInfo {
        name: stub.pet_name.clone(),
        type_code: PET_CODE.into(),
        type_number: None,
        hardware: None,
        firmware: None,
        mac: None,
        serial: None,
        family_id,
    });
    pet.raw = serde_json::to_value(stub).ok();
    pet
}

// ── Detail records ─────────────────────────────────────────────────

/// Full entity from a `{code}/owndevices` record.
///
/// The stub's display name is used when the record carries none.
pub(crate) fn device_from_detail(stub: &DeviceStub, code: &str, raw: Value) -> Device {
    let kind = DeviceKind::from_type_code(code);
    let info = DeviceInfo {
        name: string_field(&raw, &["name"]).unwrap_or_else(|| stub.device_name.clone()),
        type_code: code.to_owned(),
        type_number: raw
            .get("typeCode")
            .and_then(as_i64)
            .or(stub.type_code),
        hardware: string_field(&raw, &["hardware"]),
        firmware: string_field(&raw, &["firmware"]),
        mac: string_field(&raw, &["mac"]),
        serial: string_field(&raw, &["sn", "serial"]),
        family_id: stub.group_id,
    };

    let mut device = Device::stub(stub.device_id, kind);
    device.state = DeviceState::from_payload(kind, &raw);
    device.settings = raw.get("settings").filter(|s| !s.is_null()).cloned();
    device.info = Some(info);
    device.raw = Some(raw);
    device
}
