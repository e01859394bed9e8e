// Vendor API wire types
//
// Every response is wrapped in `{ "result": ..., "error": {code, msg} }`.
// Fields use `#[serde(default)]` liberally because payloads differ across
// product lines and app versions. Ids arrive as numbers on most endpoints
// and as strings on a few, so they go through `id_from_any`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Flat form parameters for a vendor request.
pub type Params = BTreeMap<String, String>;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// The `error` object of a failed call.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Region directory ─────────────────────────────────────────────────

/// `GET v1/regionservers` result.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionList {
    #[serde(default)]
    pub list: Vec<RegionServer>,
}

/// One data-center entry in the region directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionServer {
    pub id: String,
    pub name: String,
    pub gateway: String,
}

// ── Session ──────────────────────────────────────────────────────────

/// `user/login` and `user/refreshsession` result.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub session: WireSession,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSession {
    pub id: String,
    #[serde(deserialize_with = "string_from_any")]
    pub user_id: String,
    pub expires_in: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

// ── Account ──────────────────────────────────────────────────────────

/// A family grouping from `group/family/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub device_list: Vec<DeviceStub>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub pet_list: Vec<PetStub>,
}

/// Minimal device record listed under a family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStub {
    #[serde(deserialize_with = "id_from_any")]
    pub device_id: i64,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub type_code: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Minimal pet record listed under a family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetStub {
    #[serde(deserialize_with = "id_from_any")]
    pub pet_id: i64,
    #[serde(default)]
    pub pet_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Id helpers ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(i64),
    Str(String),
}

fn id_from_any<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    match NumOrString::deserialize(de)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn opt_id_from_any<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<NumOrString>::deserialize(de)? {
        Some(NumOrString::Num(n)) => Some(n),
        Some(NumOrString::Str(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn string_from_any<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match NumOrString::deserialize(de)? {
        NumOrString::Num(n) => n.to_string(),
        NumOrString::Str(s) => s,
    })
}

/// Entries that fail to parse are dropped with a warning instead of failing
/// the whole family.
fn lenient_list<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(de)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "skipping malformed account entry");
                None
            }
        })
        .collect())
}

/// Detail endpoints return either a bare array or `{ "list": [...] }`.
pub fn into_list(value: serde_json::Value) -> Vec<serde_json::Value> {
    match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("list") {
            Some(serde_json::Value::Array(items)) => items,
            _ => vec![serde_json::Value::Object(map)],
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn family_accepts_string_and_numeric_ids() {
        let family: Family = serde_json::from_value(json!({
            "groupId": "77",
            "deviceList": [
                { "deviceId": 100, "deviceName": "Pura Max", "deviceType": "t4" },
                { "deviceId": "101", "deviceName": "Fresh Element", "deviceType": "d4s" }
            ],
            "petList": [{ "petId": "9", "petName": "Mochi" }]
        }))
        .unwrap();

        assert_eq!(family.group_id, Some(77));
        assert_eq!(family.device_list[1].device_id, 101);
        assert_eq!(family.pet_list[0].pet_id, 9);
    }

    #[test]
    fn malformed_stubs_are_skipped() {
        let family: Family = serde_json::from_value(json!({
            "deviceList": [
                { "deviceName": "No Id" },
                { "deviceId": "abc", "deviceType": "t4" },
                { "deviceId": 7, "deviceType": "w5" }
            ],
            "petList": null
        }))
        .unwrap();

        assert_eq!(family.device_list.len(), 1);
        assert_eq!(family.device_list[0].device_id, 7);
        assert!(family.pet_list.is_empty());
    }

    #[test]
    fn unknown_stub_fields_land_in_extra() {
        let stub: DeviceStub = serde_json::from_value(json!({
            "deviceId": 5,
            "createdAt": "2024-01-01"
        }))
        .unwrap();
        assert!(stub.device_type.is_empty());
        assert!(stub.extra.contains_key("createdAt"));
    }

    #[test]
    fn into_list_unwraps_both_shapes() {
        assert_eq!(into_list(json!([{"id": 1}, {"id": 2}])).len(), 2);
        assert_eq!(into_list(json!({"list": [{"id": 1}]})).len(), 1);
        assert_eq!(into_list(json!({"id": 1})).len(), 1);
        assert!(into_list(json!(null)).is_empty());
    }
}
