use serde::Serialize;
use serde_json::Value;

use super::device::{Device, DeviceId};

/// A pet registered on the account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pet {
    pub id: DeviceId,
    pub name: String,
    pub avatar: Option<String>,
    pub family_id: Option<i64>,
    /// Profile from `pet/petDetail`, or the account stub when the
    /// profile fetch failed.
    pub profile: Option<Value>,
}

impl Pet {
    /// Build from a pet entity. Returns `None` for physical devices.
    pub fn from_entity(device: &Device) -> Option<Self> {
        if device.kind != super::DeviceKind::Pet {
            return None;
        }
        let info = device.info.as_ref()?;
        let avatar = device
            .raw
            .as_ref()
            .and_then(|r| r.get("avatar"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        Some(Self {
            id: device.id,
            name: info.name.clone(),
            avatar,
            family_id: info.family_id,
            profile: device.raw.clone(),
        })
    }
}
