// ── Device domain types ──

use serde::Serialize;
use serde_json::Value;

use super::device_type::DeviceKind;
use super::state::DeviceState;

/// Vendor numeric device id. Pets share the same key space.
pub type DeviceId = i64;

/// Identity and hardware block, present once a detail pass has run
/// (or immediately, for pets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    /// Lowercase product code (`t4`, `d4s`, ...).
    pub type_code: String,
    /// Vendor numeric model code, when reported.
    pub type_number: Option<i64>,
    pub hardware: Option<String>,
    pub firmware: Option<String>,
    pub mac: Option<String>,
    pub serial: Option<String>,
    pub family_id: Option<i64>,
}

/// Live stream descriptor for camera models.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveFeed {
    pub url: Option<String>,
    pub raw: Value,
}

impl LiveFeed {
    pub fn from_payload(raw: Value) -> Self {
        let url = ["url", "liveUrl", "streamUrl"]
            .iter()
            .find_map(|k| raw.get(*k).and_then(Value::as_str))
            .map(str::to_owned);
        Self { url, raw }
    }
}

/// Auxiliary data fetched after the detail pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AuxUpdate {
    Records(Value),
    Statistics(Value),
    PetGraph(Value),
    Media(Value),
    LiveFeed(LiveFeed),
}

/// The registry's canonical record for a device or pet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub info: Option<DeviceInfo>,
    pub state: DeviceState,
    /// Detail payload as returned by the vendor.
    pub raw: Option<Value>,
    pub settings: Option<Value>,

    // Auxiliary blocks
    pub records: Option<Value>,
    pub statistics: Option<Value>,
    pub pet_graph: Option<Value>,
    pub media: Option<Value>,
    pub live_feed: Option<LiveFeed>,
}

impl Device {
    /// A bare entity with no info block.
    pub fn stub(id: DeviceId, kind: DeviceKind) -> Self {
        Self {
            id,
            kind,
            info: None,
            state: DeviceState::empty(kind),
            raw: None,
            settings: None,
            records: None,
            statistics: None,
            pet_graph: None,
            media: None,
            live_feed: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.name.as_str())
    }

    pub fn type_code(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.type_code.as_str())
    }

    pub fn has_info(&self) -> bool {
        self.info.is_some()
    }

    /// Carry over auxiliary blocks from the entity this one replaces.
    pub fn keep_aux_from(&mut self, previous: &Device) {
        if self.records.is_none() {
            self.records.clone_from(&previous.records);
        }
        if self.statistics.is_none() {
            self.statistics.clone_from(&previous.statistics);
        }
        if self.pet_graph.is_none() {
            self.pet_graph.clone_from(&previous.pet_graph);
        }
        if self.media.is_none() {
            self.media.clone_from(&previous.media);
        }
        if self.live_feed.is_none() {
            self.live_feed.clone_from(&previous.live_feed);
        }
    }

    /// Merge one auxiliary block, leaving every other field untouched.
    pub fn apply_aux(&mut self, update: AuxUpdate) {
        match update {
            AuxUpdate::Records(v) => self.records = Some(v),
            AuxUpdate::Statistics(v) => self.statistics = Some(v),
            AuxUpdate::PetGraph(v) => self.pet_graph = Some(v),
            AuxUpdate::Media(v) => self.media = Some(v),
            AuxUpdate::LiveFeed(f) => self.live_feed = Some(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detailed() -> Device {
        let mut d = Device::stub(1, DeviceKind::Litter);
        d.info = Some(DeviceInfo {
            name: "Pura Max".into(),
            type_code: "t4".into(),
            type_number: None,
            hardware: None,
            firmware: Some("1.2".into()),
            mac: None,
            serial: None,
            family_id: Some(3),
        });
        d
    }

    #[test]
    fn aux_merge_keeps_detail_fields() {
        let mut d = detailed();
        let info = d.info.clone();
        d.apply_aux(AuxUpdate::Records(json!([{ "eventType": 5 }])));
        d.apply_aux(AuxUpdate::Statistics(json!({ "times": 4 })));
        assert_eq!(d.info, info);
        assert!(d.records.is_some());
        assert!(d.statistics.is_some());
    }

    #[test]
    fn replacement_keeps_previous_aux() {
        let mut old = detailed();
        old.apply_aux(AuxUpdate::PetGraph(json!([1, 2])));
        let mut fresh = detailed();
        fresh.keep_aux_from(&old);
        assert_eq!(fresh.pet_graph, Some(json!([1, 2])));
    }

    #[test]
    fn live_feed_extracts_url() {
        let feed = LiveFeed::from_payload(json!({ "liveUrl": "rtmp://cam/1" }));
        assert_eq!(feed.url.as_deref(), Some("rtmp://cam/1"));
    }
}
