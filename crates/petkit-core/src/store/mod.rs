// ── Device registry ──
//
// In-memory keyed store of device and pet entities, the cached account
// snapshot it was built from, and the typed status projections read from
// it. Population lives in `populate.rs`.

mod collection;
mod populate;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock, watch};

use petkit_api::models::Family;

use crate::error::CoreError;
use crate::model::{
    Device, DeviceId, DeviceKind, DeviceState, DeviceStatus, FeederStatus, FountainStatus,
    LitterStatus, Pet, PurifierStatus,
};

use collection::EntityCollection;

/// Registry of every device and pet on the account.
pub struct DeviceRegistry {
    pub(crate) devices: EntityCollection<Device>,
    /// Family list from the last account fetch. Cleared by `clear_account`.
    account: RwLock<Option<Arc<Vec<Family>>>>,
    /// Serializes population passes.
    populate_lock: Mutex<()>,
    /// Completed population passes.
    generation: AtomicU64,
    last_populated: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        let (last_populated, _) = watch::channel(None);
        Self {
            devices: EntityCollection::new(),
            account: RwLock::new(None),
            populate_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            last_populated,
        }
    }

    // ── Bookkeeping ──────────────────────────────────────────────────

    /// Number of completed population passes.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Bumped on every entity mutation.
    pub fn version(&self) -> u64 {
        self.devices.version()
    }

    pub fn is_populated(&self) -> bool {
        self.generation() > 0
    }

    pub fn last_populated(&self) -> Option<DateTime<Utc>> {
        *self.last_populated.borrow()
    }

    /// Drop the cached account snapshot so the next pass refetches it.
    pub async fn clear_account(&self) {
        *self.account.write().await = None;
    }

    pub async fn account(&self) -> Option<Arc<Vec<Family>>> {
        self.account.read().await.clone()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Every entity that carries an info block (pets included).
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.devices
            .snapshot()
            .iter()
            .filter(|d| d.has_info())
            .cloned()
            .collect()
    }

    /// Every entity, including stubs still waiting for a detail pass.
    pub fn all_entities(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    pub fn device(&self, id: DeviceId) -> Result<Arc<Device>, CoreError> {
        self.devices
            .get(id)
            .ok_or(CoreError::DeviceNotFound { device_id: id })
    }

    /// Subscribe to entity snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Device>>>> {
        self.devices.subscribe()
    }

    pub fn pets(&self) -> Vec<Pet> {
        self.devices
            .snapshot()
            .iter()
            .filter_map(|d| Pet::from_entity(d))
            .collect()
    }

    // ── Status projections ───────────────────────────────────────────

    pub fn litter_status(&self, id: DeviceId) -> Result<LitterStatus, CoreError> {
        let device = self.device(id)?;
        match &device.state {
            DeviceState::Litter(s) => Ok(LitterStatus::from(s)),
            _ => Err(wrong_kind(&device, DeviceKind::Litter)),
        }
    }

    pub fn feeder_status(&self, id: DeviceId) -> Result<FeederStatus, CoreError> {
        let device = self.device(id)?;
        match &device.state {
            DeviceState::Feeder(s) => Ok(FeederStatus::from(s)),
            _ => Err(wrong_kind(&device, DeviceKind::Feeder)),
        }
    }

    pub fn fountain_status(&self, id: DeviceId) -> Result<FountainStatus, CoreError> {
        let device = self.device(id)?;
        match &device.state {
            DeviceState::Fountain(s) => Ok(FountainStatus::from(s)),
            _ => Err(wrong_kind(&device, DeviceKind::WaterFountain)),
        }
    }

    pub fn purifier_status(&self, id: DeviceId) -> Result<PurifierStatus, CoreError> {
        let device = self.device(id)?;
        match &device.state {
            DeviceState::Purifier(s) => Ok(PurifierStatus::from(s)),
            _ => Err(wrong_kind(&device, DeviceKind::Purifier)),
        }
    }

    /// The projection matching the device's family.
    pub fn device_status(&self, id: DeviceId) -> Result<DeviceStatus, CoreError> {
        let device = self.device(id)?;
        Ok(match &device.state {
            DeviceState::Litter(s) => DeviceStatus::Litter(s.into()),
            DeviceState::Feeder(s) => DeviceStatus::Feeder(s.into()),
            DeviceState::Fountain(s) => DeviceStatus::Fountain(s.into()),
            DeviceState::Purifier(s) => DeviceStatus::Purifier(s.into()),
            DeviceState::Pet | DeviceState::Unknown => {
                return Err(CoreError::WrongDeviceKind {
                    device_id: id,
                    expected: "physical device",
                    actual: device.kind.to_string(),
                });
            }
        })
    }
}

fn wrong_kind(device: &Device, expected: DeviceKind) -> CoreError {
    CoreError::WrongDeviceKind {
        device_id: device.id,
        expected: match expected {
            DeviceKind::Feeder => "feeder",
            DeviceKind::Litter => "litter",
            DeviceKind::WaterFountain => "water_fountain",
            DeviceKind::Purifier => "purifier",
            DeviceKind::Pet => "pet",
            DeviceKind::Unknown => "unknown",
        },
        actual: device.kind.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceInfo, LitterState};

    fn litter(id: DeviceId, waste: Option<i64>) -> Device {
        let mut d = Device::stub(id, DeviceKind::Litter);
        d.info = Some(DeviceInfo {
            name: "Box".into(),
            type_code: "t4".into(),
            type_number: None,
            hardware: None,
            firmware: None,
            mac: None,
            serial: None,
            family_id: None,
        });
        d.state = DeviceState::Litter(LitterState {
            waste_level: waste,
            ..LitterState::default()
        });
        d
    }

    #[test]
    fn devices_excludes_stubs() {
        let reg = DeviceRegistry::new();
        reg.devices.upsert(1, litter(1, None));
        reg.devices.upsert(2, Device::stub(2, DeviceKind::Feeder));
        assert_eq!(reg.devices().len(), 1);
        assert_eq!(reg.all_entities().len(), 2);
    }

    #[test]
    fn missing_device_is_not_found() {
        let reg = DeviceRegistry::new();
        assert!(matches!(
            reg.device(99),
            Err(CoreError::DeviceNotFound { device_id: 99 })
        ));
    }

    #[test]
    fn litter_projection_fills_waste_level() {
        let reg = DeviceRegistry::new();
        reg.devices.upsert(1, litter(1, Some(4)));
        reg.devices.upsert(2, litter(2, None));
        assert_eq!(reg.litter_status(1).unwrap().waste_level, 4);
        assert_eq!(reg.litter_status(2).unwrap().waste_level, 0);
    }

    #[test]
    fn wrong_family_is_rejected() {
        let reg = DeviceRegistry::new();
        reg.devices.upsert(1, litter(1, Some(4)));
        let err = reg.feeder_status(1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::WrongDeviceKind { expected: "feeder", .. }
        ));
        assert!(matches!(
            reg.device_status(1).unwrap(),
            DeviceStatus::Litter(_)
        ));
    }
}
