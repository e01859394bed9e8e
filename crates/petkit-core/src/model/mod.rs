// ── Domain model ──

pub mod device;
pub mod device_type;
pub mod pet;
pub mod state;
pub mod status;

pub use device::{AuxUpdate, Device, DeviceId, DeviceInfo, LiveFeed};
pub use device_type::{DeviceKind, classify};
pub use pet::Pet;
pub use state::{DeviceState, FeederState, FountainState, LitterState, PurifierState};
pub use status::{DeviceStatus, FeederStatus, FountainStatus, LitterStatus, PurifierStatus};
