//! Device registry and command layer between `petkit-api` and consumers.
//!
//! - **[`PetkitClient`]**: the facade. Owns the session and the registry,
//!   populates the registry lazily on first read, and exposes one method per
//!   device action.
//!
//! - **[`DeviceRegistry`]**: every device and pet on the account, keyed by
//!   vendor id, stored in an `EntityCollection` (`DashMap` + `watch`).
//!   Population runs the account, detail and auxiliary phases in order and
//!   prunes entities that left the account.
//!
//! - **[`Action`] / [`PreparedCommand`]**: the static action table. Each
//!   action maps to an endpoint, a pure parameter builder and the type codes
//!   it is legal for; validation never touches the network.
//!
//! - **Domain model** ([`model`]): `Device` with a per-family
//!   [`DeviceState`], typed status projections, and `Pet`.

pub mod client;
pub mod command;
pub mod config;
mod convert;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::PetkitClient;
pub use command::{Action, PreparedCommand};
pub use config::ClientConfig;
pub use error::CoreError;
pub use store::DeviceRegistry;

pub use model::{
    AuxUpdate, Device, DeviceId, DeviceInfo, DeviceKind, DeviceState, DeviceStatus, FeederState,
    FeederStatus, FountainState, FountainStatus, LitterState, LitterStatus, LiveFeed, Pet,
    PurifierState, PurifierStatus, classify,
};
