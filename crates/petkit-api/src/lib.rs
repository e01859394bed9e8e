// petkit-api: Async Rust client for the PetKit mobile-app cloud API

pub mod account;
pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use auth::{Credentials, Endpoints, Session};
pub use client::{ApiClient, RegionBinding};
pub use error::Error;
pub use models::Params;
pub use reqwest::Method;
pub use transport::{RetryPolicy, Transport, TransportConfig};
