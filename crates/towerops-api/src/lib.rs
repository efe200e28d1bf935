// towerops-api: Async Rust client for the TowerOps site and device API

pub mod client;
pub mod error;
pub mod field;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_BASE_URL, ToweropsClient};
pub use error::Error;
pub use field::{Field, Sensitive};
pub use transport::TransportConfig;
pub use types::{
    DeviceKind, DeviceObject, DevicePayload, Envelope, RemoteKind, SiteKind, SiteObject,
    SitePayload,
};
