//! Reconciliation engine for TowerOps sites and devices.
//!
//! Sits between a declarative orchestration layer and `towerops-api`:
//!
//! - **Validation** ([`validate`]) turns a declaration (`SiteSpec`,
//!   `DeviceSpec`) into normalized settings, reporting every field error at
//!   once and applying create-time defaults.
//!
//! - **Domain model** ([`model`]) keeps every optional attribute tri-state
//!   (absent, cleared, set) via [`Field`], and models device ownership as a
//!   [`Parent`] sum type.
//!
//! - **[`Reconciler`]** owns the lifecycle of each [`Managed`] instance:
//!   Apply-Create, Refresh, Apply-Update (with recreate-on-missing),
//!   Apply-Delete, plus `apply`, `plan`, `replace` and `import` built on
//!   top of them.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ClientConfig;
pub use error::{CoreError, Operation};
pub use reconcile::{
    Applied, Lifecycle, Managed, Plan, Reconciler, RefreshOutcome, UpdateOutcome, plan,
};
pub use validate::{FieldError, ValidationErrors, validate_and_default};

pub use model::{
    AuthProtocol, Device, DeviceSettings, DeviceSpec, Parent, PrivProtocol, Resource, ResourceId,
    ResourceKind, SecurityLevel, Site, SiteSettings, SiteSpec, SnmpV3Settings, SnmpV3Spec,
    SnmpVersion,
};

pub use towerops_api::{Field, Sensitive};
