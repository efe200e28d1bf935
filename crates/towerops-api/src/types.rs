//! Wire types for the TowerOps `/api/v1/` endpoints.
//!
//! Request bodies wrap one resource in a single-key envelope named after its
//! kind (`{"site": {...}}`). Optional attributes use [`Field`] so an omitted
//! attribute, an explicit `null`, and a value stay distinguishable in both
//! directions.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::field::{Field, Sensitive};

// ── Resource kinds ───────────────────────────────────────────────────

/// A resource kind the API exposes under `/api/v1/{COLLECTION}`.
pub trait RemoteKind {
    /// Envelope key for request bodies (`"site"`).
    const ENVELOPE: &'static str;
    /// Collection path segment (`"sites"`).
    const COLLECTION: &'static str;

    /// Body sent on create and update.
    type Payload: Serialize + Send + Sync;
    /// Object returned by create, read and update.
    type Object: serde::de::DeserializeOwned;
}

/// Marker for `/api/v1/sites`.
#[derive(Debug, Clone, Copy)]
pub struct SiteKind;

impl RemoteKind for SiteKind {
    const ENVELOPE: &'static str = "site";
    const COLLECTION: &'static str = "sites";
    type Payload = SitePayload;
    type Object = SiteObject;
}

/// Marker for `/api/v1/devices`.
#[derive(Debug, Clone, Copy)]
pub struct DeviceKind;

impl RemoteKind for DeviceKind {
    const ENVELOPE: &'static str = "device";
    const COLLECTION: &'static str = "devices";
    type Payload = DevicePayload;
    type Object = DeviceObject;
}

// ── Envelope ─────────────────────────────────────────────────────────

/// `{"<key>": <inner>}` with a key chosen at runtime.
pub struct Envelope<'a, T> {
    key: &'static str,
    inner: &'a T,
}

impl<'a, T> Envelope<'a, T> {
    pub fn new(key: &'static str, inner: &'a T) -> Self {
        Self { key, inner }
    }
}

impl<T: Serialize> Serialize for Envelope<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.inner)?;
        map.end()
    }
}

// ── Sites ────────────────────────────────────────────────────────────

/// Site attributes sent on `POST /sites` and `PATCH /sites/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SitePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub location: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmp_community: Field<Sensitive>,
}

/// Site as reported by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Field<String>,
    #[serde(default)]
    pub snmp_community: Field<Sensitive>,
    #[serde(default)]
    pub inserted_at: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Device attributes sent on `POST /devices` and `PATCH /devices/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DevicePayload {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub site_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub organization_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    pub ip_address: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub monitoring_enabled: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmp_enabled: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmp_version: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmp_port: Field<u16>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub check_interval_seconds: Field<u32>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmpv3_security_level: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmpv3_username: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmpv3_auth_protocol: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmpv3_auth_password: Field<Sensitive>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmpv3_priv_protocol: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub snmpv3_priv_password: Field<Sensitive>,
}

/// Device as reported by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceObject {
    pub id: String,
    #[serde(default)]
    pub site_id: Field<String>,
    #[serde(default)]
    pub organization_id: Field<String>,
    #[serde(default)]
    pub name: Field<String>,
    pub ip_address: String,
    #[serde(default)]
    pub description: Field<String>,
    #[serde(default)]
    pub monitoring_enabled: Field<bool>,
    #[serde(default)]
    pub snmp_enabled: Field<bool>,
    #[serde(default)]
    pub snmp_version: Field<String>,
    #[serde(default)]
    pub snmp_port: Field<u16>,
    #[serde(default)]
    pub check_interval_seconds: Field<u32>,
    #[serde(default)]
    pub snmpv3_security_level: Field<String>,
    #[serde(default)]
    pub snmpv3_username: Field<String>,
    #[serde(default)]
    pub snmpv3_auth_protocol: Field<String>,
    #[serde(default)]
    pub snmpv3_auth_password: Field<Sensitive>,
    #[serde(default)]
    pub snmpv3_priv_protocol: Field<String>,
    #[serde(default)]
    pub snmpv3_priv_password: Field<Sensitive>,
    #[serde(default)]
    pub inserted_at: Option<String>,
}
