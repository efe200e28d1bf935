use towerops_api::types::{DeviceKind, DeviceObject, DevicePayload};
use towerops_api::{Field, Sensitive};

use super::resource::{Resource, diff};
use super::{
    AuthProtocol, Parent, PrivProtocol, ResourceId, ResourceKind, SecurityLevel, SnmpVersion,
};
use crate::convert::{self, ConvertError};
use crate::validate::{self, ValidationErrors};

// ── Declaration ──────────────────────────────────────────────────────

/// Declared device. Enumerations and numbers stay raw so the validator can
/// report every bad value at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSpec {
    pub site_id: Field<String>,
    pub organization_id: Field<String>,
    pub name: Field<String>,
    pub ip_address: Field<String>,
    pub description: Field<String>,
    pub monitoring_enabled: Field<bool>,
    pub snmp_enabled: Field<bool>,
    pub snmp_version: Field<String>,
    pub snmp_port: Field<i64>,
    pub check_interval_seconds: Field<i64>,
    pub snmpv3: SnmpV3Spec,
}

/// SNMPv3 credentials as declared. Inert unless `snmp_version` is `"3"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnmpV3Spec {
    pub security_level: Field<String>,
    pub username: Field<String>,
    pub auth_protocol: Field<String>,
    pub auth_password: Field<Sensitive>,
    pub priv_protocol: Field<String>,
    pub priv_password: Field<Sensitive>,
}

impl DeviceSpec {
    /// A device under `site_id` polled at `ip_address`.
    pub fn in_site(site_id: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            site_id: Field::Value(site_id.into()),
            ip_address: Field::Value(ip_address.into()),
            ..Self::default()
        }
    }

    /// A device owned directly by an organization.
    pub fn in_organization(
        organization_id: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: Field::Value(organization_id.into()),
            ip_address: Field::Value(ip_address.into()),
            ..Self::default()
        }
    }
}

// ── Normalized settings ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSettings {
    /// `None` when neither reference was declared; the server decides.
    pub parent: Option<Parent>,
    pub name: Field<String>,
    pub ip_address: String,
    pub description: Field<String>,
    pub monitoring_enabled: Field<bool>,
    pub snmp_enabled: Field<bool>,
    pub snmp_version: Field<SnmpVersion>,
    pub snmp_port: Field<u16>,
    pub check_interval_seconds: Field<u32>,
    pub snmpv3: SnmpV3Settings,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnmpV3Settings {
    pub security_level: Field<SecurityLevel>,
    pub username: Field<String>,
    pub auth_protocol: Field<AuthProtocol>,
    pub auth_password: Field<Sensitive>,
    pub priv_protocol: Field<PrivProtocol>,
    pub priv_password: Field<Sensitive>,
}

impl DeviceSettings {
    /// Whether the SNMPv3 group is live for these settings.
    pub fn uses_snmpv3(&self) -> bool {
        self.snmp_version.value() == Some(&SnmpVersion::V3)
    }
}

/// Canonical state of a bound device.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: ResourceId,
    pub settings: DeviceSettings,
    pub inserted_at: Option<String>,
}

fn inherit_field<T: Clone>(desired: &mut Field<T>, current: &Field<T>) {
    if desired.is_absent() {
        *desired = current.clone();
    }
}

impl Resource for Device {
    type Kind = DeviceKind;
    type Spec = DeviceSpec;
    type Settings = DeviceSettings;

    const KIND: ResourceKind = ResourceKind::Device;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn set_id(&mut self, id: ResourceId) {
        self.id = id;
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn validate(spec: &DeviceSpec) -> Result<DeviceSettings, ValidationErrors> {
        validate::validate_device(spec)
    }

    fn apply_defaults(settings: &mut DeviceSettings) {
        validate::apply_device_defaults(settings);
    }

    fn pin_identity(declared: &mut DeviceSettings, current: &DeviceSettings) {
        if declared.parent.is_none() {
            declared.parent.clone_from(&current.parent);
        }
    }

    fn inherit(desired: &mut DeviceSettings, current: &DeviceSettings) {
        Self::pin_identity(desired, current);
        inherit_field(&mut desired.name, &current.name);
        inherit_field(&mut desired.description, &current.description);
        inherit_field(&mut desired.monitoring_enabled, &current.monitoring_enabled);
        inherit_field(&mut desired.snmp_enabled, &current.snmp_enabled);
        inherit_field(&mut desired.snmp_version, &current.snmp_version);
        inherit_field(&mut desired.snmp_port, &current.snmp_port);
        inherit_field(&mut desired.check_interval_seconds, &current.check_interval_seconds);

        let (want, have) = (&mut desired.snmpv3, &current.snmpv3);
        inherit_field(&mut want.security_level, &have.security_level);
        inherit_field(&mut want.username, &have.username);
        inherit_field(&mut want.auth_protocol, &have.auth_protocol);
        inherit_field(&mut want.auth_password, &have.auth_password);
        inherit_field(&mut want.priv_protocol, &have.priv_protocol);
        inherit_field(&mut want.priv_password, &have.priv_password);
    }

    fn replacement_fields(
        current: &DeviceSettings,
        desired: &DeviceSettings,
    ) -> Vec<&'static str> {
        if current.parent == desired.parent {
            return Vec::new();
        }
        let mut fields: Vec<&'static str> = [&current.parent, &desired.parent]
            .into_iter()
            .flatten()
            .map(Parent::field_name)
            .collect();
        fields.dedup();
        fields
    }

    fn drift(current: &DeviceSettings, desired: &DeviceSettings) -> Vec<&'static str> {
        let mut fields = Vec::new();
        diff(&mut fields, "name", &current.name, &desired.name);
        diff(&mut fields, "ip_address", &current.ip_address, &desired.ip_address);
        diff(&mut fields, "description", &current.description, &desired.description);
        diff(
            &mut fields,
            "monitoring_enabled",
            &current.monitoring_enabled,
            &desired.monitoring_enabled,
        );
        diff(&mut fields, "snmp_enabled", &current.snmp_enabled, &desired.snmp_enabled);
        diff(&mut fields, "snmp_version", &current.snmp_version, &desired.snmp_version);
        diff(&mut fields, "snmp_port", &current.snmp_port, &desired.snmp_port);
        diff(
            &mut fields,
            "check_interval_seconds",
            &current.check_interval_seconds,
            &desired.check_interval_seconds,
        );

        if desired.uses_snmpv3() {
            let (have, want) = (&current.snmpv3, &desired.snmpv3);
            diff(&mut fields, "snmpv3_security_level", &have.security_level, &want.security_level);
            diff(&mut fields, "snmpv3_username", &have.username, &want.username);
            diff(&mut fields, "snmpv3_auth_protocol", &have.auth_protocol, &want.auth_protocol);
            diff(&mut fields, "snmpv3_auth_password", &have.auth_password, &want.auth_password);
            diff(&mut fields, "snmpv3_priv_protocol", &have.priv_protocol, &want.priv_protocol);
            diff(&mut fields, "snmpv3_priv_password", &have.priv_password, &want.priv_password);
        }
        fields
    }

    fn to_payload(settings: &DeviceSettings) -> DevicePayload {
        convert::device_payload(settings)
    }

    fn from_remote(object: DeviceObject, local: &DeviceSettings) -> Result<Self, ConvertError> {
        convert::device_from_remote(object, local)
    }
}
