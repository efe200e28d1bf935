// ── Settings <-> wire conversions ──
//
// Outbound: normalized settings become payloads carrying only fields the
// caller owns. Inbound: a server object merges over the settings last sent
// or held. The server wins wherever it reports a value; what happens when
// it omits one depends on the field:
//
// - authoritative fields (name, location, description, check interval)
//   become `Null`
// - defaulted fields keep the local value
// - write-only secrets keep the local value, and clear on an explicit `null`
// - the SNMPv3 group is authoritative only on v3 devices

use std::str::FromStr;

use thiserror::Error;
use towerops_api::Field;
use towerops_api::types::{DeviceObject, DevicePayload, SiteObject, SitePayload};

use crate::model::{
    Device, DeviceSettings, Parent, Site, SiteSettings, SnmpV3Settings, SnmpVersion,
};

/// A server-reported value the model cannot represent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected {field} value {value:?} from server")]
pub struct ConvertError {
    pub field: &'static str,
    pub value: String,
}

// ── Helpers ────────────────────────────────────────────────────────

/// Server value if it reported one, otherwise the local value.
fn reported_or<T: Clone>(server: Field<T>, local: &Field<T>) -> Field<T> {
    match server {
        Field::Value(v) => Field::Value(v),
        Field::Absent | Field::Null => local.clone(),
    }
}

fn parse_reported<T: FromStr>(
    field: &'static str,
    raw: Field<String>,
) -> Result<Field<T>, ConvertError> {
    raw.try_map(|v| v.parse::<T>().map_err(|_| ConvertError { field, value: v }))
}

/// A reported SNMPv3 enumeration. On v3 devices the server is
/// authoritative and the value must parse. Below v3 the group is inert, so a
/// value the model cannot represent counts as not reported.
fn v3_choice<T: FromStr + Clone>(
    authoritative: bool,
    field: &'static str,
    server: Field<String>,
    local: &Field<T>,
) -> Result<Field<T>, ConvertError> {
    if authoritative {
        parse_reported(field, server.or_null())
    } else {
        let reported = parse_reported(field, server).unwrap_or_default();
        Ok(reported_or(reported, local))
    }
}

fn wire<T: ToString>(field: &Field<T>) -> Field<String> {
    field.as_ref().map(ToString::to_string)
}

// ── Sites ──────────────────────────────────────────────────────────

pub fn site_payload(settings: &SiteSettings) -> SitePayload {
    SitePayload {
        name: settings.name.clone(),
        location: settings.location.clone(),
        snmp_community: settings.snmp_community.clone(),
    }
}

pub fn site_from_remote(object: SiteObject, local: &SiteSettings) -> Site {
    Site {
        id: object.id.into(),
        settings: SiteSettings {
            name: object.name,
            location: object.location.or_null(),
            snmp_community: object.snmp_community.or(local.snmp_community.clone()),
        },
        inserted_at: object.inserted_at,
    }
}

// ── Devices ────────────────────────────────────────────────────────

pub fn device_payload(settings: &DeviceSettings) -> DevicePayload {
    let (site_id, organization_id) = match &settings.parent {
        Some(Parent::Site(id)) => (Field::Value(id.to_string()), Field::Absent),
        Some(Parent::Organization(id)) => (Field::Absent, Field::Value(id.to_string())),
        None => (Field::Absent, Field::Absent),
    };
    let v3 = &settings.snmpv3;

    DevicePayload {
        site_id,
        organization_id,
        name: settings.name.clone(),
        ip_address: settings.ip_address.clone(),
        description: settings.description.clone(),
        monitoring_enabled: settings.monitoring_enabled.clone(),
        snmp_enabled: settings.snmp_enabled.clone(),
        snmp_version: wire(&settings.snmp_version),
        snmp_port: settings.snmp_port.clone(),
        check_interval_seconds: settings.check_interval_seconds.clone(),
        snmpv3_security_level: wire(&v3.security_level),
        snmpv3_username: v3.username.clone(),
        snmpv3_auth_protocol: wire(&v3.auth_protocol),
        snmpv3_auth_password: v3.auth_password.clone(),
        snmpv3_priv_protocol: wire(&v3.priv_protocol),
        snmpv3_priv_password: v3.priv_password.clone(),
    }
}

/// Resolve the parent reference. A site reference wins if the server
/// reports both; if it reports neither key, the local reference stands.
fn reported_parent(
    site_id: Field<String>,
    organization_id: Field<String>,
    local: Option<&Parent>,
) -> Option<Parent> {
    match (site_id, organization_id) {
        (Field::Value(site), _) => Some(Parent::Site(site.into())),
        (_, Field::Value(org)) => Some(Parent::Organization(org.into())),
        (Field::Absent, Field::Absent) => local.cloned(),
        _ => None,
    }
}

pub fn device_from_remote(
    object: DeviceObject,
    local: &DeviceSettings,
) -> Result<Device, ConvertError> {
    let snmp_version = reported_or(
        parse_reported::<SnmpVersion>("snmp_version", object.snmp_version)?,
        &local.snmp_version,
    );
    let authoritative = snmp_version.value() == Some(&SnmpVersion::V3);
    let have = &local.snmpv3;

    let snmpv3 = SnmpV3Settings {
        security_level: v3_choice(
            authoritative,
            "snmpv3_security_level",
            object.snmpv3_security_level,
            &have.security_level,
        )?,
        username: if authoritative {
            object.snmpv3_username.or_null()
        } else {
            reported_or(object.snmpv3_username, &have.username)
        },
        auth_protocol: v3_choice(
            authoritative,
            "snmpv3_auth_protocol",
            object.snmpv3_auth_protocol,
            &have.auth_protocol,
        )?,
        auth_password: object.snmpv3_auth_password.or(have.auth_password.clone()),
        priv_protocol: v3_choice(
            authoritative,
            "snmpv3_priv_protocol",
            object.snmpv3_priv_protocol,
            &have.priv_protocol,
        )?,
        priv_password: object.snmpv3_priv_password.or(have.priv_password.clone()),
    };

    Ok(Device {
        id: object.id.into(),
        settings: DeviceSettings {
            parent: reported_parent(object.site_id, object.organization_id, local.parent.as_ref()),
            name: object.name.or_null(),
            ip_address: object.ip_address,
            description: object.description.or_null(),
            monitoring_enabled: reported_or(object.monitoring_enabled, &local.monitoring_enabled),
            snmp_enabled: reported_or(object.snmp_enabled, &local.snmp_enabled),
            snmp_version,
            snmp_port: reported_or(object.snmp_port, &local.snmp_port),
            check_interval_seconds: object.check_interval_seconds.or_null(),
            snmpv3,
        },
        inserted_at: object.inserted_at,
    })
}
