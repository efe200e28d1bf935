// ── Schema validation and defaults ──
//
// Turns a declaration into normalized settings. Validation never touches the
// network and reports every problem in one pass; defaults are a separate
// step so updates can inherit from observed state instead.

use std::fmt;
use std::str::FromStr;

use strum::VariantNames;
use towerops_api::Field;

use crate::model::{
    AuthProtocol, DeviceSettings, DeviceSpec, Parent, PrivProtocol, Resource, SecurityLevel,
    SiteSettings, SiteSpec, SnmpV3Settings, SnmpVersion,
};

pub const DEFAULT_MONITORING_ENABLED: bool = true;
pub const DEFAULT_SNMP_ENABLED: bool = true;
pub const DEFAULT_SNMP_VERSION: SnmpVersion = SnmpVersion::V2c;
pub const DEFAULT_SNMP_PORT: u16 = 161;

const SITE_NAME_LEN: std::ops::RangeInclusive<usize> = 2..=200;

// ── Errors ───────────────────────────────────────────────────────────

/// One rejected attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found in one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Names of the rejected fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ── Entry point ──────────────────────────────────────────────────────

/// Validate a declaration and apply create-time defaults.
pub fn validate_and_default<R: Resource>(spec: &R::Spec) -> Result<R::Settings, ValidationErrors> {
    let mut settings = R::validate(spec)?;
    R::apply_defaults(&mut settings);
    Ok(settings)
}

// ── Field checks ─────────────────────────────────────────────────────

fn required<'a>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &'a Field<String>,
) -> Option<&'a str> {
    match value {
        Field::Value(v) => Some(v.as_str()),
        Field::Absent | Field::Null => {
            errors.push(field, "is required");
            None
        }
    }
}

/// Parse an enumerated value, recording the allowed set on failure.
fn choice<T>(errors: &mut ValidationErrors, field: &'static str, raw: &Field<String>) -> Field<T>
where
    T: FromStr + VariantNames,
{
    match raw.as_ref().try_map(|v| v.parse::<T>()) {
        Ok(parsed) => parsed,
        Err(_) => {
            errors.push(field, format!("must be one of {}", T::VARIANTS.join(", ")));
            Field::Absent
        }
    }
}

/// Narrow a declared integer into `T` within `min..=max`.
fn ranged<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &Field<i64>,
    min: i64,
    max: i64,
) -> Field<T>
where
    T: TryFrom<i64>,
{
    let narrowed = raw.as_ref().try_map(|&v| {
        if (min..=max).contains(&v) {
            T::try_from(v).map_err(|_| ())
        } else {
            Err(())
        }
    });
    narrowed.unwrap_or_else(|()| {
        errors.push(field, format!("must be between {min} and {max}"));
        Field::Absent
    })
}

// ── Sites ────────────────────────────────────────────────────────────

pub fn validate_site(spec: &SiteSpec) -> Result<SiteSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, "name", &spec.name).unwrap_or_default();
    if !errors.fields().contains(&"name") && !SITE_NAME_LEN.contains(&name.chars().count()) {
        errors.push(
            "name",
            format!(
                "must be between {} and {} characters",
                SITE_NAME_LEN.start(),
                SITE_NAME_LEN.end()
            ),
        );
    }

    errors.into_result(SiteSettings {
        name: name.to_owned(),
        location: spec.location.clone(),
        snmp_community: spec.snmp_community.clone(),
    })
}

// ── Devices ──────────────────────────────────────────────────────────

pub fn validate_device(spec: &DeviceSpec) -> Result<DeviceSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let parent = match (spec.site_id.value(), spec.organization_id.value()) {
        (Some(_), Some(_)) => {
            errors.push(
                "organization_id",
                "conflicts with site_id; a device belongs to a site or an organization, not both",
            );
            None
        }
        (Some(site), None) => Some(Parent::Site(site.as_str().into())),
        (None, Some(org)) => Some(Parent::Organization(org.as_str().into())),
        (None, None) => None,
    };

    let ip_address = required(&mut errors, "ip_address", &spec.ip_address).unwrap_or_default();
    if !errors.fields().contains(&"ip_address") && ip_address.trim().is_empty() {
        errors.push("ip_address", "must not be empty");
    }

    let snmp_version = choice(&mut errors, "snmp_version", &spec.snmp_version);
    let snmp_port = ranged(&mut errors, "snmp_port", &spec.snmp_port, 1, i64::from(u16::MAX));
    let check_interval_seconds = ranged(
        &mut errors,
        "check_interval_seconds",
        &spec.check_interval_seconds,
        1,
        i64::from(u32::MAX),
    );

    let v3 = &spec.snmpv3;
    let snmpv3 = SnmpV3Settings {
        security_level: choice(&mut errors, "snmpv3_security_level", &v3.security_level),
        username: v3.username.clone(),
        auth_protocol: choice(&mut errors, "snmpv3_auth_protocol", &v3.auth_protocol),
        auth_password: v3.auth_password.clone(),
        priv_protocol: choice(&mut errors, "snmpv3_priv_protocol", &v3.priv_protocol),
        priv_password: v3.priv_password.clone(),
    };

    errors.into_result(DeviceSettings {
        parent,
        name: spec.name.clone(),
        ip_address: ip_address.to_owned(),
        description: spec.description.clone(),
        monitoring_enabled: spec.monitoring_enabled.clone(),
        snmp_enabled: spec.snmp_enabled.clone(),
        snmp_version,
        snmp_port,
        check_interval_seconds,
        snmpv3,
    })
}

/// Mark every absent defaulted device field with its default.
pub fn apply_device_defaults(settings: &mut DeviceSettings) {
    fn default_to<T>(field: &mut Field<T>, value: T) {
        if field.is_absent() {
            *field = Field::Value(value);
        }
    }

    default_to(&mut settings.monitoring_enabled, DEFAULT_MONITORING_ENABLED);
    default_to(&mut settings.snmp_enabled, DEFAULT_SNMP_ENABLED);
    default_to(&mut settings.snmp_version, DEFAULT_SNMP_VERSION);
    default_to(&mut settings.snmp_port, DEFAULT_SNMP_PORT);
}
