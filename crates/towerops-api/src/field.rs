// ── Tri-state wire fields ──
//
// Optional attributes on the TowerOps API have three states: not supplied
// (the server default applies), explicitly cleared (`null`), and set.
// `Option<T>` folds the first two together, so every optional attribute on
// the wire goes through `Field<T>` instead.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Presence-aware value for one optional attribute.
///
/// Decoded struct fields need `#[serde(default)]` so a missing key becomes
/// [`Field::Absent`]; encoded ones need
/// `#[serde(skip_serializing_if = "Field::is_absent")]` so an absent field
/// never reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not supplied by the caller (or not reported by the server).
    Absent,
    /// Explicitly cleared.
    Null,
    /// Present with a value.
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `true` for [`Null`](Self::Null) and [`Value`](Self::Value): the
    /// caller owns this attribute and it goes out in payloads.
    pub fn is_set(&self) -> bool {
        !self.is_absent()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Self::Absent => Field::Absent,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Absent => Field::Absent,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(f(v)),
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Field<U>, E> {
        Ok(match self {
            Self::Absent => Field::Absent,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(f(v)?),
        })
    }

    /// Keep `self` unless it is absent, in which case fall back to `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Absent => other,
            set => set,
        }
    }

    /// Collapse "not reported" into "cleared".
    #[must_use]
    pub fn or_null(self) -> Self {
        self.or(Self::Null)
    }

    /// `None` becomes [`Null`](Self::Null).
    pub fn from_nullable(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from_nullable)
    }
}

// ── Sensitive ───────────────────────────────────────────────────────

/// A write-only secret attribute (SNMP community, SNMPv3 passwords).
///
/// Serializes in clear (the API needs the value) but never prints it.
#[derive(Clone)]
pub struct Sensitive(SecretString);

impl Sensitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sensitive([REDACTED])")
    }
}

impl PartialEq for Sensitive {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Sensitive {}

impl From<&str> for Sensitive {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Sensitive {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for Sensitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Sensitive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        location: Field<String>,
    }

    #[test]
    fn missing_key_is_absent() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert!(probe.location.is_absent());
    }

    #[test]
    fn null_is_distinct_from_absent() {
        let probe: Probe = serde_json::from_str(r#"{"location": null}"#).unwrap();
        assert!(probe.location.is_null());
    }

    #[test]
    fn empty_string_is_a_value() {
        let probe: Probe = serde_json::from_str(r#"{"location": ""}"#).unwrap();
        assert_eq!(probe.location, Field::Value(String::new()));
    }

    #[test]
    fn absent_is_skipped_and_null_is_sent() {
        let absent = serde_json::to_string(&Probe::default()).unwrap();
        assert_eq!(absent, "{}");

        let cleared = serde_json::to_string(&Probe {
            location: Field::Null,
        })
        .unwrap();
        assert_eq!(cleared, r#"{"location":null}"#);
    }

    #[test]
    fn or_only_replaces_absent() {
        assert_eq!(Field::<u16>::Absent.or(Field::Value(161)), Field::Value(161));
        assert_eq!(Field::<u16>::Null.or(Field::Value(161)), Field::Null);
        assert_eq!(Field::Value(1161).or(Field::Value(161)), Field::Value(1161));
    }

    #[test]
    fn sensitive_debug_is_redacted() {
        let secret = Sensitive::new("public");
        assert_eq!(format!("{secret:?}"), "Sensitive([REDACTED])");
        assert_eq!(serde_json::to_string(&secret).unwrap(), r#""public""#);
    }
}
