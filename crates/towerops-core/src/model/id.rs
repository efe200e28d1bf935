// ── Identity types ──
//
// Server-assigned identifiers and the device ownership reference.

use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier of a site, device or organization.
///
/// Opaque: the API hands these out and the engine only ever echoes them back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Who owns a device. Identity-defining: changing it means replacing the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parent {
    Site(ResourceId),
    Organization(ResourceId),
}

impl Parent {
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Site(id) | Self::Organization(id) => id,
        }
    }

    /// Wire attribute that carries this reference.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Site(_) => "site_id",
            Self::Organization(_) => "organization_id",
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site(id) => write!(f, "site {id}"),
            Self::Organization(id) => write!(f, "organization {id}"),
        }
    }
}
