use towerops_api::types::{SiteKind, SiteObject, SitePayload};
use towerops_api::{Field, Sensitive};

use super::resource::{Resource, diff};
use super::{ResourceId, ResourceKind};
use crate::convert::{self, ConvertError};
use crate::validate::{self, ValidationErrors};

/// Declared site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSpec {
    pub name: Field<String>,
    pub location: Field<String>,
    pub snmp_community: Field<Sensitive>,
}

impl SiteSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Field::Value(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Field::Value(location.into());
        self
    }

    #[must_use]
    pub fn snmp_community(mut self, community: impl Into<Sensitive>) -> Self {
        self.snmp_community = Field::Value(community.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSettings {
    pub name: String,
    pub location: Field<String>,
    pub snmp_community: Field<Sensitive>,
}

/// Canonical state of a bound site.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: ResourceId,
    pub settings: SiteSettings,
    pub inserted_at: Option<String>,
}

impl Resource for Site {
    type Kind = SiteKind;
    type Spec = SiteSpec;
    type Settings = SiteSettings;

    const KIND: ResourceKind = ResourceKind::Site;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn set_id(&mut self, id: ResourceId) {
        self.id = id;
    }

    fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    fn validate(spec: &SiteSpec) -> Result<SiteSettings, ValidationErrors> {
        validate::validate_site(spec)
    }

    fn apply_defaults(_settings: &mut SiteSettings) {}

    fn inherit(desired: &mut SiteSettings, current: &SiteSettings) {
        desired.location = std::mem::take(&mut desired.location).or(current.location.clone());
        desired.snmp_community =
            std::mem::take(&mut desired.snmp_community).or(current.snmp_community.clone());
    }

    fn replacement_fields(_current: &SiteSettings, _desired: &SiteSettings) -> Vec<&'static str> {
        Vec::new()
    }

    fn drift(current: &SiteSettings, desired: &SiteSettings) -> Vec<&'static str> {
        let mut fields = Vec::new();
        diff(&mut fields, "name", &current.name, &desired.name);
        diff(&mut fields, "location", &current.location, &desired.location);
        diff(&mut fields, "snmp_community", &current.snmp_community, &desired.snmp_community);
        fields
    }

    fn to_payload(settings: &SiteSettings) -> SitePayload {
        convert::site_payload(settings)
    }

    fn from_remote(object: SiteObject, local: &SiteSettings) -> Result<Self, ConvertError> {
        Ok(convert::site_from_remote(object, local))
    }
}
