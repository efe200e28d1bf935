use std::fmt;

use towerops_api::types::RemoteKind;

use super::{ResourceId, ResourceKind};
use crate::convert::ConvertError;
use crate::validate::ValidationErrors;

/// A resource kind the reconciler can manage.
///
/// Implementors describe how a declaration becomes settings, how settings
/// become a wire payload, and how a server response merges back into
/// canonical state. The reconciler owns everything else.
pub trait Resource: Clone + fmt::Debug + Send + Sync + Sized {
    /// Wire-level kind (paths, envelope key, payload and object types).
    type Kind: RemoteKind;
    /// What the caller declares.
    type Spec: fmt::Debug + Send + Sync;
    /// Validated, normalized declaration. Also the settings half of
    /// canonical state.
    type Settings: Clone + Default + PartialEq + fmt::Debug + Send + Sync;

    const KIND: ResourceKind;

    fn id(&self) -> &ResourceId;

    /// Pin the caller-held identifier after a merge.
    fn set_id(&mut self, id: ResourceId);

    fn settings(&self) -> &Self::Settings;

    /// Check a declaration and normalize it. Collects every field error;
    /// applies no defaults.
    fn validate(spec: &Self::Spec) -> Result<Self::Settings, ValidationErrors>;

    /// Mark every absent defaulted field with its default.
    fn apply_defaults(settings: &mut Self::Settings);

    /// Carry identity the declaration left out over from observed state.
    /// Unlike [`Resource::inherit`] this is what an update actually sends.
    fn pin_identity(_declared: &mut Self::Settings, _current: &Self::Settings) {}

    /// Fill fields the declaration left absent from observed state. Used to
    /// compare and merge, never to build a payload.
    fn inherit(desired: &mut Self::Settings, current: &Self::Settings);

    /// Identity-defining fields that differ between `current` and `desired`.
    fn replacement_fields(current: &Self::Settings, desired: &Self::Settings)
    -> Vec<&'static str>;

    /// Fields that differ between `current` and an inherited `desired`.
    fn drift(current: &Self::Settings, desired: &Self::Settings) -> Vec<&'static str>;

    fn to_payload(settings: &Self::Settings) -> <Self::Kind as RemoteKind>::Payload;

    /// Merge a server response over `local`, the settings last sent or held.
    fn from_remote(
        object: <Self::Kind as RemoteKind>::Object,
        local: &Self::Settings,
    ) -> Result<Self, ConvertError>;
}

/// Record `name` in `out` when the two values differ.
pub(crate) fn diff<T: PartialEq>(out: &mut Vec<&'static str>, name: &'static str, a: &T, b: &T) {
    if a != b {
        out.push(name);
    }
}
