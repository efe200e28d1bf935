// Drift detection: what `apply` would do, without doing it.

use super::{Lifecycle, Managed, desired_settings};
use crate::error::{CoreError, Operation};
use crate::model::Resource;
use crate::validate::validate_and_default;

/// The change an apply would make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing remote yet (or it vanished).
    Create,
    /// In-place update of the listed fields.
    Update { fields: Vec<&'static str> },
    /// Identity-defining fields changed; destroy and recreate.
    Replace { fields: Vec<&'static str> },
    NoOp,
}

/// Compare a declaration with an instance's canonical state.
///
/// Fields the declaration leaves absent are never drift. SNMPv3 fields only
/// count on v3 devices.
pub fn plan<R: Resource>(instance: &Managed<R>, spec: &R::Spec) -> Result<Plan, CoreError> {
    match instance.lifecycle() {
        Lifecycle::Unbound | Lifecycle::Orphaned => {
            validate_and_default::<R>(spec).map_err(|errors| CoreError::Validation {
                kind: R::KIND,
                errors,
            })?;
            Ok(Plan::Create)
        }
        Lifecycle::Bound => {
            let current = instance.current(Operation::Plan)?;
            let desired = match desired_settings(current, spec) {
                Ok(desired) => desired,
                Err(CoreError::RequiresReplacement { fields, .. }) => {
                    return Ok(Plan::Replace { fields });
                }
                Err(e) => return Err(e),
            };

            let fields = R::drift(current.settings(), &desired.inherited);
            if fields.is_empty() { Ok(Plan::NoOp) } else { Ok(Plan::Update { fields }) }
        }
        Lifecycle::Destroyed => Err(instance.invalid(Operation::Plan)),
    }
}
