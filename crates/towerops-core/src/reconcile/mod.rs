// ── Reconciler ──
//
// Drives one resource instance through Unbound -> Bound -> Orphaned ->
// Destroyed. Each operation issues at most one remote call (two on the
// recreate-on-missing path), waits for it, then transitions. The client
// never touches lifecycle state; only this module does.

mod plan;

use std::sync::Arc;

use strum::Display;
use tracing::{debug, info, warn};

use towerops_api::ToweropsClient;
use towerops_api::types::RemoteKind;

use crate::config::ClientConfig;
use crate::convert::ConvertError;
use crate::error::{CoreError, Operation};
use crate::model::{Resource, ResourceId};
use crate::validate::validate_and_default;

pub use plan::{Plan, plan};

// ── Instance state ───────────────────────────────────────────────────

/// Where an instance stands relative to its remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Lifecycle {
    /// Declared, nothing remote yet.
    Unbound,
    /// Bound to a server-assigned id.
    Bound,
    /// The remote object vanished; the next apply recreates it.
    Orphaned,
    /// Deleted. Terminal.
    Destroyed,
}

/// One managed resource instance: its lifecycle plus the canonical state
/// last observed for it.
///
/// Each instance is owned by exactly one caller at a time; the reconciler
/// takes it by `&mut` for every transition.
#[derive(Debug, Clone)]
pub struct Managed<R: Resource> {
    lifecycle: Lifecycle,
    resource: Option<R>,
}

impl<R: Resource> Default for Managed<R> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<R: Resource> Managed<R> {
    pub fn unbound() -> Self {
        Self {
            lifecycle: Lifecycle::Unbound,
            resource: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Canonical state. Kept while orphaned so the stale id stays visible.
    pub fn resource(&self) -> Option<&R> {
        self.resource.as_ref()
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.resource.as_ref().map(Resource::id)
    }

    pub fn is_bound(&self) -> bool {
        self.lifecycle == Lifecycle::Bound
    }

    fn bind(&mut self, resource: R) {
        self.resource = Some(resource);
        self.lifecycle = Lifecycle::Bound;
    }

    fn transition(&self, operation: Operation, allowed: &[Lifecycle]) -> Result<(), CoreError> {
        if allowed.contains(&self.lifecycle) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: Operation) -> CoreError {
        CoreError::InvalidTransition {
            operation,
            kind: R::KIND,
            state: self.lifecycle,
        }
    }

    /// Canonical state of a bound or orphaned instance.
    fn current(&self, operation: Operation) -> Result<&R, CoreError> {
        self.resource.as_ref().ok_or_else(|| self.invalid(operation))
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Result of [`Reconciler::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Canonical state now mirrors the server.
    Refreshed,
    /// The remote object is gone; the instance is now orphaned.
    Orphaned,
}

/// Result of [`Reconciler::apply_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// The object had vanished and was recreated under a new id.
    Recreated { stale_id: ResourceId },
}

/// Result of [`Reconciler::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Created,
    Updated,
    Recreated { stale_id: ResourceId },
    /// No drift; nothing was sent.
    Unchanged,
}

// ── Reconciler ───────────────────────────────────────────────────────

/// Lifecycle driver for sites and devices.
///
/// Holds only the shared client; all per-instance state lives in the
/// [`Managed`] records callers pass in.
#[derive(Debug, Clone)]
pub struct Reconciler {
    client: Arc<ToweropsClient>,
}

impl Reconciler {
    pub fn new(client: ToweropsClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Share one client (and its connection pool) across reconcilers.
    pub fn with_shared(client: Arc<ToweropsClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, CoreError> {
        config.build_client().map(Self::new)
    }

    pub fn client(&self) -> &ToweropsClient {
        &self.client
    }

    // ── Apply-Create ─────────────────────────────────────────────────

    /// Create the remote object for an unbound or orphaned instance.
    ///
    /// Defaults are applied here and only here. On failure the instance
    /// keeps its lifecycle.
    pub async fn apply_create<R: Resource>(
        &self,
        instance: &mut Managed<R>,
        spec: &R::Spec,
    ) -> Result<(), CoreError> {
        instance.transition(Operation::Create, &[Lifecycle::Unbound, Lifecycle::Orphaned])?;

        let settings = validate_and_default::<R>(spec).map_err(|errors| CoreError::Validation {
            kind: R::KIND,
            errors,
        })?;
        let created = self.create_remote::<R>(&settings).await?;

        info!(kind = %R::KIND, id = %created.id(), "created");
        instance.bind(created);
        Ok(())
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Re-read a bound instance. The server is authoritative for every
    /// field except the id the caller already holds.
    pub async fn refresh<R: Resource>(
        &self,
        instance: &mut Managed<R>,
    ) -> Result<RefreshOutcome, CoreError> {
        instance.transition(Operation::Read, &[Lifecycle::Bound])?;
        let current = instance.current(Operation::Read)?;
        let id = current.id().clone();

        match self.client.read::<R::Kind>(id.as_str()).await {
            Ok(object) => {
                let mut refreshed = R::from_remote(object, current.settings())
                    .map_err(|e| decode_error::<R>(Operation::Read, &e))?;
                refreshed.set_id(id);
                debug!(kind = %R::KIND, id = %refreshed.id(), "refreshed");
                instance.bind(refreshed);
                Ok(RefreshOutcome::Refreshed)
            }
            Err(e) if e.is_not_found() => {
                warn!(kind = %R::KIND, id = %id, "remote object vanished; marking orphaned");
                instance.lifecycle = Lifecycle::Orphaned;
                Ok(RefreshOutcome::Orphaned)
            }
            Err(e) => Err(CoreError::from_api(Operation::Read, R::KIND, e)),
        }
    }

    // ── Apply-Update ─────────────────────────────────────────────────

    /// Push a declaration onto a bound instance.
    ///
    /// Only declared fields are sent, plus the pinned parent, so neither
    /// defaults nor server-derived values are overwritten. Absent fields
    /// inherit from canonical state for the merge. A changed parent is
    /// refused with
    /// [`CoreError::RequiresReplacement`]. If the object has vanished it is
    /// recreated from the same payload; if that fails too the instance is
    /// left orphaned and [`CoreError::RecreateFailed`] is returned.
    pub async fn apply_update<R: Resource>(
        &self,
        instance: &mut Managed<R>,
        spec: &R::Spec,
    ) -> Result<UpdateOutcome, CoreError> {
        instance.transition(Operation::Update, &[Lifecycle::Bound])?;
        let current = instance.current(Operation::Update)?;

        let desired = desired_settings(current, spec)?;
        let stale_id = current.id().clone();
        let payload = R::to_payload(&desired.declared);

        match self.client.update::<R::Kind>(stale_id.as_str(), &payload).await {
            Ok(object) => {
                let updated = R::from_remote(object, &desired.inherited)
                    .map_err(|e| decode_error::<R>(Operation::Update, &e))?;
                info!(kind = %R::KIND, id = %updated.id(), "updated");
                instance.bind(updated);
                Ok(UpdateOutcome::Updated)
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    kind = %R::KIND,
                    stale_id = %stale_id,
                    "remote object vanished before update; recreating"
                );
                match self.create_payload::<R>(&payload, &desired.inherited).await {
                    Ok(recreated) => {
                        info!(
                            kind = %R::KIND,
                            id = %recreated.id(),
                            stale_id = %stale_id,
                            "recreated"
                        );
                        instance.bind(recreated);
                        Ok(UpdateOutcome::Recreated { stale_id })
                    }
                    Err(source) => {
                        instance.lifecycle = Lifecycle::Orphaned;
                        Err(CoreError::RecreateFailed {
                            kind: R::KIND,
                            stale_id,
                            source: Box::new(source),
                        })
                    }
                }
            }
            Err(e) => Err(CoreError::from_api(Operation::Update, R::KIND, e)),
        }
    }

    // ── Apply-Delete ─────────────────────────────────────────────────

    /// Delete the remote object. Already gone counts as success. Any other
    /// failure leaves the instance as it was.
    ///
    /// An unbound instance has nothing remote and is simply destroyed.
    pub async fn apply_delete<R: Resource>(
        &self,
        instance: &mut Managed<R>,
    ) -> Result<(), CoreError> {
        instance.transition(
            Operation::Delete,
            &[Lifecycle::Unbound, Lifecycle::Bound, Lifecycle::Orphaned],
        )?;

        if let Some(current) = &instance.resource {
            let id = current.id().clone();
            match self.client.delete::<R::Kind>(id.as_str()).await {
                Ok(()) => info!(kind = %R::KIND, id = %id, "deleted"),
                Err(e) if e.is_not_found() => {
                    info!(kind = %R::KIND, id = %id, "already gone; treating delete as done");
                }
                Err(e) => return Err(CoreError::from_api(Operation::Delete, R::KIND, e)),
            }
        }

        instance.resource = None;
        instance.lifecycle = Lifecycle::Destroyed;
        Ok(())
    }

    // ── Composite operations ─────────────────────────────────────────

    /// Converge an instance on a declaration: create when there is nothing
    /// remote, update when there is drift, and send nothing otherwise.
    pub async fn apply<R: Resource>(
        &self,
        instance: &mut Managed<R>,
        spec: &R::Spec,
    ) -> Result<Applied, CoreError> {
        match plan(instance, spec)? {
            Plan::Create => {
                self.apply_create(instance, spec).await?;
                Ok(Applied::Created)
            }
            Plan::Update { fields } => {
                debug!(kind = %R::KIND, ?fields, "drift detected");
                match self.apply_update(instance, spec).await? {
                    UpdateOutcome::Updated => Ok(Applied::Updated),
                    UpdateOutcome::Recreated { stale_id } => Ok(Applied::Recreated { stale_id }),
                }
            }
            Plan::Replace { fields } => Err(CoreError::RequiresReplacement {
                kind: R::KIND,
                fields,
            }),
            Plan::NoOp => {
                debug!(kind = %R::KIND, id = ?instance.id(), "no drift; nothing to apply");
                Ok(Applied::Unchanged)
            }
        }
    }

    /// Destroy the old instance and create a fresh one from `spec`.
    ///
    /// Used for identity-defining changes such as a device moving to a new
    /// parent. The old record ends destroyed whether or not the create
    /// succeeds.
    pub async fn replace<R: Resource>(
        &self,
        instance: &mut Managed<R>,
        spec: &R::Spec,
    ) -> Result<Managed<R>, CoreError> {
        // Validate first so a bad declaration never costs the old object.
        validate_and_default::<R>(spec).map_err(|errors| CoreError::Validation {
            kind: R::KIND,
            errors,
        })?;

        self.apply_delete(instance).await?;

        let mut fresh = Managed::unbound();
        self.apply_create(&mut fresh, spec).await?;
        Ok(fresh)
    }

    /// Adopt an existing remote object by id.
    pub async fn import<R: Resource>(&self, id: &ResourceId) -> Result<Managed<R>, CoreError> {
        let object = self
            .client
            .read::<R::Kind>(id.as_str())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    CoreError::NotFound {
                        kind: R::KIND,
                        id: id.clone(),
                    }
                } else {
                    CoreError::from_api(Operation::Import, R::KIND, e)
                }
            })?;

        let mut resource = R::from_remote(object, &R::Settings::default())
            .map_err(|e| decode_error::<R>(Operation::Import, &e))?;
        resource.set_id(id.clone());
        info!(kind = %R::KIND, id = %id, "imported");

        let mut instance = Managed::unbound();
        instance.bind(resource);
        Ok(instance)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    async fn create_remote<R: Resource>(&self, settings: &R::Settings) -> Result<R, CoreError> {
        let payload = R::to_payload(settings);
        self.create_payload::<R>(&payload, settings).await
    }

    async fn create_payload<R: Resource>(
        &self,
        payload: &<R::Kind as RemoteKind>::Payload,
        settings: &R::Settings,
    ) -> Result<R, CoreError> {
        let object = self
            .client
            .create::<R::Kind>(payload)
            .await
            .map_err(|e| CoreError::from_api(Operation::Create, R::KIND, e))?;
        R::from_remote(object, settings).map_err(|e| decode_error::<R>(Operation::Create, &e))
    }
}

/// A declaration checked against a bound instance.
struct Desired<S> {
    /// Declared fields plus pinned identity. This is what gets sent.
    declared: S,
    /// `declared` with every absent field filled from canonical state.
    inherited: S,
}

/// Validate a declaration against a bound instance: pin its identity, fill
/// what it leaves absent and refuse identity changes.
fn desired_settings<R: Resource>(
    current: &R,
    spec: &R::Spec,
) -> Result<Desired<R::Settings>, CoreError> {
    let mut declared = R::validate(spec).map_err(|errors| CoreError::Validation {
        kind: R::KIND,
        errors,
    })?;
    R::pin_identity(&mut declared, current.settings());

    let fields = R::replacement_fields(current.settings(), &declared);
    if !fields.is_empty() {
        return Err(CoreError::RequiresReplacement {
            kind: R::KIND,
            fields,
        });
    }

    let mut inherited = declared.clone();
    R::inherit(&mut inherited, current.settings());
    Ok(Desired {
        declared,
        inherited,
    })
}

fn decode_error<R: Resource>(operation: Operation, err: &ConvertError) -> CoreError {
    CoreError::Decode {
        operation,
        kind: R::KIND,
        message: err.to_string(),
    }
}
