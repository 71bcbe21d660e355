//! GrpcKind controller implementation
//!
//! Each pass observes the remote list, then creates, updates or leaves it
//! alone depending on the outcome. Deletion is gated by a finalizer so the
//! remote list is removed (or orphaned) before the GrpcKind goes away.

use std::sync::Arc;

use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};
use tracing::{debug, error, info, instrument, warn};

#[cfg(test)]
use mockall::automock;

use crate::config::ReconcileConfig;
use crate::crd::{
    Condition, DeletionPolicy, GrpcKind, GrpcKindStatus, EXTERNAL_NAME_ANNOTATION,
};
use crate::external::{ExternalClient, ReconciliationOutcome};
use crate::Error;

/// Finalizer guarding deletion of the remote list
pub const GRPC_KIND_FINALIZER: &str = "grpckind.mygroup.grpc.crossplane.io/managed";

/// Field manager used for all patches
const FIELD_MANAGER: &str = "provider-grpc";

/// Trait abstracting Kubernetes client operations for GrpcKind
///
/// This trait allows mocking the Kubernetes client in tests while using
/// the real client in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KubeClient: Send + Sync {
    /// Patch the status of a GrpcKind
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the GrpcKind to update
    /// * `status` - New status to apply
    async fn patch_status(&self, name: &str, status: &GrpcKindStatus) -> Result<(), Error>;

    /// Add a finalizer to a GrpcKind
    ///
    /// Also sets the external-name annotation to `external_name` when the
    /// resource does not carry one yet.
    async fn add_finalizer(
        &self,
        name: &str,
        finalizer: &str,
        external_name: &str,
    ) -> Result<(), Error>;

    /// Remove a finalizer from a GrpcKind
    async fn remove_finalizer(&self, name: &str, finalizer: &str) -> Result<(), Error>;
}

/// Real Kubernetes client implementation
pub struct KubeClientImpl {
    client: Client,
}

impl KubeClientImpl {
    /// Create a new KubeClientImpl wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<GrpcKind> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl KubeClient for KubeClientImpl {
    async fn patch_status(&self, name: &str, status: &GrpcKindStatus) -> Result<(), Error> {
        let status = serde_json::to_value(status)
            .map_err(|e| Error::serialization(format!("status of {}: {}", name, e)))?;
        let status_patch = serde_json::json!({
            "status": status
        });

        self.api()
            .patch_status(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(&status_patch),
            )
            .await?;

        Ok(())
    }

    async fn add_finalizer(
        &self,
        name: &str,
        finalizer: &str,
        external_name: &str,
    ) -> Result<(), Error> {
        let api = self.api();

        let kind = api.get(name).await?;
        let mut finalizers = kind.metadata.finalizers.clone().unwrap_or_default();

        if finalizers.iter().any(|f| f == finalizer) {
            return Ok(());
        }
        finalizers.push(finalizer.to_string());

        let mut patch = serde_json::json!({
            "metadata": {
                "finalizers": finalizers
            }
        });
        if !kind.annotations().contains_key(EXTERNAL_NAME_ANNOTATION) {
            patch["metadata"]["annotations"] =
                serde_json::json!({ EXTERNAL_NAME_ANNOTATION: external_name });
        }

        api.patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await?;

        Ok(())
    }

    async fn remove_finalizer(&self, name: &str, finalizer: &str) -> Result<(), Error> {
        let api = self.api();

        let kind = api.get(name).await?;
        let finalizers: Vec<String> = kind
            .metadata
            .finalizers
            .unwrap_or_default()
            .into_iter()
            .filter(|f| f != finalizer)
            .collect();

        let patch = serde_json::json!({
            "metadata": {
                "finalizers": finalizers
            }
        });

        api.patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await?;

        Ok(())
    }
}

/// Controller context containing shared state and clients
pub struct Context {
    /// Kubernetes client for status and finalizer operations
    pub kube: Arc<dyn KubeClient>,
    /// Adapter for the remote list backing each GrpcKind
    pub external: Arc<dyn ExternalClient>,
    /// Requeue timings
    pub config: ReconcileConfig,
}

impl Context {
    /// Create a new controller context
    pub fn new(client: Client, external: Arc<dyn ExternalClient>, config: ReconcileConfig) -> Self {
        Self {
            kube: Arc::new(KubeClientImpl::new(client)),
            external,
            config,
        }
    }

    /// Create a context for testing with custom mock clients
    #[cfg(test)]
    pub fn for_testing(kube: Arc<dyn KubeClient>, external: Arc<dyn ExternalClient>) -> Self {
        Self {
            kube,
            external,
            config: ReconcileConfig::default(),
        }
    }
}

/// Reconcile a GrpcKind resource
///
/// # Arguments
///
/// * `kind` - The GrpcKind resource to reconcile
/// * `ctx` - Shared controller context
///
/// # Returns
///
/// Returns an `Action` indicating when to requeue the resource, or an error
/// if reconciliation failed.
#[instrument(skip(kind, ctx), fields(grpc_kind = %kind.name_any()))]
pub async fn reconcile(kind: Arc<GrpcKind>, ctx: Arc<Context>) -> Result<Action, Error> {
    let name = kind.name_any();
    info!("reconciling GrpcKind");
    debug!(provider_config = %kind.provider_config_ref().name, "using provider config");

    let mut status = kind.status_or_default();

    if kind.is_deleting() {
        return match finalize(&kind, &ctx, &mut status).await {
            Ok(action) => Ok(action),
            Err(e) => Err(record_failure(&kind, &ctx, status, e).await),
        };
    }

    // Invalid specs need a user edit, not a requeue
    if let Err(e) = kind.validate() {
        warn!(error = %e, "GrpcKind validation failed");
        status.set_condition(Condition::reconcile_error(e.to_string()));
        update_status(&kind, &ctx, &status).await?;
        return Ok(Action::await_change());
    }

    if !kind.has_finalizer(GRPC_KIND_FINALIZER) {
        debug!("adding finalizer");
        ctx.kube
            .add_finalizer(&name, GRPC_KIND_FINALIZER, &kind.spec.for_provider.name)
            .await?;
        return Ok(Action::requeue(ctx.config.short_requeue));
    }

    match sync(&kind, &ctx, &mut status).await {
        Ok(action) => {
            status.set_condition(Condition::reconcile_success());
            update_status(&kind, &ctx, &status).await?;
            Ok(action)
        }
        Err(e) => Err(record_failure(&kind, &ctx, status, e).await),
    }
}

/// Bring the remote list in line with the desired state
async fn sync(kind: &GrpcKind, ctx: &Context, status: &mut GrpcKindStatus) -> Result<Action, Error> {
    let desired = &kind.spec.for_provider;

    match ctx.external.observe(desired).await? {
        ReconciliationOutcome::Absent { .. } => {
            info!(list = %desired.name, "remote list absent, creating");
            status.set_condition(Condition::creating());
            let created = ctx.external.create(desired).await?;
            status.at_provider.status = created.status;
            Ok(Action::requeue(ctx.config.short_requeue))
        }
        ReconciliationOutcome::PresentStale { observed, .. } => {
            info!(
                list = %desired.name,
                remote_items = observed.items.len(),
                desired_items = desired.list_items.len(),
                "remote list out of date, updating"
            );
            record_observation(status, &observed);
            let updated = ctx.external.update(desired).await?;
            status.at_provider.status = updated.status;
            Ok(Action::requeue(ctx.config.poll_interval))
        }
        ReconciliationOutcome::PresentCurrent { observed, .. } => {
            debug!(list = %desired.name, "remote list up to date");
            record_observation(status, &observed);
            Ok(Action::requeue(ctx.config.poll_interval))
        }
    }
}

/// Handle a GrpcKind that is being deleted
async fn finalize(
    kind: &GrpcKind,
    ctx: &Context,
    status: &mut GrpcKindStatus,
) -> Result<Action, Error> {
    let name = kind.name_any();
    let desired = &kind.managed_parameters();

    if !kind.has_finalizer(GRPC_KIND_FINALIZER) {
        return Ok(Action::await_change());
    }

    if kind.spec.deletion_policy == DeletionPolicy::Orphan {
        info!(list = %desired.name, "orphaning remote list");
        ctx.kube.remove_finalizer(&name, GRPC_KIND_FINALIZER).await?;
        return Ok(Action::await_change());
    }

    // Without a list name there is nothing to address remotely
    if let Err(e) = desired.validate() {
        warn!(error = %e, "cannot delete remote list");
        status.set_condition(Condition::reconcile_error(e.to_string()));
        update_status(kind, ctx, status).await?;
        return Ok(Action::await_change());
    }

    let outcome = ctx.external.observe(desired).await?;
    if !outcome.exists() {
        info!(list = %desired.name, "remote list gone, removing finalizer");
        ctx.kube.remove_finalizer(&name, GRPC_KIND_FINALIZER).await?;
        return Ok(Action::await_change());
    }

    status.set_condition(Condition::deleting());
    ctx.external.delete(desired).await?;
    status.set_condition(Condition::reconcile_success());
    update_status(kind, ctx, status).await?;

    // Observe again on the next pass to confirm the list is gone
    Ok(Action::requeue(ctx.config.short_requeue))
}

/// Copy observed remote state into the status
fn record_observation(status: &mut GrpcKindStatus, observed: &crate::client::ObservedListState) {
    status.at_provider.status = observed.status.clone();
    if observed.is_ready() {
        status.set_condition(Condition::available());
    }
}

/// Mark the resource as out of sync and hand the error back
async fn record_failure(
    kind: &GrpcKind,
    ctx: &Context,
    mut status: GrpcKindStatus,
    err: Error,
) -> Error {
    status.set_condition(Condition::reconcile_error(err.to_string()));
    if let Err(patch_err) = update_status(kind, ctx, &status).await {
        warn!(error = %patch_err, "failed to record reconcile error in status");
    }
    err
}

/// Patch the status if it differs from what the resource already carries
async fn update_status(
    kind: &GrpcKind,
    ctx: &Context,
    status: &GrpcKindStatus,
) -> Result<(), Error> {
    if kind.status.as_ref() == Some(status) {
        debug!("status unchanged, skipping patch");
        return Ok(());
    }

    ctx.kube.patch_status(&kind.name_any(), status).await
}

/// Error policy for the controller
///
/// # Arguments
///
/// * `kind` - The GrpcKind that failed reconciliation
/// * `error` - The error that occurred
/// * `ctx` - Shared controller context
///
/// # Returns
///
/// Returns an `Action` to requeue the resource after the configured backoff,
/// or to wait for a change when retrying cannot help.
pub fn error_policy(kind: Arc<GrpcKind>, error: &Error, ctx: Arc<Context>) -> Action {
    error!(
        ?error,
        grpc_kind = %kind.name_any(),
        "reconciliation failed"
    );

    if error.is_retryable() {
        Action::requeue(ctx.config.error_backoff)
    } else {
        Action::await_change()
    }
}
