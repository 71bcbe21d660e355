//! GrpcKind Custom Resource Definition
//!
//! A GrpcKind declares a named list of integers that should exist on the
//! remote list service. `spec.forProvider` is the desired state; the
//! observed remote state is reported under `status.atProvider` together with
//! the `Ready` and `Synced` conditions.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, ConditionStatus, DeletionPolicy, Reference, CONDITION_READY};

/// Annotation carrying the name of the remote list
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";

/// Specification for a GrpcKind
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "mygroup.grpc.crossplane.io",
    version = "v1alpha1",
    kind = "GrpcKind",
    plural = "grpckinds",
    status = "GrpcKindStatus",
    namespaced = false,
    category = "crossplane",
    category = "managed",
    category = "grpc",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"EXTERNAL-NAME","type":"string","jsonPath":".metadata.annotations.crossplane\\.io/external-name"}"#,
    printcolumn = r#"{"name":"AGE","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GrpcKindSpec {
    /// Desired state of the remote list
    pub for_provider: GrpcKindParameters,

    /// Whether deleting this resource deletes the remote list
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    /// ProviderConfig this resource is managed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<Reference>,
}

/// Configurable fields of a GrpcKind: the desired list state
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrpcKindParameters {
    /// Name of the remote list; identifies it on the list service
    pub name: String,

    /// Free-form description of the list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Items the remote list should hold, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_items: Vec<i32>,
}

impl GrpcKindParameters {
    /// Validate the desired list state
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::validation(
                "spec.forProvider.name must not be empty",
            ));
        }
        Ok(())
    }
}

/// Observable fields of a GrpcKind
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrpcKindObservation {
    /// Status string last reported by the list service
    #[serde(default)]
    pub status: String,
}

/// Status for a GrpcKind
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrpcKindStatus {
    /// Ready and Synced conditions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Observed state of the remote list
    #[serde(default)]
    pub at_provider: GrpcKindObservation,
}

impl GrpcKindStatus {
    /// Look up a condition by type
    pub fn condition(&self, type_: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }

    /// Replace the condition of the same type
    ///
    /// The existing transition time is kept when nothing but the timestamp
    /// would change.
    pub fn set_condition(&mut self, condition: Condition) {
        if let Some(existing) = self.conditions.iter_mut().find(|c| c.type_ == condition.type_) {
            if !existing.same_state(&condition) {
                *existing = condition;
            }
            return;
        }
        self.conditions.push(condition);
    }

    /// Set a condition and return self for chaining
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.set_condition(condition);
        self
    }

    /// Returns true if the Ready condition is True
    pub fn is_ready(&self) -> bool {
        self.condition(CONDITION_READY)
            .is_some_and(|c| c.status == ConditionStatus::True)
    }
}

impl GrpcKind {
    /// Returns true once Kubernetes has marked this resource for deletion
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Returns true if the given finalizer is present
    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.metadata
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|s| s == finalizer))
    }

    /// Name of the remote list this resource has claimed, if any
    pub fn external_name(&self) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(EXTERNAL_NAME_ANNOTATION))
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Validate the spec, including that `forProvider.name` still names the
    /// list recorded in the external-name annotation
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.spec.for_provider.validate()?;
        match self.external_name() {
            Some(claimed) if claimed != self.spec.for_provider.name => {
                Err(crate::Error::validation(format!(
                    "spec.forProvider.name is immutable: resource manages list {:?}, got {:?}",
                    claimed, self.spec.for_provider.name
                )))
            }
            _ => Ok(()),
        }
    }

    /// Parameters addressing the claimed remote list
    ///
    /// The external-name annotation wins over `forProvider.name`, so the
    /// list that was created is the one that gets deleted.
    pub fn managed_parameters(&self) -> GrpcKindParameters {
        let mut params = self.spec.for_provider.clone();
        if let Some(claimed) = self.external_name() {
            params.name = claimed.to_string();
        }
        params
    }

    /// ProviderConfig reference, falling back to `default`
    pub fn provider_config_ref(&self) -> Reference {
        self.spec.provider_config_ref.clone().unwrap_or_default()
    }

    /// Current status, or an empty one for resources never reconciled
    pub fn status_or_default(&self) -> GrpcKindStatus {
        self.status.clone().unwrap_or_default()
    }
}
