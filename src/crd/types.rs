//! Supporting types for the GrpcKind CRD

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type reporting whether the remote list is usable
pub const CONDITION_READY: &str = "Ready";

/// Condition type reporting the outcome of the last reconcile pass
pub const CONDITION_SYNCED: &str = "Synced";

/// What happens to the remote list when the GrpcKind is deleted
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Delete the remote list
    #[default]
    Delete,
    /// Leave the remote list in place
    Orphan,
}

impl std::fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delete => write!(f, "Delete"),
            Self::Orphan => write!(f, "Orphan"),
        }
    }
}

/// Reference to another cluster-scoped object by name
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Reference {
    /// Name of the referenced object
    pub name: String,
}

impl Default for Reference {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
        }
    }
}

/// Condition status following Kubernetes conventions
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Kubernetes-style condition for status reporting
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Condition {
    /// Type of condition (Ready or Synced)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Machine-readable reason for the condition
    pub reason: String,

    /// Human-readable message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Last time the condition transitioned
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    /// The remote list exists and reports SUCCESS
    pub fn available() -> Self {
        Self::new(CONDITION_READY, ConditionStatus::True, "Available", "")
    }

    /// A create call has been issued for the remote list
    pub fn creating() -> Self {
        Self::new(CONDITION_READY, ConditionStatus::False, "Creating", "")
    }

    /// The remote list is being deleted
    pub fn deleting() -> Self {
        Self::new(CONDITION_READY, ConditionStatus::False, "Deleting", "")
    }

    /// The last reconcile pass succeeded
    pub fn reconcile_success() -> Self {
        Self::new(CONDITION_SYNCED, ConditionStatus::True, "ReconcileSuccess", "")
    }

    /// The last reconcile pass failed
    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Self::new(
            CONDITION_SYNCED,
            ConditionStatus::False,
            "ReconcileError",
            message,
        )
    }

    /// True when both conditions say the same thing, ignoring the timestamp
    pub fn same_state(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}
