//! Custom Resource Definitions for the provider
//!
//! This module contains the GrpcKind managed resource and its supporting types.

mod grpc_kind;
mod types;

pub use grpc_kind::{
    GrpcKind, GrpcKindObservation, GrpcKindParameters, GrpcKindSpec, GrpcKindStatus,
    EXTERNAL_NAME_ANNOTATION,
};
pub use types::{
    Condition, ConditionStatus, DeletionPolicy, Reference, CONDITION_READY, CONDITION_SYNCED,
};
