//! Controller implementation for GrpcKind
//!
//! The reconciler follows the Kubernetes controller pattern: observe the
//! remote list, compare it with the desired state, and issue the one call
//! that closes the gap.

mod grpc_kind;

pub use grpc_kind::{
    error_policy, reconcile, Context, KubeClient, KubeClientImpl, GRPC_KIND_FINALIZER,
};
