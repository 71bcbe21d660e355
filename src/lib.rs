//! provider-grpc - Kubernetes controller for lists held by a remote gRPC service
//!
//! Each cluster-scoped `GrpcKind` resource declares a named, ordered list of
//! integers. The controller keeps the list service in line with those
//! declarations: it creates missing lists, pushes item changes, and deletes
//! lists when their resource goes away.
//!
//! # Modules
//!
//! - [`crd`] - The GrpcKind Custom Resource Definition
//! - [`controller`] - Kubernetes controller reconciliation logic
//! - [`external`] - Adapter deciding whether a remote list is absent, stale or current
//! - [`client`] - List service client and remote error classification
//! - [`proto`] - gRPC protocol definitions for the list service
//! - [`config`] - Runtime configuration
//! - [`retry`] - Backoff for establishing the list service channel
//! - [`telemetry`] - Logging setup
//! - [`error`] - Error types for the provider

#![deny(missing_docs)]

pub mod client;
pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod external;
pub mod proto;
pub mod retry;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
