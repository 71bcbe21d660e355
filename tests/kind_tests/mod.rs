//! Integration tests against a kind cluster
//!
//! # Test Organization
//!
//! - `crd_operations`: Stories about creating, reading and deleting GrpcKind
//!   resources through the Kubernetes API
//!
//! - `controller_lifecycle`: Stories about the controller driving an
//!   in-memory list service from GrpcKind resources
//!
//! # Running These Tests
//!
//! ```bash
//! cargo test --test kind -- --ignored --nocapture
//! ```

mod controller_lifecycle;
mod crd_operations;
