//! gRPC protocol definitions for the remote list service
//!
//! This module contains the generated Protobuf and gRPC code for the
//! `list.v1.ListService` API the controller reconciles against.
//!
//! # Protocol Overview
//!
//! The service tracks named lists of `int32` items:
//!
//! - `GetList`: returns the list status and its items
//! - `CreateList`: creates an empty list with a description
//! - `UpdateListItems`: replaces the items of a list
//! - `DeleteList`: removes the list
//!
//! # Example
//!
//! ```ignore
//! use provider_grpc::proto::list_service_client::ListServiceClient;
//! use provider_grpc::proto::GetListReq;
//!
//! let mut client = ListServiceClient::connect("http://localhost:50050").await?;
//! let resp = client
//!     .get_list(GetListReq { name: "groceries".to_string() })
//!     .await?;
//! println!("{:?}", resp.into_inner().items);
//! ```

#![allow(missing_docs)] // Generated code doesn't have docs

/// Generated protobuf and gRPC code for the list service
pub mod list {
    /// Version 1 of the list service protocol
    pub mod v1 {
        tonic::include_proto!("list.v1");
    }
}

// Re-export commonly used types at the module level for convenience
pub use list::v1::*;
