//! Remote list service client
//!
//! [`ListServiceApi`] is the boundary between the controller and the list
//! service. Every remote failure is classified here, once, into a
//! [`RemoteError`]: callers match on [`RemoteError::NotFound`] instead of
//! inspecting error text.

mod grpc;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

pub use grpc::GrpcListService;

/// Message fragment the list service uses for unknown lists
pub const NOT_FOUND_MESSAGE: &str = "does not exist";

/// Remote status reported once a list is ready
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// State of a list as reported by the list service
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObservedListState {
    /// Remote status string (e.g., "SUCCESS")
    pub status: String,
    /// Items currently held by the list, in order
    pub items: Vec<i32>,
}

impl ObservedListState {
    /// Returns true when the list service reports the list as ready
    pub fn is_ready(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Classified failure of a remote list service call
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RemoteError {
    /// The named list does not exist on the service
    #[error("list {name} does not exist")]
    NotFound {
        /// Name of the missing list
        name: String,
    },

    /// Any other failure (transport, timeout, server error)
    #[error("{operation} failed ({code:?}): {message}")]
    Call {
        /// Remote operation that failed (e.g., "CreateList")
        operation: &'static str,
        /// gRPC status code
        code: tonic::Code,
        /// Message reported by the server or transport
        message: String,
    },
}

impl RemoteError {
    /// Returns true if the list does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound { .. })
    }
}

/// Classify a failure message returned for `name`
///
/// gRPC `NOT_FOUND` and messages containing "does not exist" both mean the
/// list is absent; the service reports unknown lists the second way.
pub fn classify(
    operation: &'static str,
    name: &str,
    code: tonic::Code,
    message: &str,
) -> RemoteError {
    if code == tonic::Code::NotFound || message.contains(NOT_FOUND_MESSAGE) {
        return RemoteError::NotFound {
            name: name.to_string(),
        };
    }
    RemoteError::Call {
        operation,
        code,
        message: message.to_string(),
    }
}

/// Classify a gRPC status returned for `name`
pub fn classify_status(operation: &'static str, name: &str, status: &tonic::Status) -> RemoteError {
    classify(operation, name, status.code(), status.message())
}

/// Operations offered by the remote list service
///
/// This trait allows mocking the list service in tests while using the
/// gRPC client in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListServiceApi: Send + Sync {
    /// Fetch a list by name
    async fn get_list(&self, name: &str) -> Result<ObservedListState, RemoteError>;

    /// Create a list, returning the remote status
    async fn create_list(&self, name: &str, description: &str) -> Result<String, RemoteError>;

    /// Replace the items of a list, returning the remote status
    async fn update_list_items(&self, name: &str, items: &[i32]) -> Result<String, RemoteError>;

    /// Delete a list, returning the remote status
    async fn delete_list(&self, name: &str) -> Result<String, RemoteError>;
}
