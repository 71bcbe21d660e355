//! External resource adapter for GrpcKind
//!
//! Maps a GrpcKind's desired list state onto the remote list service. The
//! adapter answers one question per call: does the remote list exist, and if
//! so, does it hold exactly the desired items? The reconciler decides what to
//! do with the answer.
//!
//! Lifecycle per resource:
//!
//! ```text
//! observe ─┬─ Absent         ─> create
//!          ├─ PresentStale   ─> update
//!          └─ PresentCurrent ─> (nothing)
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::client::{ListServiceApi, ObservedListState};
use crate::crd::GrpcKindParameters;
use crate::Error;

/// Secret material published for a managed resource (key to bytes)
///
/// Lists carry no credentials, so this is always empty today.
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

/// Result of comparing the desired list with the remote one
#[derive(Clone, Debug, PartialEq)]
pub enum ReconciliationOutcome {
    /// No remote list with the desired name
    Absent {
        /// Connection details for the resource
        connection_details: ConnectionDetails,
    },

    /// The remote list exists but its items differ from the desired items
    PresentStale {
        /// Remote state the outcome was derived from
        observed: ObservedListState,
        /// Connection details for the resource
        connection_details: ConnectionDetails,
    },

    /// The remote list exists and holds exactly the desired items
    PresentCurrent {
        /// Remote state the outcome was derived from
        observed: ObservedListState,
        /// Connection details for the resource
        connection_details: ConnectionDetails,
    },
}

impl ReconciliationOutcome {
    /// Outcome for a list that does not exist
    pub fn absent() -> Self {
        Self::Absent {
            connection_details: ConnectionDetails::new(),
        }
    }

    /// Outcome for an existing list, comparing items in order
    pub fn compare(desired: &GrpcKindParameters, observed: ObservedListState) -> Self {
        let connection_details = ConnectionDetails::new();
        if observed.items == desired.list_items {
            Self::PresentCurrent {
                observed,
                connection_details,
            }
        } else {
            Self::PresentStale {
                observed,
                connection_details,
            }
        }
    }

    /// Returns true if the remote list exists
    pub fn exists(&self) -> bool {
        !matches!(self, Self::Absent { .. })
    }

    /// Returns true if the remote list matches the desired state
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::PresentCurrent { .. })
    }

    /// Remote state, if the list exists
    pub fn observed(&self) -> Option<&ObservedListState> {
        match self {
            Self::Absent { .. } => None,
            Self::PresentStale { observed, .. } | Self::PresentCurrent { observed, .. } => {
                Some(observed)
            }
        }
    }

    /// Connection details carried by the outcome
    pub fn connection_details(&self) -> &ConnectionDetails {
        match self {
            Self::Absent { connection_details }
            | Self::PresentStale {
                connection_details, ..
            }
            | Self::PresentCurrent {
                connection_details, ..
            } => connection_details,
        }
    }
}

/// Result of creating a remote list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalCreation {
    /// Status reported by the list service
    pub status: String,
    /// Connection details for the new resource
    pub connection_details: ConnectionDetails,
}

/// Result of updating a remote list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalUpdate {
    /// Status reported by the list service
    pub status: String,
    /// Connection details for the resource
    pub connection_details: ConnectionDetails,
}

/// Operations on the external resource backing a GrpcKind
///
/// This trait allows mocking the adapter in reconciler tests while using
/// [`ListExternal`] in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExternalClient: Send + Sync {
    /// Compare the remote list with the desired state
    async fn observe(&self, desired: &GrpcKindParameters) -> Result<ReconciliationOutcome, Error>;

    /// Create the remote list
    async fn create(&self, desired: &GrpcKindParameters) -> Result<ExternalCreation, Error>;

    /// Replace the remote list's items with the desired items
    async fn update(&self, desired: &GrpcKindParameters) -> Result<ExternalUpdate, Error>;

    /// Delete the remote list
    async fn delete(&self, desired: &GrpcKindParameters) -> Result<(), Error>;
}

/// Adapter that manages GrpcKind lists through a [`ListServiceApi`]
pub struct ListExternal<S> {
    service: S,
}

impl<S: ListServiceApi> ListExternal<S> {
    /// Create an adapter over the given list service
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S: ListServiceApi> ExternalClient for ListExternal<S> {
    async fn observe(&self, desired: &GrpcKindParameters) -> Result<ReconciliationOutcome, Error> {
        let observed = match self.service.get_list(&desired.name).await {
            Ok(observed) => observed,
            Err(e) if e.is_not_found() => {
                debug!(list = %desired.name, "remote list does not exist");
                return Ok(ReconciliationOutcome::absent());
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = ReconciliationOutcome::compare(desired, observed);
        debug!(
            list = %desired.name,
            up_to_date = outcome.is_up_to_date(),
            "observed remote list"
        );
        Ok(outcome)
    }

    async fn create(&self, desired: &GrpcKindParameters) -> Result<ExternalCreation, Error> {
        // The description is never forwarded; lists are always created blank.
        let status = self.service.create_list(&desired.name, "").await?;
        info!(list = %desired.name, status = %status, "created remote list");

        Ok(ExternalCreation {
            status,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn update(&self, desired: &GrpcKindParameters) -> Result<ExternalUpdate, Error> {
        let status = self
            .service
            .update_list_items(&desired.name, &desired.list_items)
            .await?;
        info!(
            list = %desired.name,
            items = desired.list_items.len(),
            status = %status,
            "updated remote list items"
        );

        Ok(ExternalUpdate {
            status,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn delete(&self, desired: &GrpcKindParameters) -> Result<(), Error> {
        let status = self.service.delete_list(&desired.name).await?;
        info!(list = %desired.name, status = %status, "deleted remote list");
        Ok(())
    }
}
