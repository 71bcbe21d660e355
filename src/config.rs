//! Runtime configuration for the provider
//!
//! Values come from CLI flags (with environment fallbacks) in `main.rs`;
//! the defaults here match the flag defaults.

use std::time::Duration;

/// Default address of the list service
///
/// The service listens on port 50050 on the same host as the controller.
pub const DEFAULT_LIST_SERVICE_ENDPOINT: &str = "http://localhost:50050";

/// Connection settings for the remote list service
#[derive(Clone, Debug)]
pub struct ListServiceConfig {
    /// Endpoint of the list service (e.g., "http://list-service:50050")
    pub endpoint: String,
    /// Timeout for establishing the channel
    pub connect_timeout: Duration,
    /// Timeout applied to every remote call
    pub request_timeout: Duration,
}

impl Default for ListServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LIST_SERVICE_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ListServiceConfig {
    /// Endpoint as a URI tonic accepts
    ///
    /// Accepts bare `host:port` and `:port` forms and assumes plaintext http.
    pub fn uri(&self) -> String {
        let endpoint = self.endpoint.trim();
        if endpoint.contains("://") {
            return endpoint.to_string();
        }
        if endpoint.starts_with(':') {
            return format!("http://localhost{}", endpoint);
        }
        format!("http://{}", endpoint)
    }
}

/// Requeue timings for the GrpcKind reconciler
#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// How often an in-sync resource is observed again
    pub poll_interval: Duration,
    /// Requeue delay after a create, delete or finalizer change
    pub short_requeue: Duration,
    /// Requeue delay after a failed reconcile
    pub error_backoff: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            short_requeue: Duration::from_secs(5),
            error_backoff: Duration::from_secs(5),
        }
    }
}
