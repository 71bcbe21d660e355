//! gRPC implementation of the list service client
//!
//! The channel is established once at startup and shared for the lifetime
//! of the controller; each call clones the generated client, which only
//! clones the channel handle. Dropping the last handle closes the connection.

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

use super::{classify, classify_status, ListServiceApi, ObservedListState, RemoteError};
use crate::config::ListServiceConfig;
use crate::proto::list_service_client::ListServiceClient;
use crate::proto::{CreateListReq, DeleteListReq, GetListReq, UpdateListItemsReq};
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::Error;

/// List service client over a plaintext gRPC channel
#[derive(Clone, Debug)]
pub struct GrpcListService {
    client: ListServiceClient<Channel>,
}

impl GrpcListService {
    /// Wrap an already established channel
    pub fn new(channel: Channel) -> Self {
        Self {
            client: ListServiceClient::new(channel),
        }
    }

    /// Connect to the list service once
    pub async fn connect(config: &ListServiceConfig) -> Result<Self, Error> {
        Self::connect_endpoint(&Self::endpoint(config)?).await
    }

    /// Connect to the list service, waiting until it is reachable
    ///
    /// A malformed endpoint fails immediately; only dialing is retried.
    pub async fn connect_with_retry(
        config: &ListServiceConfig,
        retry: &RetryConfig,
    ) -> Result<Self, Error> {
        let endpoint = Self::endpoint(config)?;
        retry_with_backoff(retry, "connect_list_service", || {
            Self::connect_endpoint(&endpoint)
        })
        .await
    }

    fn endpoint(config: &ListServiceConfig) -> Result<Endpoint, Error> {
        let uri = config.uri();
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| Error::connection(format!("invalid endpoint {}: {}", uri, e)))?
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);
        Ok(endpoint)
    }

    async fn connect_endpoint(endpoint: &Endpoint) -> Result<Self, Error> {
        let uri = endpoint.uri();
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| Error::connection(format!("failed to connect to {}: {}", uri, e)))?;

        info!(endpoint = %uri, "Connected to list service");
        Ok(Self::new(channel))
    }
}

#[async_trait]
impl ListServiceApi for GrpcListService {
    async fn get_list(&self, name: &str) -> Result<ObservedListState, RemoteError> {
        let mut client = self.client.clone();
        let resp = client
            .get_list(GetListReq {
                name: name.to_string(),
            })
            .await
            .map_err(|s| classify_status("GetList", name, &s))?
            .into_inner();

        if !resp.error.is_empty() {
            return Err(classify("GetList", name, tonic::Code::Unknown, &resp.error));
        }

        debug!(list = %name, status = %resp.status, items = resp.items.len(), "GetList");
        Ok(ObservedListState {
            status: resp.status,
            items: resp.items,
        })
    }

    async fn create_list(&self, name: &str, description: &str) -> Result<String, RemoteError> {
        let mut client = self.client.clone();
        let resp = client
            .create_list(CreateListReq {
                name: name.to_string(),
                description: description.to_string(),
            })
            .await
            .map_err(|s| classify_status("CreateList", name, &s))?
            .into_inner();

        debug!(list = %name, status = %resp.status, "CreateList");
        Ok(resp.status)
    }

    async fn update_list_items(&self, name: &str, items: &[i32]) -> Result<String, RemoteError> {
        let mut client = self.client.clone();
        let resp = client
            .update_list_items(UpdateListItemsReq {
                name: name.to_string(),
                new_items: items.to_vec(),
            })
            .await
            .map_err(|s| classify_status("UpdateListItems", name, &s))?
            .into_inner();

        debug!(list = %name, status = %resp.status, "UpdateListItems");
        Ok(resp.status)
    }

    async fn delete_list(&self, name: &str) -> Result<String, RemoteError> {
        let mut client = self.client.clone();
        let resp = client
            .delete_list(DeleteListReq {
                name: name.to_string(),
            })
            .await
            .map_err(|s| classify_status("DeleteList", name, &s))?
            .into_inner();

        debug!(list = %name, status = %resp.status, "DeleteList");
        Ok(resp.status)
    }
}
