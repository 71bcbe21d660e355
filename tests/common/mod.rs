//! Shared fixtures for integration tests
//!
//! Provides an in-memory list service served over real gRPC on an ephemeral
//! port, so tests exercise the same client the controller uses.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

use provider_grpc::config::ListServiceConfig;
use provider_grpc::proto::list_service_server::{ListService, ListServiceServer};
use provider_grpc::proto::{
    CreateListReq, CreateListResp, DeleteListReq, DeleteListResp, GetListReq, GetListResp,
    UpdateListItemsReq, UpdateListItemsResp,
};

/// A list as stored by the in-memory service
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoredList {
    pub description: String,
    pub items: Vec<i32>,
}

/// List service keeping lists in a map, answering unknown names the way the
/// real service does ("list <name> does not exist")
#[derive(Clone, Default)]
pub struct InMemoryListService {
    lists: Arc<Mutex<HashMap<String, StoredList>>>,
}

impl InMemoryListService {
    /// Seed a list directly, bypassing the API
    pub fn insert(&self, name: &str, items: &[i32]) {
        self.lists.lock().unwrap().insert(
            name.to_string(),
            StoredList {
                description: String::new(),
                items: items.to_vec(),
            },
        );
    }

    /// Current contents of a list, if it exists
    pub fn get(&self, name: &str) -> Option<StoredList> {
        self.lists.lock().unwrap().get(name).cloned()
    }

    fn missing(name: &str) -> Status {
        Status::unknown(format!("list {name} does not exist"))
    }
}

#[tonic::async_trait]
impl ListService for InMemoryListService {
    async fn get_list(&self, request: Request<GetListReq>) -> Result<Response<GetListResp>, Status> {
        let name = request.into_inner().name;
        let list = self.get(&name).ok_or_else(|| Self::missing(&name))?;
        Ok(Response::new(GetListResp {
            status: "SUCCESS".to_string(),
            items: list.items,
            error: String::new(),
        }))
    }

    async fn create_list(
        &self,
        request: Request<CreateListReq>,
    ) -> Result<Response<CreateListResp>, Status> {
        let req = request.into_inner();
        let mut lists = self.lists.lock().unwrap();
        if lists.contains_key(&req.name) {
            return Err(Status::already_exists(format!(
                "list {} already exists",
                req.name
            )));
        }
        lists.insert(
            req.name,
            StoredList {
                description: req.description,
                items: vec![],
            },
        );
        Ok(Response::new(CreateListResp {
            status: "SUCCESS".to_string(),
        }))
    }

    async fn update_list_items(
        &self,
        request: Request<UpdateListItemsReq>,
    ) -> Result<Response<UpdateListItemsResp>, Status> {
        let req = request.into_inner();
        let mut lists = self.lists.lock().unwrap();
        let list = lists
            .get_mut(&req.name)
            .ok_or_else(|| Self::missing(&req.name))?;
        list.items = req.new_items;
        Ok(Response::new(UpdateListItemsResp {
            status: "SUCCESS".to_string(),
        }))
    }

    async fn delete_list(
        &self,
        request: Request<DeleteListReq>,
    ) -> Result<Response<DeleteListResp>, Status> {
        let name = request.into_inner().name;
        self.lists
            .lock()
            .unwrap()
            .remove(&name)
            .ok_or_else(|| Self::missing(&name))?;
        Ok(Response::new(DeleteListResp {
            status: "SUCCESS".to_string(),
        }))
    }
}

/// Serve `service` on 127.0.0.1 with an ephemeral port
pub async fn start_list_service(service: InMemoryListService) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let _ = tonic::transport::Server::builder()
            .add_service(ListServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await;
    });

    (addr, handle)
}

/// Client configuration pointing at a test server
pub fn config_for(addr: SocketAddr) -> ListServiceConfig {
    ListServiceConfig {
        endpoint: addr.to_string(),
        connect_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
    }
}
