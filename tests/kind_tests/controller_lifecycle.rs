//! Integration tests for the controller lifecycle
//!
//! These tests run the real controller against a kind cluster and an
//! in-memory list service, and follow a GrpcKind from creation to deletion.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::Client;

use provider_grpc::client::GrpcListService;
use provider_grpc::config::ReconcileConfig;
use provider_grpc::controller::{error_policy, reconcile, Context};
use provider_grpc::crd::{DeletionPolicy, GrpcKind, GrpcKindParameters, GrpcKindSpec};
use provider_grpc::external::ListExternal;
use provider_grpc::retry::RetryConfig;

use super::helpers::{ensure_test_cluster, wait_for};
use crate::common::{config_for, start_list_service, InMemoryListService};

const TIMEOUT: Duration = Duration::from_secs(60);

fn sample_kind(name: &str, list: &str, items: &[i32], policy: DeletionPolicy) -> GrpcKind {
    GrpcKind {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: GrpcKindSpec {
            for_provider: GrpcKindParameters {
                name: list.to_string(),
                description: None,
                list_items: items.to_vec(),
            },
            deletion_policy: policy,
            provider_config_ref: None,
        },
        status: None,
    }
}

/// Start the list service and the controller, returning both task handles
async fn start_controller(
    client: Client,
    service: InMemoryListService,
) -> Vec<tokio::task::JoinHandle<()>> {
    let (addr, server) = start_list_service(service).await;
    let list = GrpcListService::connect_with_retry(&config_for(addr), &RetryConfig::with_max_attempts(20))
        .await
        .expect("list service should be reachable");

    let ctx = Arc::new(Context::new(
        client.clone(),
        Arc::new(ListExternal::new(list)),
        ReconcileConfig {
            poll_interval: Duration::from_secs(2),
            short_requeue: Duration::from_secs(1),
            error_backoff: Duration::from_secs(1),
        },
    ));

    let api: Api<GrpcKind> = Api::all(client);
    let controller = tokio::spawn(async move {
        Controller::new(api, WatcherConfig::default())
            .run(reconcile, error_policy, ctx)
            .for_each(|_| async {})
            .await;
    });

    vec![server, controller]
}

/// Story: a GrpcKind is created, edited and deleted, and the remote list
/// follows each step
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_remote_list_follows_grpc_kind() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let service = InMemoryListService::default();
    let handles = start_controller(client.clone(), service.clone()).await;
    let kinds: Api<GrpcKind> = Api::all(client.clone());
    let (api, service) = (&kinds, &service);
    let name = "lifecycle-delete";

    api.create(
        &PostParams::default(),
        &sample_kind(name, "lifecycle-delete-list", &[1, 2, 3], DeletionPolicy::Delete),
    )
    .await
    .expect("failed to create GrpcKind");

    // Created with a blank description and filled with the desired items
    assert!(
        wait_for(TIMEOUT, move || async move {
            service
                .get("lifecycle-delete-list")
                .is_some_and(|l| l.items == vec![1, 2, 3])
        })
        .await,
        "remote list should converge to [1, 2, 3]"
    );
    assert_eq!(service.get("lifecycle-delete-list").unwrap().description, "");

    assert!(
        wait_for(TIMEOUT, move || async move {
            api.get(name)
                .await
                .ok()
                .and_then(|k| k.status)
                .is_some_and(|s| s.is_ready())
        })
        .await,
        "GrpcKind should become Ready"
    );

    // Edit: append an item
    let patch = serde_json::json!({ "spec": { "forProvider": { "listItems": [1, 2, 3, 4] } } });
    api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .expect("failed to patch GrpcKind");
    assert!(
        wait_for(TIMEOUT, move || async move {
            service
                .get("lifecycle-delete-list")
                .is_some_and(|l| l.items == vec![1, 2, 3, 4])
        })
        .await,
        "remote list should pick up the appended item"
    );

    // Delete: the remote list goes away and the finalizer is released
    api.delete(name, &DeleteParams::default())
        .await
        .expect("failed to delete GrpcKind");
    assert!(
        wait_for(TIMEOUT, move || async move {
            service.get("lifecycle-delete-list").is_none() && api.get_opt(name).await.ok().flatten().is_none()
        })
        .await,
        "remote list and GrpcKind should both be gone"
    );

    handles.iter().for_each(|h| h.abort());
}

/// Story: with the Orphan policy the remote list outlives its GrpcKind
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_orphaned_list_survives_deletion() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let service = InMemoryListService::default();
    let handles = start_controller(client.clone(), service.clone()).await;
    let kinds: Api<GrpcKind> = Api::all(client.clone());
    let (api, service) = (&kinds, &service);
    let name = "lifecycle-orphan";

    api.create(
        &PostParams::default(),
        &sample_kind(name, "lifecycle-orphan-list", &[7], DeletionPolicy::Orphan),
    )
    .await
    .expect("failed to create GrpcKind");

    assert!(
        wait_for(TIMEOUT, move || async move {
            service
                .get("lifecycle-orphan-list")
                .is_some_and(|l| l.items == vec![7])
        })
        .await,
        "remote list should be created"
    );

    api.delete(name, &DeleteParams::default())
        .await
        .expect("failed to delete GrpcKind");
    assert!(
        wait_for(TIMEOUT, move || async move { api.get_opt(name).await.ok().flatten().is_none() }).await,
        "GrpcKind should be released"
    );
    assert!(service.get("lifecycle-orphan-list").is_some());

    handles.iter().for_each(|h| h.abort());
}
