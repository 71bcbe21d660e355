//! Integration tests for CRD operations
//!
//! These tests tell the story of how users interact with GrpcKind resources
//! through the Kubernetes API.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::Client;

use provider_grpc::crd::{DeletionPolicy, GrpcKind, GrpcKindParameters, GrpcKindSpec};

use super::helpers::ensure_test_cluster;

// =============================================================================
// Test Fixtures
// =============================================================================

/// Create a sample GrpcKind
fn sample_kind(name: &str, list: &str, items: &[i32]) -> GrpcKind {
    GrpcKind {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: GrpcKindSpec {
            for_provider: GrpcKindParameters {
                name: list.to_string(),
                description: Some("created by crd_operations".to_string()),
                list_items: items.to_vec(),
            },
            deletion_policy: DeletionPolicy::Delete,
            provider_config_ref: None,
        },
        status: None,
    }
}

/// Helper to cleanup a GrpcKind
async fn cleanup(client: &Client, name: &str) {
    let api: Api<GrpcKind> = Api::all(client.clone());
    let _ = api.delete(name, &DeleteParams::default()).await;
}

// =============================================================================
// Stories
// =============================================================================

/// Story: a user applies a GrpcKind and reads it back unchanged
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_user_creates_grpc_kind() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let api: Api<GrpcKind> = Api::all(client.clone());
    let name = "crd-create";
    cleanup(&client, name).await;

    let created = api
        .create(&PostParams::default(), &sample_kind(name, "crd-create-list", &[1, 2, 3]))
        .await
        .expect("failed to create GrpcKind");

    assert_eq!(created.metadata.name.as_deref(), Some(name));
    assert_eq!(created.spec.for_provider.list_items, vec![1, 2, 3]);
    assert_eq!(created.spec.deletion_policy, DeletionPolicy::Delete);

    let fetched = api.get(name).await.expect("failed to get GrpcKind");
    assert_eq!(fetched.spec, created.spec);

    cleanup(&client, name).await;
}

/// Story: a user edits the desired items of an existing GrpcKind
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_user_edits_list_items() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let api: Api<GrpcKind> = Api::all(client.clone());
    let name = "crd-edit";
    cleanup(&client, name).await;

    api.create(&PostParams::default(), &sample_kind(name, "crd-edit-list", &[1]))
        .await
        .expect("failed to create GrpcKind");

    let patch = serde_json::json!({
        "spec": { "forProvider": { "listItems": [1, 2] } }
    });
    let patched = api
        .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .expect("failed to patch GrpcKind");

    assert_eq!(patched.spec.for_provider.list_items, vec![1, 2]);
    assert_eq!(patched.spec.for_provider.name, "crd-edit-list");

    cleanup(&client, name).await;
}

/// Story: GrpcKind is cluster scoped, so it is reachable without a namespace
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_grpc_kind_is_cluster_scoped() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let api: Api<GrpcKind> = Api::all(client.clone());
    let name = "crd-scope";
    cleanup(&client, name).await;

    api.create(&PostParams::default(), &sample_kind(name, "crd-scope-list", &[]))
        .await
        .expect("failed to create GrpcKind");

    let listed = api
        .list(&Default::default())
        .await
        .expect("failed to list GrpcKinds");
    assert!(listed
        .items
        .iter()
        .any(|k| k.metadata.name.as_deref() == Some(name)));
    assert!(listed.items.iter().all(|k| k.metadata.namespace.is_none()));

    cleanup(&client, name).await;
}
