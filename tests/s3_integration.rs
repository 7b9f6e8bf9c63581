//! Integration tests for the session and tree using MinIO via testcontainers
//!
//! These tests require Docker to be running and use the testcontainers crate
//! to spin up a MinIO instance for realistic S3 testing.
//!
//! Run with: cargo test --test s3_integration
//!
//! Note: Tests are conditionally skipped if Docker is not available.

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use s3_tree::error::BrowserError;
use s3_tree::s3::{ConnectionProfile, ListEntry, ObjectStore, S3Session};
use s3_tree::tree::{KeyTree, NodeKind, ROOT};
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::minio::MinIO;

/// MinIO default credentials
const MINIO_ACCESS_KEY: &str = "minioadmin";
const MINIO_SECRET_KEY: &str = "minioadmin";

/// Test helper to check if Docker is available
fn docker_available() -> bool {
    std::process::Command::new("docker")
        .arg("info")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Host and port MinIO listens on
async fn get_minio_address(container: &ContainerAsync<MinIO>) -> String {
    let host = container.get_host().await.expect("Failed to get container host");
    let port = container.get_host_port_ipv4(9000).await.expect("Failed to get MinIO port");
    format!("{}:{}", host, port)
}

async fn start_minio() -> ContainerAsync<MinIO> {
    let container = MinIO::default()
        .with_env_var("MINIO_ROOT_USER", MINIO_ACCESS_KEY)
        .with_env_var("MINIO_ROOT_PASSWORD", MINIO_SECRET_KEY)
        .start()
        .await
        .expect("Failed to start MinIO container");

    // Wait for MinIO to be ready
    tokio::time::sleep(Duration::from_secs(2)).await;
    container
}

/// Raw SDK client for the plain-HTTP test container
fn sdk_client(address: &str) -> aws_sdk_s3::Client {
    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new(
            MINIO_ACCESS_KEY,
            MINIO_SECRET_KEY,
            None,
            None,
            "test",
        ))
        .endpoint_url(format!("http://{}", address))
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(config)
}

/// Session over a bucket seeded with `keys`
async fn seeded_session(address: &str, bucket: &str, keys: &[&str]) -> S3Session {
    let client = sdk_client(address);
    client
        .create_bucket()
        .bucket(bucket)
        .send()
        .await
        .expect("Failed to create bucket");

    for key in keys {
        client
            .put_object()
            .bucket(bucket)
            .key(*key)
            .body(key.as_bytes().to_vec().into())
            .send()
            .await
            .expect("Failed to put object");
    }

    S3Session::from_client(client, format!("http://{}", address))
}

/// Test single-level listing with delimiter grouping
#[tokio::test]
async fn test_list_immediate_children() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let container = start_minio().await;
    let address = get_minio_address(&container).await;
    let session = seeded_session(
        &address,
        "docs",
        &["a/x.txt", "a/deep/y.txt", "b/", "notes.txt"],
    )
    .await;

    let root = session.list_immediate_children("docs", "").await.unwrap();
    assert_eq!(
        root,
        vec![
            ListEntry::prefix("a/"),
            ListEntry::prefix("b/"),
            ListEntry::object("notes.txt"),
        ]
    );

    let a = session.list_immediate_children("docs", "a/").await.unwrap();
    let keys: Vec<&str> = a.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["a/deep/", "a/x.txt"]);

    let b = session.list_immediate_children("docs", "b/").await.unwrap();
    assert_eq!(b, vec![ListEntry::object("b/")]);
    assert!(b[0].is_directory_marker);
}

/// Test listing that spans several result pages
#[tokio::test]
async fn test_listing_follows_continuation() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let container = start_minio().await;
    let address = get_minio_address(&container).await;

    let keys: Vec<String> = (0..1100).map(|i| format!("many/file-{:04}.txt", i)).collect();
    let key_refs: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
    let session = seeded_session(&address, "big", &key_refs).await;

    let entries = session.list_immediate_children("big", "many/").await.unwrap();
    assert_eq!(entries.len(), 1100);
    assert!(entries.windows(2).all(|w| w[0].key < w[1].key));
}

/// Test the tree against a real store
#[tokio::test]
async fn test_tree_expand_and_create_directory() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let container = start_minio().await;
    let address = get_minio_address(&container).await;
    let session = seeded_session(&address, "docs", &["a/x.txt", "b/y.txt", "notes.txt"]).await;

    let mut tree = KeyTree::root_for("docs");
    tree.expand(&session, ROOT).await.unwrap();

    let children: Vec<(String, NodeKind)> = tree
        .children(ROOT)
        .map(|n| (n.label().to_string(), n.kind()))
        .collect();
    assert_eq!(
        children,
        vec![
            ("a/".to_string(), NodeKind::Directory),
            ("b/".to_string(), NodeKind::Directory),
            ("notes.txt".to_string(), NodeKind::Object),
        ]
    );

    let a = tree.find("a/").unwrap();
    tree.expand(&session, a).await.unwrap();
    let key = tree.create_directory(&session, a, "sub").await.unwrap();
    assert_eq!(key, "a/sub/");

    let info = session.stat_object("docs", "a/sub/").await.unwrap();
    assert_eq!(info.size, 0);

    // A fresh tree sees the marker exactly once
    let mut fresh = KeyTree::root_for("docs");
    fresh.expand(&session, ROOT).await.unwrap();
    let a = fresh.find("a/").unwrap();
    fresh.expand(&session, a).await.unwrap();
    let labels: Vec<&str> = fresh.children(a).map(|n| n.label()).collect();
    assert_eq!(labels, vec!["sub/", "x.txt"]);
}

/// Test object metadata retrieval
#[tokio::test]
async fn test_stat_object() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let container = start_minio().await;
    let address = get_minio_address(&container).await;
    let session = seeded_session(&address, "docs", &["notes.txt"]).await;

    let info = session.stat_object("docs", "notes.txt").await.unwrap();
    assert_eq!(info.size, "notes.txt".len() as u64);
    assert!(info.last_modified.is_some());
    assert!(info.etag.is_some());

    let err = session.stat_object("docs", "missing.txt").await.unwrap_err();
    assert!(matches!(err, BrowserError::NotFound(_)), "got {:?}", err);
}

/// Test bucket enumeration
#[tokio::test]
async fn test_list_buckets() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let container = start_minio().await;
    let address = get_minio_address(&container).await;
    let session = seeded_session(&address, "docs", &[]).await;

    let buckets = session.list_buckets().await.unwrap();
    assert!(buckets.iter().any(|b| b.name == "docs"));
}

/// Establishing always uses TLS, so a plain-HTTP server is unreachable
#[tokio::test]
async fn test_establish_requires_tls() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let container = start_minio().await;
    let address = get_minio_address(&container).await;

    for ignore_ssl_verification in [false, true] {
        let profile = ConnectionProfile {
            name: "minio".to_string(),
            endpoint: address.clone(),
            access_key: MINIO_ACCESS_KEY.to_string(),
            secret_key: MINIO_SECRET_KEY.to_string(),
            ignore_ssl_verification,
        };

        let err = S3Session::establish(&profile).await.err().unwrap();
        assert!(matches!(err, BrowserError::Network(_)), "got {:?}", err);
    }
}
