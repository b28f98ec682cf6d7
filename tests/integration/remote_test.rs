//! Remote dispatch between two managers over a real gRPC registry server.

use serde_json::{json, Value};

use cmdhub::config::Config;
use cmdhub::workers::EchoWorker;
use cmdhub::{CommandError, CommandManager, CommandPayload, RemoteEndpoint, ResolveError, WorkerSpec};

use crate::common::{remote_client_config, spawn_peer, unused_port, Failing};

#[tokio::test]
async fn test_remote_echo() {
    let peer = spawn_peer(Config::for_test()).await;
    peer.manager.add_command::<EchoWorker>("echo").await;
    let client = CommandManager::new(remote_client_config());

    let response = client
        .execute_remote::<Value>(
            "echo",
            &peer.endpoint(),
            Some(CommandPayload::new().with("k", "v")),
        )
        .await
        .unwrap();

    assert_eq!(response.data, Some(json!({"k": "v"})));
    assert_eq!(response.response_type, "json");
    assert!(client.registry().is_empty().await);

    peer.server.shutdown();
}

#[tokio::test]
async fn test_remote_not_found_forwarded() {
    let peer = spawn_peer(Config::for_test()).await;
    let client = CommandManager::new(remote_client_config());
    client.add_command::<EchoWorker>("echo").await;

    let err = client
        .execute_remote::<Value>("echo", &peer.endpoint(), None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CommandError::NotFound {
            name: "echo".to_string()
        }
    );

    peer.server.shutdown();
}

#[tokio::test]
async fn test_remote_worker_failure_forwarded() {
    let peer = spawn_peer(Config::for_test()).await;
    peer.manager
        .add_command_with_spec("store", WorkerSpec::new("failing", || Failing))
        .await;
    let client = CommandManager::new(remote_client_config());

    let err = client
        .execute_remote::<Value>("store", &peer.endpoint(), None)
        .await
        .unwrap_err();

    assert_eq!(err, CommandError::execution("store-worker", "disk full"));

    peer.server.shutdown();
}

#[tokio::test]
async fn test_remote_disabled_without_remote_provider() {
    let peer = spawn_peer(Config::for_test()).await;
    peer.manager.add_command::<EchoWorker>("echo").await;
    let client = CommandManager::new(Config::for_test());

    let err = client
        .execute_remote::<Value>("echo", &peer.endpoint(), None)
        .await
        .unwrap_err();

    assert_eq!(err.source_name(), "CommandManager");
    assert_eq!(err.message(), "Remote provider remote is not enabled");

    peer.server.shutdown();
}

#[tokio::test]
async fn test_unreachable_peer_is_unresolvable() {
    let port = unused_port();
    let client = CommandManager::new(remote_client_config());

    let err = client
        .execute_remote::<Value>("echo", &RemoteEndpoint::new("127.0.0.1").with_port(port), None)
        .await
        .unwrap_err();

    assert_eq!(err.source_name(), "CommandManager");
    assert_eq!(
        err.message(),
        format!("Failed to find remote system [127.0.0.1:{port}]")
    );
    assert!(!err.cause().unwrap().to_string().is_empty());
}

#[tokio::test]
async fn test_registry_path_mismatch_is_unresolvable() {
    let mut peer_config = Config::for_test();
    peer_config.remote.registry_path = "/user/other".to_string();
    let peer = spawn_peer(peer_config).await;
    let client = CommandManager::new(remote_client_config());

    let err = client
        .execute_remote::<Value>("echo", &peer.endpoint(), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        Some(ResolveError::NotFound { .. })
    ));

    peer.server.shutdown();
}

#[tokio::test]
async fn test_remote_failure_keeps_non_ascii_source() {
    let peer = spawn_peer(Config::for_test()).await;
    peer.manager
        .add_command_with_spec("größe", WorkerSpec::new("failing", || Failing))
        .await;
    let client = CommandManager::new(remote_client_config());

    let err = client
        .execute_remote::<Value>("größe", &peer.endpoint(), None)
        .await
        .unwrap_err();

    assert_eq!(err, CommandError::execution("größe-worker", "disk full"));

    peer.server.shutdown();
}
