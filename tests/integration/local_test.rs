//! Local dispatch through the public `CommandManager` API.

use std::collections::HashSet;

use serde_json::{json, Value};

use cmdhub::config::{deployment_path, Config, PoolOverride, RouterKind};
use cmdhub::workers::EchoWorker;
use cmdhub::{CommandError, CommandManager, CommandPayload};

use crate::common::{numbered_spec, Failing};

#[tokio::test]
async fn test_unregistered_command_not_found() {
    let manager = CommandManager::new(Config::for_test());

    let err = manager.execute::<Value>("nope", None).await.unwrap_err();

    assert_eq!(err.source_name(), "nope");
    assert_eq!(err.message(), "Command not found");
}

#[tokio::test]
async fn test_echo_returns_payload() {
    let manager = CommandManager::new(Config::for_test());
    manager.add_command::<EchoWorker>("echo").await;

    let response = manager
        .execute::<Value>("echo", Some(CommandPayload::new().with("k", "v")))
        .await
        .unwrap();

    assert_eq!(response.data, Some(json!({"k": "v"})));
    assert_eq!(response.response_type, "json");

    let empty = manager.execute::<Value>("echo", None).await.unwrap();
    assert!(empty.data.is_none());
}

#[tokio::test]
async fn test_last_registration_wins() {
    let manager = CommandManager::new(Config::for_test());
    manager.add_command::<EchoWorker>("job").await;
    manager.add_command_with_spec("job", numbered_spec()).await;

    let response = manager.execute::<usize>("job", None).await.unwrap();

    assert!(response.data.is_some());
    assert_eq!(manager.registry().names().await, vec!["job".to_string()]);
}

#[tokio::test]
async fn test_default_pool_rotates_across_all_workers() {
    let mut config = Config::for_test();
    config.commands.default_instances = 4;
    let manager = CommandManager::new(config);
    let pool = manager.add_command_with_spec("spread", numbered_spec()).await;
    assert_eq!(pool.size(), 4);
    assert_eq!(pool.router_kind(), RouterKind::RoundRobin);

    let mut seen = HashSet::new();
    for _ in 0..4 {
        let response = manager.execute::<usize>("spread", None).await.unwrap();
        seen.insert(response.data.unwrap());
    }

    assert_eq!(seen.len(), 4);
}

#[tokio::test]
async fn test_concurrent_executions_use_distinct_workers() {
    let mut config = Config::for_test();
    config.commands.default_instances = 4;
    let manager = CommandManager::new(config);
    manager.add_command_with_spec("spread", numbered_spec()).await;

    let calls = (0..4).map(|_| manager.execute::<usize>("spread", None));
    let served: HashSet<usize> = futures::future::join_all(calls)
        .await
        .into_iter()
        .map(|result| result.unwrap().data.unwrap())
        .collect();

    assert_eq!(served.len(), 4);
}

#[tokio::test]
async fn test_deployment_override_sizes_pool() {
    let mut config = Config::for_test();
    config.deployment.insert(
        deployment_path("tuned"),
        PoolOverride {
            router: RouterKind::SmallestMailbox,
            nr_of_instances: 2,
        },
    );
    let manager = CommandManager::new(config);

    let tuned = manager.add_command::<EchoWorker>("tuned").await;
    let plain = manager.add_command::<EchoWorker>("plain").await;

    assert_eq!(tuned.size(), 2);
    assert_eq!(tuned.router_kind(), RouterKind::SmallestMailbox);
    assert_eq!(plain.size(), 5);
}

#[tokio::test]
async fn test_worker_failure_reaches_caller_unchanged() {
    let manager = CommandManager::new(Config::for_test());
    manager
        .add_command_with_spec("store", cmdhub::WorkerSpec::new("failing", || Failing))
        .await;

    let err = manager.execute::<Value>("store", None).await.unwrap_err();

    assert_eq!(err, CommandError::execution("store-worker", "disk full"));
}

#[tokio::test]
async fn test_concurrent_callers_each_get_one_reply() {
    let manager = CommandManager::new(Config::for_test());
    manager.add_command::<EchoWorker>("echo").await;

    let calls = (0..32).map(|i| {
        let manager = manager.clone();
        async move {
            manager
                .execute::<Value>("echo", Some(CommandPayload::new().with("i", i)))
                .await
        }
    });
    let results = futures::future::join_all(calls).await;

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap().data, Some(json!({"i": i})));
    }
}
