mod common;
use common::TestEnv;
use predicates::prelude::*;

fn two_chain_config(env: &TestEnv) -> String {
    format!(
        r#"
[poller]
direct_timeout = "2s"

[allow]
include_debug_enabled = false
names = ["alpha", "bravo"]

[[chains]]
chain_name = "alpha"
evm_chain_id = "7"
rpc_url = "{}/rpc"

[[chains]]
chain_name = "bravo"
evm_chain_id = "8"
rpc_url = "http://127.0.0.1:1/rpc"

[[chains]]
chain_name = "hidden"
evm_chain_id = "9"
rpc_url = "http://127.0.0.1:1/rpc"
"#,
        env.server.uri()
    )
}

#[tokio::test]
async fn test_chains_lists_builtin_registry() {
    let env = TestEnv::new().await;

    env.l1watch()
        .arg("chains")
        .assert()
        .success()
        .stdout(predicate::str::contains("C-Chain"))
        .stdout(predicate::str::contains("beam"))
        .stdout(predicate::str::contains("WAGMI").not());
}

#[tokio::test]
async fn test_chains_all_includes_skipped() {
    let env = TestEnv::new().await;

    env.l1watch()
        .arg("chains")
        .arg("--all")
        .assert()
        .success()
        .stdout(predicate::str::contains("WAGMI"))
        .stdout(predicate::str::contains("skipped"));
}

#[tokio::test]
async fn test_chains_detail_is_case_insensitive() {
    let env = TestEnv::new().await;

    env.l1watch()
        .arg("chains")
        .arg("BEAM")
        .assert()
        .success()
        .stdout(predicate::str::contains("4337"));

    env.l1watch()
        .arg("chains")
        .arg("nowhere")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the registry"));
}

#[tokio::test]
async fn test_chains_json_uses_config_file() {
    let env = TestEnv::new().await;
    env.write_config(&two_chain_config(&env));

    let output = env
        .l1watch()
        .arg("chains")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let chains: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = chains
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["chain_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["alpha", "bravo"]);
}

#[tokio::test]
async fn test_snapshot_json_mixes_success_and_failure() {
    let env = TestEnv::new().await;
    env.mock_block(100).await;
    env.write_config(&two_chain_config(&env));

    let output = env
        .l1watch()
        .arg("snapshot")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let chains = view["chains"].as_array().unwrap();
    assert_eq!(chains.len(), 2);

    assert_eq!(chains[0]["chain_name"], "alpha");
    assert_eq!(chains[0]["block_data"]["number"], "0x64");
    assert!(chains[0]["error"].is_null());

    assert_eq!(chains[1]["chain_name"], "bravo");
    assert!(chains[1]["block_data"].is_null());
    assert!(chains[1]["error"].as_str().unwrap().contains("bravo"));

    assert_eq!(view["aggregate"]["included_chains"], 1);
    assert_eq!(view["highlighted"], "7");
}

#[tokio::test]
async fn test_snapshot_table_output() {
    let env = TestEnv::new().await;
    env.mock_block(100).await;
    env.write_config(&two_chain_config(&env));

    env.l1watch()
        .arg("snapshot")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("Total TPS"))
        .stdout(predicate::str::contains("1 chains fetched, 1 failed"));
}

#[tokio::test]
async fn test_invalid_config_is_reported() {
    let env = TestEnv::new().await;
    env.write_config("[poller]\nfailure_policy = \"sometimes\"\n");

    env.l1watch()
        .arg("chains")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[tokio::test]
async fn test_explicit_config_must_exist() {
    let env = TestEnv::new().await;

    env.l1watch()
        .arg("--config")
        .arg(env.home_dir.path().join("missing.toml"))
        .arg("chains")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[tokio::test]
async fn test_watch_rejects_zero_interval() {
    let env = TestEnv::new().await;

    env.l1watch()
        .arg("watch")
        .arg("--interval")
        .arg("0s")
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval must be greater than zero"));
}

#[tokio::test]
async fn test_watch_rejects_oversized_interval() {
    let env = TestEnv::new().await;

    env.l1watch()
        .arg("watch")
        .arg("--interval")
        .arg("999999999999999999h")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Duration too large"));
}
