#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestEnv {
    pub server: MockServer,
    pub home_dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            home_dir: TempDir::new().unwrap(),
        }
    }

    /// The binary with HOME pointed at the temp dir, so no real config leaks in.
    pub fn l1watch(&self) -> Command {
        let mut cmd = Command::cargo_bin("l1watch").unwrap();
        let path = self.home_dir.path();
        cmd.env("HOME", path);
        cmd.env("USERPROFILE", path);
        cmd.env("APPDATA", path);
        cmd.env("LOCALAPPDATA", path);
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Write `~/.l1watch/config.toml` inside the temp home.
    pub fn write_config(&self, content: &str) -> PathBuf {
        let dir = self.home_dir.path().join(".l1watch");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Answer every POST with a block.
    pub async fn mock_block(&self, number: u64) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": get_mock_block(number)
            })))
            .mount(&self.server)
            .await;
    }
}

pub fn get_mock_block(block_number: u64) -> serde_json::Value {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    serde_json::json!({
        "number": format!("0x{:x}", block_number),
        "hash": "0x1234567890123456789012345678901234567890123456789012345678901234",
        "gasUsed": "0x7a1200",
        "gasLimit": "0xf42400",
        "size": "0x400",
        "timestamp": format!("0x{:x}", now),
        "transactions": [{"hash": "0x01"}, {"hash": "0x02"}]
    })
}
