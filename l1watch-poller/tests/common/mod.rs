#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use l1watch_core::{Block, ChainDescriptor};
use l1watch_poller::{BlockSource, FetchError};

/// One scripted answer for a chain.
#[derive(Clone)]
pub struct Reply {
    pub delay: Duration,
    pub outcome: Result<Block, FetchError>,
}

impl Reply {
    pub fn block(number: u64) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(block(number)),
        }
    }

    pub fn timeout(chain_name: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(FetchError::Timeout {
                chain_name: chain_name.to_string(),
                timeout: Duration::from_secs(10),
            }),
        }
    }

    pub fn rpc_error(chain_name: &str, message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(FetchError::Rpc {
                chain_name: chain_name.to_string(),
                message: message.to_string(),
            }),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Block source answering from per-chain scripts. The last reply of a
/// script repeats once the earlier ones are used up.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, chain_name: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(chain_name.to_string(), replies.into());
        self
    }

    pub fn calls(&self, chain_name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(chain_name)
            .copied()
            .unwrap_or(0)
    }

    fn next_reply(&self, chain_name: &str) -> Reply {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(chain_name.to_string())
            .or_default() += 1;

        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(chain_name)
            .unwrap_or_else(|| panic!("no script for {}", chain_name));
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().expect("empty script")
        }
    }
}

#[async_trait]
impl BlockSource for ScriptedSource {
    async fn fetch_latest_block(&self, chain: &ChainDescriptor) -> Result<Block, FetchError> {
        let reply = self.next_reply(&chain.chain_name);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome
    }
}

pub fn block(number: u64) -> Block {
    block_at(number, unix_now())
}

pub fn block_at(number: u64, timestamp: u64) -> Block {
    Block {
        number: format!("0x{:x}", number),
        gas_used: "0x4c4b40".to_string(),
        gas_limit: "0xe4e1c0".to_string(),
        size: "0x3e8".to_string(),
        timestamp: format!("0x{:x}", timestamp),
        transactions: vec![serde_json::json!({"hash": "0x01"}); 4],
    }
}

pub fn chain(name: &str, id: u64) -> ChainDescriptor {
    ChainDescriptor {
        chain_name: name.to_string(),
        blockchain_id: id.to_string(),
        evm_chain_id: id,
        rpc_url: format!("http://127.0.0.1:1/{}", id),
    }
}

pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// JSON-RPC reply carrying a block, as a node would send it.
pub fn block_reply(number: u64) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "number": format!("0x{:x}", number),
            "hash": "0x1234567890123456789012345678901234567890123456789012345678901234",
            "parentHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "gasUsed": "0x5208",
            "gasLimit": "0xe4e1c0",
            "size": "0x2a0",
            "timestamp": format!("0x{:x}", unix_now()),
            "transactions": [{"hash": "0xaa"}, {"hash": "0xbb"}]
        }
    })
}
