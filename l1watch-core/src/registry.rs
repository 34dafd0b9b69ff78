//! Chain registry: the static set of chains eligible for polling.
//!
//! The registry is a plain list of [`RegistryEntry`] records plus an
//! [`AllowPolicy`]. [`active_chains`] turns it into the descriptors the
//! poller works with. Filtering is pure and deterministic; registry order
//! is preserved.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{L1WatchError, Result};

/// A chain as it appears in configuration.
///
/// Entries may be incomplete (no RPC endpoint, no EVM chain id). Those are
/// kept in the registry but never become pollable descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub chain_name: String,
    /// Platform blockchain id, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_id: Option<String>,
    /// EVM chain id, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub debug_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Immutable identity of a pollable chain for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainDescriptor {
    pub chain_name: String,
    /// Snapshot key: the decimal EVM chain id.
    pub blockchain_id: String,
    pub evm_chain_id: u64,
    pub rpc_url: String,
}

impl TryFrom<&RegistryEntry> for ChainDescriptor {
    type Error = L1WatchError;

    fn try_from(entry: &RegistryEntry) -> Result<Self> {
        let not_pollable = |reason: &str| L1WatchError::ChainNotPollable {
            chain: entry.chain_name.clone(),
            reason: reason.to_string(),
        };

        let evm_chain_id = entry
            .evm_chain_id
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| not_pollable("missing EVM chain id"))?
            .parse::<u64>()
            .map_err(|_| not_pollable("EVM chain id is not numeric"))?;

        let rpc_url = entry
            .rpc_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| not_pollable("missing RPC URL"))?;

        Ok(Self {
            chain_name: entry.chain_name.clone(),
            blockchain_id: evm_chain_id.to_string(),
            evm_chain_id,
            rpc_url: rpc_url.to_string(),
        })
    }
}

/// Which pollable chains are actually polled.
///
/// A chain passes when it is debug-enabled and the policy includes
/// debug-enabled chains, or when its name is listed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowPolicy {
    pub include_debug_enabled: bool,
    pub names: BTreeSet<String>,
}

/// Chains polled by default in addition to debug-enabled ones.
pub const DEFAULT_ALLOWED_NAMES: &[&str] = &[
    "C-Chain",
    "DFK Chain",
    "dexalotevm",
    "shrapnelnetwork",
    "beam",
    "PLAYA3ULL",
    "Pulsar",
    "Lamina1",
];

impl Default for AllowPolicy {
    fn default() -> Self {
        Self {
            include_debug_enabled: true,
            names: DEFAULT_ALLOWED_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AllowPolicy {
    /// Allow only the listed chain names.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include_debug_enabled: false,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Allow only debug-enabled chains.
    pub fn debug_enabled() -> Self {
        Self {
            include_debug_enabled: true,
            names: BTreeSet::new(),
        }
    }

    /// Whether the entry passes the policy.
    pub fn allows(&self, entry: &RegistryEntry) -> bool {
        (self.include_debug_enabled && entry.debug_enabled) || self.names.contains(&entry.chain_name)
    }
}

/// Filter registry entries down to the chains eligible for polling.
pub fn active_chains(entries: &[RegistryEntry], policy: &AllowPolicy) -> Vec<ChainDescriptor> {
    entries
        .iter()
        .filter(|entry| policy.allows(entry))
        .filter_map(|entry| ChainDescriptor::try_from(entry).ok())
        .collect()
}

struct BuiltinChain {
    name: &'static str,
    evm_chain_id: Option<&'static str>,
    rpc_url: Option<&'static str>,
    debug_enabled: bool,
    description: &'static str,
}

const BUILTIN_CHAINS: &[BuiltinChain] = &[
    BuiltinChain {
        name: "C-Chain",
        evm_chain_id: Some("43114"),
        rpc_url: Some("https://api.avax.network/ext/bc/C/rpc"),
        debug_enabled: false,
        description: "Avalanche C-Chain",
    },
    BuiltinChain {
        name: "DFK Chain",
        evm_chain_id: Some("53935"),
        rpc_url: Some("https://subnets.avax.network/defi-kingdoms/dfk-chain/rpc"),
        debug_enabled: false,
        description: "DeFi Kingdoms",
    },
    BuiltinChain {
        name: "dexalotevm",
        evm_chain_id: Some("432204"),
        rpc_url: Some("https://subnets.avax.network/dexalot/mainnet/rpc"),
        debug_enabled: false,
        description: "Dexalot",
    },
    BuiltinChain {
        name: "shrapnelnetwork",
        evm_chain_id: Some("2044"),
        rpc_url: Some("https://subnets.avax.network/shrapnel/mainnet/rpc"),
        debug_enabled: false,
        description: "Shrapnel",
    },
    BuiltinChain {
        name: "beam",
        evm_chain_id: Some("4337"),
        rpc_url: Some("https://subnets.avax.network/beam/mainnet/rpc"),
        debug_enabled: false,
        description: "Beam",
    },
    BuiltinChain {
        name: "PLAYA3ULL",
        evm_chain_id: Some("3011"),
        rpc_url: Some("https://subnets.avax.network/playa3ull/mainnet/rpc"),
        debug_enabled: false,
        description: "PLAYA3ULL Games",
    },
    BuiltinChain {
        name: "Pulsar",
        evm_chain_id: None,
        rpc_url: None,
        debug_enabled: false,
        description: "Pulsar (no public RPC)",
    },
    BuiltinChain {
        name: "Lamina1",
        evm_chain_id: Some("10849"),
        rpc_url: Some("https://subnets.avax.network/lamina1/mainnet/rpc"),
        debug_enabled: false,
        description: "Lamina1",
    },
    BuiltinChain {
        name: "Coqnet",
        evm_chain_id: Some("42069"),
        rpc_url: Some("https://subnets.avax.network/coqnet/mainnet/rpc"),
        debug_enabled: true,
        description: "Coqnet",
    },
    BuiltinChain {
        name: "WAGMI",
        evm_chain_id: Some("11111"),
        rpc_url: Some("https://subnets.avax.network/wagmi/wagmi-chain-testnet/rpc"),
        debug_enabled: false,
        description: "WAGMI test chain",
    },
];

/// A registry paired with the policy that selects from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    entries: Vec<RegistryEntry>,
    policy: AllowPolicy,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ChainRegistry {
    /// The built-in chain list with the default allow policy.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CHAINS
            .iter()
            .map(|c| RegistryEntry {
                chain_name: c.name.to_string(),
                blockchain_id: None,
                evm_chain_id: c.evm_chain_id.map(str::to_string),
                rpc_url: c.rpc_url.map(str::to_string),
                debug_enabled: c.debug_enabled,
                description: Some(c.description.to_string()),
            })
            .collect();

        Self {
            entries,
            policy: AllowPolicy::default(),
        }
    }

    /// Build a registry from configured entries.
    pub fn from_entries(entries: Vec<RegistryEntry>, policy: AllowPolicy) -> Self {
        Self { entries, policy }
    }

    /// Replace the allow policy.
    pub fn with_policy(mut self, policy: AllowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn policy(&self) -> &AllowPolicy {
        &self.policy
    }

    /// Chains eligible for polling, in registry order.
    pub fn active_chains(&self) -> Vec<ChainDescriptor> {
        active_chains(&self.entries, &self.policy)
    }

    /// Look up an entry by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.chain_name.eq_ignore_ascii_case(name))
    }
}
