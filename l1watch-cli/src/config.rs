//! Configuration file handling.
//!
//! Settings live in `~/.l1watch/config.toml`. A missing file means built-in
//! defaults; command-line flags override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use l1watch_core::{
    AggregateOptions, AllowPolicy, ChainRegistry, FailurePolicy, L1WatchError, RegistryEntry,
};
use l1watch_poller::{
    EngineConfig, FetcherConfig, DEFAULT_DIRECT_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_PROXY_TIMEOUT,
};

type Result<T> = std::result::Result<T, L1WatchError>;

/// Parsed contents of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    pub poller: PollerSection,
    pub metrics: MetricsSection,
    /// Replaces the default allow policy when present.
    pub allow: Option<AllowPolicy>,
    /// Replaces the built-in registry when non-empty.
    pub chains: Vec<RegistryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollerSection {
    pub interval: Option<String>,
    pub direct_timeout: Option<String>,
    pub proxy_timeout: Option<String>,
    pub proxy_url: Option<String>,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsSection {
    pub window: Option<String>,
    pub block_time_secs: Option<f64>,
}

fn config_error(msg: impl Into<String>) -> L1WatchError {
    L1WatchError::ConfigError(msg.into())
}

/// Default location of the configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".l1watch").join("config.toml"))
}

/// Load the configuration.
///
/// An explicit path must exist. The default path is optional.
pub fn load(explicit: Option<&Path>) -> Result<WatchConfig> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(WatchConfig::default()),
        },
    };

    if !path.exists() {
        if required {
            return Err(config_error(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(WatchConfig::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| config_error(format!("cannot read {}: {}", path.display(), e)))?;
    WatchConfig::parse(&content)
        .map_err(|e| config_error(format!("{}: {}", path.display(), e)))
}

impl WatchConfig {
    /// Parse TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.message().to_string())
    }

    /// Registry to poll, built-in unless the file lists chains.
    pub fn registry(&self) -> ChainRegistry {
        let policy = self.allow.clone().unwrap_or_default();
        if self.chains.is_empty() {
            ChainRegistry::builtin().with_policy(policy)
        } else {
            ChainRegistry::from_entries(self.chains.clone(), policy)
        }
    }

    /// Engine settings, with an optional interval override from the command line.
    pub fn engine_config(&self, interval: Option<&str>) -> Result<EngineConfig> {
        let interval = match interval.or(self.poller.interval.as_deref()) {
            Some(raw) => parse_duration(raw).map_err(|e| config_error(format!("interval: {}", e)))?,
            None => DEFAULT_POLL_INTERVAL,
        };
        if interval.is_zero() {
            return Err(config_error("interval must be greater than zero"));
        }

        let mut aggregate = AggregateOptions::default();
        if let Some(raw) = &self.metrics.window {
            aggregate.window_secs = parse_duration(raw)
                .map_err(|e| config_error(format!("window: {}", e)))?
                .as_secs();
        }
        if let Some(block_time) = self.metrics.block_time_secs {
            if !block_time.is_finite() || block_time <= 0.0 {
                return Err(config_error("block_time_secs must be a positive number"));
            }
            aggregate.block_time_secs = block_time;
        }

        Ok(EngineConfig {
            interval,
            aggregate,
            failure_policy: self.poller.failure_policy,
        })
    }

    /// Fetcher settings, with an optional proxy override from the command line.
    pub fn fetcher_config(&self, proxy_url: Option<String>) -> Result<FetcherConfig> {
        let direct_timeout = timeout_setting(
            "direct_timeout",
            self.poller.direct_timeout.as_deref(),
            DEFAULT_DIRECT_TIMEOUT,
        )?;
        let proxy_timeout = timeout_setting(
            "proxy_timeout",
            self.poller.proxy_timeout.as_deref(),
            DEFAULT_PROXY_TIMEOUT,
        )?;

        Ok(FetcherConfig {
            proxy_url: proxy_url
                .or_else(|| self.poller.proxy_url.clone())
                .filter(|url| !url.trim().is_empty()),
            proxy_timeout,
            direct_timeout,
            ..FetcherConfig::default()
        })
    }
}

fn timeout_setting(name: &str, raw: Option<&str>, default: Duration) -> Result<Duration> {
    let value = match raw {
        Some(raw) => parse_duration(raw).map_err(|e| config_error(format!("{}: {}", name, e)))?,
        None => default,
    };
    if value.is_zero() {
        return Err(config_error(format!("{} must be greater than zero", name)));
    }
    Ok(value)
}

/// Longest duration accepted anywhere in the config: 100 years.
const MAX_DURATION_SECS: u64 = 100 * 365 * 86_400;

/// Parse `30s`, `5m`, `1h` or a bare number of seconds.
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();
    let secs = if let Some(s) = input.strip_suffix('s') {
        s.trim().parse::<u64>().map_err(|_| "Invalid seconds format")?
    } else if let Some(m) = input.strip_suffix('m') {
        let mins = m.trim().parse::<u64>().map_err(|_| "Invalid minutes format")?;
        mins.checked_mul(60).ok_or("Duration too large")?
    } else if let Some(h) = input.strip_suffix('h') {
        let hours = h.trim().parse::<u64>().map_err(|_| "Invalid hours format")?;
        hours.checked_mul(3600).ok_or("Duration too large")?
    } else {
        input
            .parse::<u64>()
            .map_err(|_| format!("Invalid duration '{}'. Use '30s', '5m' or '1h'.", input))?
    };

    if secs > MAX_DURATION_SECS {
        return Err("Duration too large".to_string());
    }
    Ok(Duration::from_secs(secs))
}
