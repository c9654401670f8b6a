//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jobcache_jobs::JobPolicy;
use jobcache_observability::LogFormat;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub policy: JobPolicy,
    /// Simulated cost of one base computation.
    pub base_latency: Duration,
    /// Simulated cost of one derived computation.
    pub derived_latency: Duration,
    /// How long a single request waits before answering 408. `None` waits
    /// until the job completes or the client goes away.
    pub request_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            policy: JobPolicy::default(),
            base_latency: Duration::from_secs(10),
            derived_latency: Duration::from_secs(10),
            request_timeout: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` as the variable source; unset keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = parse_var::<SocketAddr>(&lookup, "LISTEN_ADDR")? {
            config.listen_addr = addr;
        }
        if let Some(ttl) = parse_var::<u64>(&lookup, "BASE_JOB_TTL_SECS")? {
            config.policy.base_ttl = Duration::from_secs(ttl);
        }
        if let Some(ttl) = parse_var::<u64>(&lookup, "API_JOB_TTL_SECS")? {
            config.policy.derived_ttl = Duration::from_secs(ttl);
        }
        if let Some(secs) = positive_secs(&lookup, "BASE_JOB_DEADLINE_SECS")? {
            config.policy.base_deadline = secs;
        }
        if let Some(secs) = positive_secs(&lookup, "API_JOB_DEADLINE_SECS")? {
            config.policy.derived_deadline = secs;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BASE_JOB_LATENCY_MS")? {
            config.base_latency = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "API_JOB_LATENCY_MS")? {
            config.derived_latency = Duration::from_millis(ms);
        }
        config.request_timeout = positive_secs(&lookup, "REQUEST_TIMEOUT_SECS")?;
        if let Some(format) = parse_var::<LogFormat>(&lookup, "LOG_FORMAT")? {
            config.log_format = format;
        }

        Ok(config)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn positive_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    match parse_var::<u64>(lookup, key)? {
        Some(0) => Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Some(secs) => Ok(Some(Duration::from_secs(secs))),
        None => Ok(None),
    }
}
