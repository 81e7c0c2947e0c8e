//! Configuration loading and validation for the notify hook
//!
//! Everything comes from `NOTIFY_*` environment variables. Resolution runs
//! over a lookup function so it can be exercised without touching the
//! process environment, and it reports every problem at once.

use common::LogFormat;
use failover::LocalAddress;
use hcloud::{DEFAULT_ENDPOINT, Token};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const ENV_TOKEN: &str = "NOTIFY_HCLOUD_TOKEN";
pub const ENV_NODE_NAME: &str = "NOTIFY_NODE_NAME";
pub const ENV_FLOATING_IPS: &str = "NOTIFY_FLOATING_IPS";
pub const ENV_HEALTH_CHECK_PATH: &str = "NOTIFY_HEALTH_CHECK_PATH";
pub const ENV_LOG_PATH: &str = "NOTIFY_LOG_PATH";
pub const ENV_LOG_FORMAT: &str = "NOTIFY_LOG_FORMAT";
pub const ENV_ENDPOINT: &str = "NOTIFY_HCLOUD_ENDPOINT";

pub const DEFAULT_LOG_PATH: &str = "/var/run/keepalived.notify.log";
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/var/run/keepalived.state";

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required environment variable missing: {0}")]
    Missing(&'static str),

    #[error("environment variable must not be empty: {0}")]
    Empty(&'static str),

    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Every configuration problem found in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} configuration error(s) occurred:", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n\t* {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

/// Log sink settings, resolved before anything else so later errors land in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// File to append log lines to, `None` logs to stderr only
    pub path: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_LOG_PATH)),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// An empty `NOTIFY_LOG_PATH` disables file logging.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match lookup(ENV_LOG_PATH) {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_LOG_PATH)),
        };

        let format = match lookup(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|_| ConfigError::Invalid {
                var: ENV_LOG_FORMAT,
                reason: format!("'{}', expected 'text' or 'json'", raw),
            })?,
            None => LogFormat::Text,
        };

        Ok(Self { path, format })
    }
}

/// Resolved hook configuration, immutable once loaded
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of this node's server in the cloud project
    pub node_name: String,

    /// Addresses owned by this node, never empty
    pub floating_ips: Vec<LocalAddress>,

    pub token: Token,

    pub health_check_path: PathBuf,

    pub endpoint: Url,

    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigErrors> {
        Self::from_lookup(env_lookup)
    }

    /// Load configuration through `lookup`, collecting every error
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigErrors>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        let token = required(&lookup, ENV_TOKEN, &mut errors)
            .and_then(|raw| non_empty(ENV_TOKEN, raw, &mut errors))
            .map(Token::new);

        let node_name = required(&lookup, ENV_NODE_NAME, &mut errors)
            .and_then(|raw| non_empty(ENV_NODE_NAME, raw.trim().to_string(), &mut errors));

        let floating_ips = required(&lookup, ENV_FLOATING_IPS, &mut errors)
            .map(|raw| parse_floating_ips(&raw, &mut errors));

        let health_check_path = lookup(ENV_HEALTH_CHECK_PATH)
            .unwrap_or_else(|| DEFAULT_HEALTH_CHECK_PATH.to_string());
        let health_check_path = non_empty(ENV_HEALTH_CHECK_PATH, health_check_path, &mut errors)
            .map(PathBuf::from);

        let endpoint = parse_endpoint(
            &lookup(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            &mut errors,
        );

        let logging = LoggingConfig::from_lookup(&lookup)
            .map_err(|e| errors.push(e))
            .ok();

        match (token, node_name, floating_ips, health_check_path, endpoint, logging) {
            (
                Some(token),
                Some(node_name),
                Some(floating_ips),
                Some(health_check_path),
                Some(endpoint),
                Some(logging),
            ) if errors.is_empty() => Ok(Self {
                node_name,
                floating_ips,
                token,
                health_check_path,
                endpoint,
                logging,
            }),
            _ => Err(ConfigErrors(errors)),
        }
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn required<F>(lookup: &F, var: &'static str, errors: &mut Vec<ConfigError>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var);
    if value.is_none() {
        errors.push(ConfigError::Missing(var));
    }
    value
}

fn non_empty(var: &'static str, value: String, errors: &mut Vec<ConfigError>) -> Option<String> {
    if value.trim().is_empty() {
        errors.push(ConfigError::Empty(var));
        None
    } else {
        Some(value)
    }
}

/// Parse a comma separated address list, reporting each bad entry
fn parse_floating_ips(raw: &str, errors: &mut Vec<ConfigError>) -> Vec<LocalAddress> {
    let mut addresses = Vec::new();

    for entry in raw.split(',') {
        match entry.parse::<LocalAddress>() {
            Ok(address) => {
                if address.is_ipv4_prefix() {
                    warn!(entry = %address, "IPv4 prefixes never match a floating IP");
                }
                addresses.push(address);
            }
            Err(_) => errors.push(ConfigError::InvalidAddress(entry.trim().to_string())),
        }
    }

    addresses
}

fn parse_endpoint(raw: &str, errors: &mut Vec<ConfigError>) -> Option<Url> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: ENV_ENDPOINT,
        reason,
    };

    match Url::parse(raw.trim()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        Ok(url) => {
            errors.push(invalid(format!("unsupported scheme '{}'", url.scheme())));
            None
        }
        Err(e) => {
            errors.push(invalid(format!("'{}': {}", raw, e)));
            None
        }
    }
}
