//! keepalived notify hook for Hetzner Cloud floating IPs.
//!
//! keepalived runs the hook on every VRRP state change with
//! `TYPE NAME STATE [PRIORITY]`. The hook writes the state to a health-check
//! file and, when the node became MASTER, points every configured floating
//! IP at this node.
//!
//! # Components
//!
//! - **cli**: positional arguments
//! - **config**: `NOTIFY_*` environment configuration
//! - **hook**: the state-write / reconcile / state-write sequence

pub mod cli;
pub mod config;
pub mod hook;

pub use cli::Cli;
pub use config::{Config, ConfigError, ConfigErrors, LoggingConfig};
