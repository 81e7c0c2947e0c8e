//! Cloud API capabilities needed for failover.

use crate::types::{Action, FloatingIp, Server};
use async_trait::async_trait;
use common::Result;

/// Remote operations the reconciler relies on.
///
/// Implementations perform one request per call and never retry; a failed
/// call is reported to the reconciler, which decides whether it is fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Resolve a server by its exact name.
    ///
    /// Returns `Error::NotFound` when no server has that name.
    async fn server_by_name(&self, name: &str) -> Result<Server>;

    /// List every floating IP in the project, in provider order.
    async fn floating_ips(&self) -> Result<Vec<FloatingIp>>;

    /// Point `floating_ip` at `server`.
    ///
    /// Returns as soon as the provider accepted the request; the returned
    /// action may still be running.
    async fn assign_floating_ip(&self, floating_ip: &FloatingIp, server: &Server) -> Result<Action>;
}
