//! Floating IP reconciliation for a node that just became MASTER.
//!
//! One pass per invocation: resolve this node, list the floating IPs, and
//! point every matching floating IP at this node. Lookup and listing failures
//! abort the pass before anything is changed. Assign failures are recorded
//! per floating IP and the pass carries on with the rest.

use crate::api::CloudApi;
use crate::error::{AssignmentFailure, AssignmentFailures, FailoverError};
use crate::matcher;
use crate::types::{LocalAddress, Outcome, Reconciliation, Server};
use tracing::{debug, error, info};

/// Everything a reconciliation pass did, in floating IP list order.
///
/// Only floating IPs that matched a local address have an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// This node as resolved in the cloud inventory
    pub server: Server,
    pub outcomes: Vec<Reconciliation>,
}

impl ReconcileReport {
    /// Whether every matched floating IP now points to this node
    pub fn is_converged(&self) -> bool {
        !self.outcomes.iter().any(|r| r.outcome.is_failed())
    }

    /// Number of assign calls that were accepted
    pub fn reassigned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Reassigned { .. }))
            .count()
    }

    /// Number of floating IPs that already pointed to this node
    pub fn already_assigned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome == Outcome::AlreadyAssigned)
            .count()
    }

    /// Every failed assignment, in list order
    pub fn failures(&self) -> AssignmentFailures {
        AssignmentFailures(
            self.outcomes
                .iter()
                .filter_map(|r| match &r.outcome {
                    Outcome::Failed { reason } => Some(AssignmentFailure {
                        server_id: self.server.id,
                        floating_ip_id: r.floating_ip_id,
                        floating_ip_name: r.floating_ip_name.clone(),
                        reason: reason.clone(),
                    }),
                    _ => None,
                })
                .collect(),
        )
    }

    /// Turn failed assignments into one aggregate error
    pub fn into_result(self) -> Result<Self, FailoverError> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(self)
        } else {
            Err(FailoverError::AssignmentFailed(failures))
        }
    }
}

/// Point every floating IP matching `locals` at the server named `node_name`.
///
/// Returns an error only for fatal problems (this node cannot be resolved,
/// floating IPs cannot be listed). Failed assignments are part of the
/// returned report; use [`ReconcileReport::into_result`] to surface them.
pub async fn reconcile(
    api: &dyn CloudApi,
    node_name: &str,
    locals: &[LocalAddress],
) -> Result<ReconcileReport, FailoverError> {
    let server = api
        .server_by_name(node_name)
        .await
        .map_err(|source| FailoverError::IdentityNotFound {
            name: node_name.to_string(),
            source,
        })?;
    info!(id = server.id, name = %server.name, "Found myself in the api");

    let floating_ips = api
        .floating_ips()
        .await
        .map_err(FailoverError::RemoteUnavailable)?;
    info!(count = floating_ips.len(), "Listed floating IPs");

    let mut outcomes = Vec::new();

    for (pos, floating_ip) in floating_ips.iter().enumerate() {
        if !matcher::matches(floating_ip, locals) {
            debug!(
                pos,
                name = %floating_ip.name,
                id = floating_ip.id,
                family = %floating_ip.family(),
                address = %floating_ip.address,
                "Floating IP is not configured locally, skipping"
            );
            continue;
        }

        let outcome = if floating_ip.is_assigned_to(server.id) {
            info!(
                name = %floating_ip.name,
                id = floating_ip.id,
                "Floating IP already points to me"
            );
            Outcome::AlreadyAssigned
        } else {
            match api.assign_floating_ip(floating_ip, &server).await {
                Ok(action) => {
                    info!(
                        pos,
                        name = %floating_ip.name,
                        id = floating_ip.id,
                        server_id = server.id,
                        previous_server_id = ?floating_ip.server,
                        action_id = action.id,
                        action_status = %action.status,
                        "Floating IP assigned"
                    );
                    Outcome::Reassigned {
                        action_id: action.id,
                    }
                }
                Err(e) => {
                    error!(
                        pos,
                        name = %floating_ip.name,
                        id = floating_ip.id,
                        server_id = server.id,
                        error = %e,
                        "Unable to assign floating IP"
                    );
                    Outcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };

        outcomes.push(Reconciliation {
            floating_ip_id: floating_ip.id,
            floating_ip_name: floating_ip.name.clone(),
            outcome,
        });
    }

    Ok(ReconcileReport { server, outcomes })
}
