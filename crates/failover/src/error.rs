//! Failover error types.

use crate::types::{FloatingIpId, ServerId};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a failover run
#[derive(Debug, Error)]
pub enum FailoverError {
    /// This node could not be resolved in the cloud inventory
    #[error("unable to find myself ({name}) in the api: {source}")]
    IdentityNotFound {
        name: String,
        #[source]
        source: common::Error,
    },

    /// Listing floating IPs failed, nothing was reassigned
    #[error("unable to list floating IPs in the api: {0}")]
    RemoteUnavailable(#[source] common::Error),

    /// One or more floating IPs could not be assigned
    #[error(transparent)]
    AssignmentFailed(#[from] AssignmentFailures),

    /// Health-check file could not be written
    #[error("failed to write health check path {}: {source}", .path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single failed assign call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentFailure {
    pub server_id: ServerId,
    pub floating_ip_id: FloatingIpId,
    pub floating_ip_name: String,
    pub reason: String,
}

impl fmt::Display for AssignmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unable to assign floating IP name={} id={} to myself id={}: {}",
            self.floating_ip_name, self.floating_ip_id, self.server_id, self.reason
        )
    }
}

/// Every assign call that failed during one run, in list order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentFailures(pub Vec<AssignmentFailure>);

impl AssignmentFailures {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AssignmentFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} floating IP assignment(s) failed", self.0.len())?;
        for failure in &self.0 {
            write!(f, "\n\t* {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AssignmentFailures {}
