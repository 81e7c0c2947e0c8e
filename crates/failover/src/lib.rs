//! Floating IP failover for keepalived-managed nodes.
//!
//! When a node transitions to MASTER, every cloud floating IP that belongs to
//! one of its configured addresses is pointed at the node. The current VRRP
//! state is also written to a health-check file for external monitors.
//!
//! # Components
//!
//! - **matcher**: decides whether a floating IP belongs to this node
//! - **reconciler**: one-shot reassignment pass with per-IP failure isolation
//! - **state**: health-check file writer
//! - **api**: the cloud operations the reconciler needs
//!
//! # Example
//!
//! ```no_run
//! use failover::{CloudApi, LocalAddress, StateRecorder, reconcile};
//!
//! # async fn example(api: &dyn CloudApi) -> Result<(), Box<dyn std::error::Error>> {
//! let locals: Vec<LocalAddress> = vec!["1.2.3.4".parse()?, "2600::1".parse()?];
//! let recorder = StateRecorder::new("/var/run/keepalived.state");
//!
//! recorder.record("MASTER")?;
//! let report = reconcile(api, "lb-1", &locals).await?.into_result()?;
//! println!("reassigned {} floating IPs", report.reassigned());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod matcher;
pub mod reconciler;
pub mod state;
pub mod types;

pub use api::CloudApi;
pub use error::{AssignmentFailure, AssignmentFailures, FailoverError};
pub use reconciler::{ReconcileReport, reconcile};
pub use state::StateRecorder;
pub use types::{
    Action, FloatingIp, FloatingIpAddress, IpFamily, LocalAddress, Outcome, Reconciliation,
    Server, ServerId, VrrpState,
};
