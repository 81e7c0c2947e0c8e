//! One notify invocation: record state, reconcile on MASTER, record state again.

use crate::config::Config;
use failover::{CloudApi, FailoverError, ReconcileReport, StateRecorder, VrrpState, reconcile};
use tracing::{error, info};

/// Handle a state transition.
///
/// The state is written before anything talks to the cloud API and again
/// once reconciliation is over, whatever its result. A failed first write
/// aborts the run. Reconciliation only happens for `MASTER`; the returned
/// report is `None` for every other state.
pub async fn run(
    config: &Config,
    state: &VrrpState,
    api: &dyn CloudApi,
) -> Result<Option<ReconcileReport>, FailoverError> {
    let recorder = StateRecorder::new(&config.health_check_path);
    recorder.record(state.as_str())?;

    let result = if state.is_master() {
        reconcile(api, &config.node_name, &config.floating_ips)
            .await
            .and_then(ReconcileReport::into_result)
            .map(Some)
    } else {
        info!(%state, "Not MASTER, leaving floating IPs untouched");
        Ok(None)
    };

    let recorded = recorder.record(state.as_str());

    match (result, recorded) {
        (Ok(report), Ok(())) => {
            if let Some(report) = &report {
                info!(
                    server_id = report.server.id,
                    reassigned = report.reassigned(),
                    already_assigned = report.already_assigned(),
                    "Floating IPs point to this node"
                );
            }
            Ok(report)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(write_error)) => {
            error!(error = %write_error, "Unable to record state after failed reconciliation");
            Err(e)
        }
    }
}
