//! Integration tests for the notify hook sequence

use async_trait::async_trait;
use common::{Error, Result};
use failover::{
    Action, CloudApi, FailoverError, FloatingIp, FloatingIpAddress, Server, VrrpState,
};
use hcloud::Token;
use keepalived_notify::config::{Config, LoggingConfig};
use keepalived_notify::hook;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Cloud fake that also snapshots the health-check file on every call
struct RecordingCloud {
    state_path: PathBuf,
    known_server: bool,
    floating_ips: Vec<FloatingIp>,
    failing_assignment: Option<u64>,
    calls: AtomicUsize,
    state_seen: Mutex<Vec<String>>,
}

impl RecordingCloud {
    fn new(state_path: &Path, floating_ips: Vec<FloatingIp>) -> Self {
        Self {
            state_path: state_path.to_path_buf(),
            known_server: true,
            floating_ips,
            failing_assignment: None,
            calls: AtomicUsize::new(0),
            state_seen: Mutex::new(Vec::new()),
        }
    }

    fn observe(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = std::fs::read_to_string(&self.state_path).unwrap_or_default();
        self.state_seen.lock().unwrap().push(state);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudApi for RecordingCloud {
    async fn server_by_name(&self, name: &str) -> Result<Server> {
        self.observe();
        if self.known_server {
            Ok(Server { id: 1, name: name.to_string() })
        } else {
            Err(Error::not_found(format!("server '{}'", name)))
        }
    }

    async fn floating_ips(&self) -> Result<Vec<FloatingIp>> {
        self.observe();
        Ok(self.floating_ips.clone())
    }

    async fn assign_floating_ip(&self, floating_ip: &FloatingIp, _server: &Server) -> Result<Action> {
        self.observe();
        if self.failing_assignment == Some(floating_ip.id) {
            return Err(Error::api(409, "conflict", "assignment in progress"));
        }
        Ok(Action {
            id: floating_ip.id * 10,
            command: "assign_floating_ip".to_string(),
            status: "running".to_string(),
        })
    }
}

/// Helper to create a config writing state into `dir`
fn config(dir: &Path) -> Config {
    Config {
        node_name: "lb-1".to_string(),
        floating_ips: vec!["1.2.3.4".parse().unwrap(), "2600::1".parse().unwrap()],
        token: Token::new("secret"),
        health_check_path: dir.join("keepalived.state"),
        endpoint: Url::parse("http://127.0.0.1:1/v1").unwrap(),
        logging: LoggingConfig {
            path: None,
            ..Default::default()
        },
    }
}

fn ipv4(id: u64, ip: &str, server: Option<u64>) -> FloatingIp {
    FloatingIp {
        id,
        name: format!("fip-{}", id),
        description: None,
        address: FloatingIpAddress::V4(Some(ip.parse().unwrap())),
        server,
    }
}

#[tokio::test]
async fn test_backup_only_records_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let cloud = RecordingCloud::new(&config.health_check_path, vec![ipv4(1, "1.2.3.4", Some(2))]);

    let report = hook::run(&config, &VrrpState::Backup, &cloud).await.unwrap();

    assert!(report.is_none());
    assert_eq!(cloud.calls(), 0, "BACKUP must not talk to the cloud API");
    assert_eq!(std::fs::read_to_string(&config.health_check_path).unwrap(), "BACKUP");
}

#[tokio::test]
async fn test_unknown_state_is_written_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let cloud = RecordingCloud::new(&config.health_check_path, vec![]);

    hook::run(&config, &VrrpState::from("master"), &cloud).await.unwrap();

    assert_eq!(cloud.calls(), 0);
    assert_eq!(std::fs::read_to_string(&config.health_check_path).unwrap(), "master");
}

#[tokio::test]
async fn test_master_records_state_before_reconciling() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    std::fs::write(&config.health_check_path, "BACKUP").unwrap();
    let cloud = RecordingCloud::new(
        &config.health_check_path,
        vec![ipv4(1, "1.2.3.4", Some(2)), ipv4(2, "9.9.9.9", Some(2))],
    );

    let report = hook::run(&config, &VrrpState::Master, &cloud)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.reassigned(), 1);
    assert_eq!(cloud.calls(), 3, "lookup, list and one assign");
    assert!(
        cloud.state_seen.lock().unwrap().iter().all(|s| s == "MASTER"),
        "state must be written before the first remote call"
    );
    assert_eq!(std::fs::read_to_string(&config.health_check_path).unwrap(), "MASTER");
}

#[tokio::test]
async fn test_partial_failure_still_records_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut cloud = RecordingCloud::new(
        &config.health_check_path,
        vec![
            ipv4(1, "1.2.3.4", None),
            FloatingIp {
                id: 2,
                name: "fip-2".to_string(),
                description: None,
                address: FloatingIpAddress::V6(Some("2600::/64".parse().unwrap())),
                server: None,
            },
        ],
    );
    cloud.failing_assignment = Some(1);

    let err = hook::run(&config, &VrrpState::Master, &cloud).await.unwrap_err();

    match err {
        FailoverError::AssignmentFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures.0[0].floating_ip_id, 1);
        }
        other => panic!("Expected AssignmentFailed, got {:?}", other),
    }
    assert_eq!(cloud.calls(), 4, "second floating IP must still be assigned");
    assert_eq!(std::fs::read_to_string(&config.health_check_path).unwrap(), "MASTER");
}

#[tokio::test]
async fn test_identity_failure_is_fatal_but_state_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut cloud = RecordingCloud::new(&config.health_check_path, vec![ipv4(1, "1.2.3.4", None)]);
    cloud.known_server = false;

    let err = hook::run(&config, &VrrpState::Master, &cloud).await.unwrap_err();

    assert!(matches!(err, FailoverError::IdentityNotFound { .. }));
    assert_eq!(cloud.calls(), 1, "nothing after the failed lookup");
    assert_eq!(std::fs::read_to_string(&config.health_check_path).unwrap(), "MASTER");
}

#[tokio::test]
async fn test_state_write_failure_aborts_before_remote_calls() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.health_check_path = dir.path().join("missing").join("keepalived.state");
    let cloud = RecordingCloud::new(&config.health_check_path, vec![ipv4(1, "1.2.3.4", None)]);

    let err = hook::run(&config, &VrrpState::Master, &cloud).await.unwrap_err();

    assert!(matches!(err, FailoverError::StateWrite { .. }));
    assert_eq!(cloud.calls(), 0);
}
