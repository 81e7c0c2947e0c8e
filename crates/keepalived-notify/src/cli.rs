//! Command line arguments as passed by keepalived to notify scripts.

use clap::Parser;
use failover::VrrpState;

/// keepalived notify hook moving cloud floating IPs to the MASTER node
#[derive(Debug, Clone, Parser)]
#[command(name = "keepalived-notify", version)]
pub struct Cli {
    /// Kind of VRRP object that changed state (GROUP or INSTANCE)
    #[arg(value_name = "TYPE")]
    pub kind: String,

    /// Name of the VRRP group or instance
    pub name: String,

    /// New state (MASTER, BACKUP, FAULT or STOP)
    pub state: String,

    /// Priority of the instance
    pub priority: Option<String>,

    /// Anything keepalived appends in future versions
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub extra: Vec<String>,
}

impl Cli {
    pub fn state(&self) -> VrrpState {
        VrrpState::from(self.state.as_str())
    }
}
