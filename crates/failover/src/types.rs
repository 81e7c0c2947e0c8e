//! Failover data types.
//!
//! Local addresses come from configuration, floating IPs and servers are a
//! read-only snapshot of the cloud inventory taken once per invocation.

use common::Error;
use ipnet::{IpNet, Ipv6Net};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// Cloud server ID
pub type ServerId = u64;

/// Cloud floating IP ID
pub type FloatingIpId = u64;

/// Address owned by this node, as configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalAddress {
    /// Single IPv4 or IPv6 address
    Addr(IpAddr),
    /// Network prefix in CIDR notation
    Prefix(IpNet),
}

impl LocalAddress {
    /// The single address this entry stands for when tested for containment.
    ///
    /// IPv6 prefixes contribute their address part. IPv4 prefixes have no
    /// point and never match a floating IP.
    pub fn point(&self) -> Option<IpAddr> {
        match self {
            LocalAddress::Addr(addr) => Some(*addr),
            LocalAddress::Prefix(IpNet::V6(net)) => Some(IpAddr::V6(net.addr())),
            LocalAddress::Prefix(IpNet::V4(_)) => None,
        }
    }

    /// Whether this is an IPv4 prefix, which can never match.
    pub fn is_ipv4_prefix(&self) -> bool {
        matches!(self, LocalAddress::Prefix(IpNet::V4(_)))
    }
}

impl FromStr for LocalAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('/') {
            s.parse::<IpNet>()
                .map(LocalAddress::Prefix)
                .map_err(|_| Error::config(format!("invalid IP prefix: {}", s)))
        } else {
            s.parse::<IpAddr>()
                .map(LocalAddress::Addr)
                .map_err(|_| Error::config(format!("invalid IP address: {}", s)))
        }
    }
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalAddress::Addr(addr) => write!(f, "{}", addr),
            LocalAddress::Prefix(net) => write!(f, "{}", net),
        }
    }
}

/// Floating IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "ipv4"),
            IpFamily::V6 => write!(f, "ipv6"),
        }
    }
}

/// Address carried by a floating IP.
///
/// IPv4 floating IPs carry one address, IPv6 floating IPs a whole network.
/// `None` means the provider sent a value that could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatingIpAddress {
    V4(Option<Ipv4Addr>),
    V6(Option<Ipv6Net>),
}

impl FloatingIpAddress {
    pub fn family(&self) -> IpFamily {
        match self {
            FloatingIpAddress::V4(_) => IpFamily::V4,
            FloatingIpAddress::V6(_) => IpFamily::V6,
        }
    }
}

impl fmt::Display for FloatingIpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatingIpAddress::V4(Some(addr)) => write!(f, "{}", addr),
            FloatingIpAddress::V6(Some(net)) => write!(f, "{}", net),
            FloatingIpAddress::V4(None) | FloatingIpAddress::V6(None) => write!(f, "<none>"),
        }
    }
}

/// Floating IP as listed by the cloud API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingIp {
    pub id: FloatingIpId,
    pub name: String,
    pub description: Option<String>,
    pub address: FloatingIpAddress,

    /// Server the floating IP currently points to
    pub server: Option<ServerId>,
}

impl FloatingIp {
    pub fn family(&self) -> IpFamily {
        self.address.family()
    }

    /// Whether the floating IP already points to `server`
    pub fn is_assigned_to(&self, server: ServerId) -> bool {
        self.server == Some(server)
    }
}

/// This node's identity in the cloud inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
}

/// Provider-side action started by a mutating call.
///
/// Completion is not awaited; the action is only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: u64,
    pub command: String,
    pub status: String,
}

/// VRRP state token handed over by keepalived.
///
/// Parsing never fails and is case-sensitive; unknown tokens are kept
/// verbatim so the health-check file always shows what keepalived said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VrrpState {
    Master,
    Backup,
    Fault,
    Stop,
    Other(String),
}

impl VrrpState {
    pub fn as_str(&self) -> &str {
        match self {
            VrrpState::Master => "MASTER",
            VrrpState::Backup => "BACKUP",
            VrrpState::Fault => "FAULT",
            VrrpState::Stop => "STOP",
            VrrpState::Other(token) => token,
        }
    }

    pub fn is_master(&self) -> bool {
        *self == VrrpState::Master
    }
}

impl From<&str> for VrrpState {
    fn from(token: &str) -> Self {
        match token {
            "MASTER" => VrrpState::Master,
            "BACKUP" => VrrpState::Backup,
            "FAULT" => VrrpState::Fault,
            "STOP" => VrrpState::Stop,
            other => VrrpState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for VrrpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reconciling a single matching floating IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Already pointed to this node, nothing was sent
    AlreadyAssigned,
    /// Assign call accepted by the provider
    Reassigned { action_id: u64 },
    /// Assign call failed
    Failed { reason: String },
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Outcome for one floating IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub floating_ip_id: FloatingIpId,
    pub floating_ip_name: String,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_address_parsing() {
        assert_eq!(
            "1.2.3.4".parse::<LocalAddress>().unwrap(),
            LocalAddress::Addr("1.2.3.4".parse().unwrap())
        );
        assert_eq!(
            " 2600::1 ".parse::<LocalAddress>().unwrap(),
            LocalAddress::Addr("2600::1".parse().unwrap())
        );
        assert_eq!(
            "2600::1/64".parse::<LocalAddress>().unwrap(),
            LocalAddress::Prefix("2600::1/64".parse().unwrap())
        );

        assert!("".parse::<LocalAddress>().is_err());
        assert!("1.2.3".parse::<LocalAddress>().is_err());
        assert!("2600::/129".parse::<LocalAddress>().is_err());
    }

    #[test]
    fn test_local_address_point() {
        let prefix: LocalAddress = "2600::1/64".parse().unwrap();
        assert_eq!(prefix.point(), Some("2600::1".parse().unwrap()));

        let v4_prefix: LocalAddress = "10.0.0.0/24".parse().unwrap();
        assert!(v4_prefix.is_ipv4_prefix());
        assert_eq!(v4_prefix.point(), None);
    }

    #[test]
    fn test_vrrp_state_is_verbatim() {
        assert_eq!(VrrpState::from("MASTER"), VrrpState::Master);
        assert!(VrrpState::from("MASTER").is_master());
        assert!(!VrrpState::from("master").is_master());
        assert_eq!(VrrpState::from("master").to_string(), "master");
        assert_eq!(VrrpState::from("FAULT").to_string(), "FAULT");
    }

    #[test]
    fn test_floating_ip_address_display() {
        assert_eq!(FloatingIpAddress::V4(Some("1.2.3.4".parse().unwrap())).to_string(), "1.2.3.4");
        assert_eq!(FloatingIpAddress::V6(Some("2600::/64".parse().unwrap())).to_string(), "2600::/64");
        assert_eq!(FloatingIpAddress::V6(None).to_string(), "<none>");
        assert_eq!(FloatingIpAddress::V6(None).family(), IpFamily::V6);
    }
}
