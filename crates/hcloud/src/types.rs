//! Hetzner Cloud API wire types.
//!
//! Only the fields the failover hook reads are modelled; everything else in
//! the responses is ignored.

use failover::{Action, FloatingIp, FloatingIpAddress, Server};
use ipnet::Ipv6Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use tracing::warn;

/// `{"error": {...}}` body returned with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSchema {
    pub id: u64,
    pub name: String,
}

impl From<ServerSchema> for Server {
    fn from(s: ServerSchema) -> Self {
        Server {
            id: s.id,
            name: s.name,
        }
    }
}

/// `GET /servers`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerListResponse {
    pub servers: Vec<ServerSchema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatingIpType {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIpSchema {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Single address for IPv4, network in CIDR notation for IPv6
    pub ip: String,

    #[serde(rename = "type")]
    pub ip_type: FloatingIpType,

    /// ID of the server the floating IP is assigned to
    #[serde(default)]
    pub server: Option<u64>,
}

impl From<FloatingIpSchema> for FloatingIp {
    fn from(f: FloatingIpSchema) -> Self {
        let address = match f.ip_type {
            FloatingIpType::Ipv4 => FloatingIpAddress::V4(f.ip.parse::<Ipv4Addr>().ok()),
            FloatingIpType::Ipv6 => FloatingIpAddress::V6(f.ip.parse::<Ipv6Net>().ok()),
        };

        if matches!(address, FloatingIpAddress::V4(None) | FloatingIpAddress::V6(None)) {
            warn!(id = f.id, name = %f.name, ip = %f.ip, "Unable to parse floating IP address");
        }

        FloatingIp {
            id: f.id,
            name: f.name,
            description: f.description,
            address,
            server: f.server,
        }
    }
}

/// `GET /floating_ips`
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIpListResponse {
    pub floating_ips: Vec<FloatingIpSchema>,
    #[serde(default)]
    pub meta: Meta,
}

/// `POST /floating_ips/{id}/actions/assign`
#[derive(Debug, Clone, Serialize)]
pub struct AssignRequest {
    pub server: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionSchema {
    pub id: u64,
    pub command: String,
    pub status: String,
}

impl From<ActionSchema> for Action {
    fn from(a: ActionSchema) -> Self {
        Action {
            id: a.id,
            command: a.command,
            status: a.status,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    pub action: ActionSchema,
}
