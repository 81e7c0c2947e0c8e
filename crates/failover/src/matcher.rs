//! Matching floating IPs against locally owned addresses.
//!
//! IPv4 floating IPs match by address equality. IPv6 floating IPs carry a
//! network and match when a local address lies inside it. Families never
//! cross: an IPv4 local is never tested against an IPv6 network and vice
//! versa. IPv4 prefixes configured locally never match.

use crate::types::{FloatingIp, FloatingIpAddress, LocalAddress};
use std::net::IpAddr;

/// Whether `floating_ip` belongs to one of `locals`.
pub fn matches(floating_ip: &FloatingIp, locals: &[LocalAddress]) -> bool {
    locals
        .iter()
        .any(|local| matches_address(&floating_ip.address, local))
}

/// Match a single floating IP address against a single local entry.
pub fn matches_address(remote: &FloatingIpAddress, local: &LocalAddress) -> bool {
    match remote {
        FloatingIpAddress::V4(Some(remote)) => match local {
            // IPv4-mapped IPv6 addresses compare equal to their IPv4 form
            LocalAddress::Addr(addr) => addr.to_canonical() == IpAddr::V4(*remote),
            LocalAddress::Prefix(_) => false,
        },
        // IPv4-mapped locals count as IPv4 here too
        FloatingIpAddress::V6(Some(network)) => match local.point().map(|p| p.to_canonical()) {
            Some(IpAddr::V6(addr)) => network.contains(&addr),
            _ => false,
        },
        FloatingIpAddress::V4(None) | FloatingIpAddress::V6(None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locals() -> Vec<LocalAddress> {
        vec![
            "1.2.3.4".parse().unwrap(),
            "2600::1".parse().unwrap(),
        ]
    }

    fn ipv4(ip: &str) -> FloatingIp {
        FloatingIp {
            id: 1,
            name: format!("fip-{}", ip),
            description: None,
            address: FloatingIpAddress::V4(Some(ip.parse().unwrap())),
            server: None,
        }
    }

    fn ipv6(network: Option<&str>) -> FloatingIp {
        FloatingIp {
            id: 2,
            name: "fip-v6".to_string(),
            description: None,
            address: FloatingIpAddress::V6(network.map(|n| n.parse().unwrap())),
            server: None,
        }
    }

    #[test]
    fn test_ipv4_exact_match() {
        assert!(matches(&ipv4("1.2.3.4"), &locals()));
        assert!(!matches(&ipv4("1.2.3.5"), &locals()));
    }

    #[test]
    fn test_ipv6_network_containment() {
        assert!(matches(&ipv6(Some("2600::/64")), &locals()));
        assert!(!matches(&ipv6(Some("2700::/64")), &locals()));
    }

    #[test]
    fn test_ipv6_without_network_never_matches() {
        assert!(!matches(&ipv6(None), &locals()));
        assert!(!matches(&ipv6(None), &["::".parse().unwrap()]));
    }

    #[test]
    fn test_unparsed_ipv4_never_matches() {
        let mut fip = ipv4("1.2.3.4");
        fip.address = FloatingIpAddress::V4(None);
        assert!(!matches(&fip, &locals()));
    }

    #[test]
    fn test_no_cross_family_match() {
        // IPv4 local inside an IPv4-mapped IPv6 network is still not a match
        let v4_local: Vec<LocalAddress> = vec!["1.2.3.4".parse().unwrap()];
        assert!(!matches(&ipv6(Some("::ffff:0:0/96")), &v4_local));

        let v6_local: Vec<LocalAddress> = vec!["2600::1".parse().unwrap()];
        assert!(!matches(&ipv4("1.2.3.4"), &v6_local));
    }

    #[test]
    fn test_ipv4_mapped_local_matches_ipv4() {
        let mapped: Vec<LocalAddress> = vec!["::ffff:1.2.3.4".parse().unwrap()];
        assert!(matches(&ipv4("1.2.3.4"), &mapped));
    }

    #[test]
    fn test_ipv4_mapped_local_never_matches_ipv6() {
        let mapped: Vec<LocalAddress> = vec!["::ffff:1.2.3.4".parse().unwrap()];
        assert!(!matches(&ipv6(Some("::ffff:0:0/96")), &mapped));
        assert!(!matches(&ipv6(Some("::/0")), &mapped));

        let mapped_prefix: Vec<LocalAddress> = vec!["::ffff:1.2.3.4/128".parse().unwrap()];
        assert!(!matches(&ipv6(Some("::ffff:0:0/96")), &mapped_prefix));
    }

    #[test]
    fn test_prefixes() {
        // IPv6 prefixes contribute their address part
        let v6_prefix: Vec<LocalAddress> = vec!["2600::1/64".parse().unwrap()];
        assert!(matches(&ipv6(Some("2600::/64")), &v6_prefix));
        assert!(!matches(&ipv6(Some("2700::/64")), &v6_prefix));

        // IPv4 prefixes never match, not even the address they contain
        let v4_prefix: Vec<LocalAddress> = vec!["1.2.3.4/32".parse().unwrap()];
        assert!(!matches(&ipv4("1.2.3.4"), &v4_prefix));
    }

    #[test]
    fn test_empty_locals_never_match() {
        assert!(!matches(&ipv4("1.2.3.4"), &[]));
        assert!(!matches(&ipv6(Some("2600::/64")), &[]));
    }
}
