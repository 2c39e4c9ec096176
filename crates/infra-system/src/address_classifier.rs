// Private-range address classifier
// Blocks every address that is not globally routable
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ping_probe_core::port::AddressClassifier;

/// Classifies loopback, RFC 1918, link-local, CGNAT, reserved, documentation
/// and multicast ranges (IPv4 and IPv6) as private
#[derive(Debug, Default, Clone, Copy)]
pub struct PrivateRangeClassifier;

impl PrivateRangeClassifier {
    pub fn new() -> Self {
        Self
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();

    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast()
        // 0.0.0.0/8 "this network"
        || a == 0
        // 100.64.0.0/10 shared address space
        || (a == 100 && (64..=127).contains(&b))
        // 192.0.0.0/24 IETF protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 192.88.99.0/24 6to4 relay anycast
        || (a == 192 && b == 88 && c == 99)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b == 18 || b == 19))
        // 240.0.0.0/4 reserved
        || a >= 240
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }

    let segments = ip.segments();

    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (segments[0] & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (segments[0] & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (segments[0] == 0x2001 && segments[1] == 0x0db8)
}

impl AddressClassifier for PrivateRangeClassifier {
    fn is_private(&self, address: &str) -> bool {
        // Drop an IPv6 zone suffix such as "%en0"
        let address = address.trim().split('%').next().unwrap_or_default();

        match address.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => is_private_v4(ip),
            Ok(IpAddr::V6(ip)) => is_private_v6(ip),
            Err(_) => false,
        }
    }
}
