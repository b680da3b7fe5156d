//! Classification of addresses the fetcher must never contact.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Returns `true` if connecting to `ip` could reach a non-public network.
///
/// Restricted ranges: loopback, private (RFC 1918, RFC 4193), link-local,
/// multicast, and the unspecified/"this network" addresses that the kernel
/// routes to the local host. IPv4-mapped IPv6 addresses are judged by their
/// IPv4 form.
pub fn is_restricted_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_restricted_ipv4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_restricted_ipv4(v4),
            None => is_restricted_ipv6(v6),
        },
    }
}

fn is_restricted_ipv4(ip: Ipv4Addr) -> bool {
    let o = ip.octets();
    // Loopback 127.0.0.0/8
    if o[0] == 127 {
        return true;
    }
    // Private 10.0.0.0/8
    if o[0] == 10 {
        return true;
    }
    // Private 172.16.0.0/12
    if o[0] == 172 && (16..=31).contains(&o[1]) {
        return true;
    }
    // Private 192.168.0.0/16
    if o[0] == 192 && o[1] == 168 {
        return true;
    }
    // Link-local 169.254.0.0/16
    if o[0] == 169 && o[1] == 254 {
        return true;
    }
    // This-network 0.0.0.0/8
    if o[0] == 0 {
        return true;
    }
    // Multicast 224.0.0.0/4
    (224..=239).contains(&o[0])
}

fn is_restricted_ipv6(ip: Ipv6Addr) -> bool {
    let s = ip.segments();
    // ::1 loopback, :: unspecified
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    // fc00::/7 unique-local
    if (s[0] & 0xfe00) == 0xfc00 {
        return true;
    }
    // fe80::/10 link-local
    if (s[0] & 0xffc0) == 0xfe80 {
        return true;
    }
    // ff00::/8 multicast
    s[0] & 0xff00 == 0xff00
}
