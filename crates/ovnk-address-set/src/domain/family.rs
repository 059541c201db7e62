//! # Address Families
//!
//! Family classification for member IPs. This is the only inspection the
//! crate performs on an address; validation and normalization belong to the
//! caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Suffix appended to a logical name for the IPv4 backing object.
pub const IPV4_SUFFIX: &str = "_v4";

/// Suffix appended to a logical name for the IPv6 backing object.
pub const IPV6_SUFFIX: &str = "_v6";

/// IP address family of a backing-store object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpFamily {
    /// IPv4 addresses (including IPv4-mapped IPv6 addresses).
    V4,
    /// IPv6 addresses.
    V6,
}

impl IpFamily {
    /// Classify an address.
    ///
    /// `::ffff:a.b.c.d` is treated as IPv4, the same way the backing store's
    /// peers render it.
    pub fn of(ip: &IpAddr) -> Self {
        match ip.to_canonical() {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// Name suffix used for this family.
    pub const fn suffix(self) -> &'static str {
        match self {
            IpFamily::V4 => IPV4_SUFFIX,
            IpFamily::V6 => IPV6_SUFFIX,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "v4"),
            IpFamily::V6 => write!(f, "v6"),
        }
    }
}

/// Canonical string form of a member IP, used as the membership key and as
/// the value written to the backing store.
pub fn ip_key(ip: &IpAddr) -> String {
    ip.to_canonical().to_string()
}

/// Split a list of IPs into `(v4, v6)`, preserving input order.
pub fn split_ips_by_family(ips: &[IpAddr]) -> (Vec<IpAddr>, Vec<IpAddr>) {
    let mut v4 = Vec::new();
    let mut v6 = Vec::new();
    for ip in ips {
        match IpFamily::of(ip) {
            IpFamily::V4 => v4.push(ip.to_canonical()),
            IpFamily::V6 => v6.push(*ip),
        }
    }
    (v4, v6)
}

/// Render IPs as a sorted, quoted, space-separated list for log lines.
pub fn join_ips(ips: &[IpAddr]) -> String {
    let mut list: Vec<String> = ips.iter().map(|ip| format!("\"{}\"", ip_key(ip))).collect();
    list.sort();
    list.join(" ")
}
