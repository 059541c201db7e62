//! # Membership Cache
//!
//! Pure diff logic over one family's members. Keys are the canonical string
//! form of each address so that duplicates collapse regardless of how the
//! caller spelled them.

use super::family::ip_key;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Members of one backing object, keyed by string form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    ips: BTreeMap<String, IpAddr>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a deduplicated membership from a list of IPs.
    pub fn from_ips(ips: &[IpAddr]) -> Self {
        let ips = ips
            .iter()
            .map(|ip| (ip_key(ip), ip.to_canonical()))
            .collect();
        Self { ips }
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.ips.contains_key(&ip_key(ip))
    }

    /// Members as IPs, sorted by string form.
    pub fn ips(&self) -> Vec<IpAddr> {
        self.ips.values().copied().collect()
    }

    /// Members as the strings written to the backing store.
    pub fn to_strings(&self) -> Vec<String> {
        self.ips.keys().cloned().collect()
    }

    /// IPs from `ips` that are not yet members, deduplicated.
    pub fn missing(&self, ips: &[IpAddr]) -> Vec<IpAddr> {
        let mut seen = BTreeMap::new();
        for ip in ips {
            let key = ip_key(ip);
            if !self.ips.contains_key(&key) {
                seen.entry(key).or_insert_with(|| ip.to_canonical());
            }
        }
        seen.into_values().collect()
    }

    /// Membership that would result from adding `ips`.
    pub fn union(&self, ips: &[IpAddr]) -> Membership {
        let mut next = self.clone();
        for ip in ips {
            next.ips.insert(ip_key(ip), ip.to_canonical());
        }
        next
    }

    /// Membership that would result from removing `ips`. IPs that are not
    /// members are ignored.
    pub fn without(&self, ips: &[IpAddr]) -> Membership {
        let mut next = self.clone();
        for ip in ips {
            next.ips.remove(&ip_key(ip));
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ips(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_from_ips_deduplicates() {
        let m = Membership::from_ips(&ips(&["10.0.0.1", "10.0.0.1", "10.0.0.2"]));
        assert_eq!(m.len(), 2);
        assert_eq!(m.to_strings(), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_missing_skips_members_and_duplicates() {
        let m = Membership::from_ips(&ips(&["10.0.0.1"]));

        let missing = m.missing(&ips(&["10.0.0.1", "10.0.0.2", "10.0.0.2"]));
        assert_eq!(missing, ips(&["10.0.0.2"]));

        assert!(m.missing(&ips(&["10.0.0.1"])).is_empty());
    }

    #[test]
    fn test_without_ignores_absent() {
        let m = Membership::from_ips(&ips(&["10.0.0.1", "10.0.0.2"]));

        let next = m.without(&ips(&["10.0.0.2", "10.0.0.9"]));
        assert_eq!(next.to_strings(), vec!["10.0.0.1"]);
        // Original is untouched.
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_union_and_mapped_addresses() {
        let m = Membership::from_ips(&ips(&["10.0.0.1"]));
        let next = m.union(&ips(&["::ffff:10.0.0.1", "10.0.0.3"]));

        assert_eq!(next.to_strings(), vec!["10.0.0.1", "10.0.0.3"]);
        assert!(next.contains(&"::ffff:10.0.0.3".parse().unwrap()));
    }
}
