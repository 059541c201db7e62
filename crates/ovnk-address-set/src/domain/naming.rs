//! # Naming and Hashing
//!
//! Maps a logical set name onto the identifiers the backing store accepts.
//!
//! The store restricts identifier characters and length, so every backing
//! object is keyed by a hash of its family-qualified name. The readable name
//! travels alongside in the record's `external_ids["name"]` and is the only
//! way back from a hash to a logical set.

use super::family::{IpFamily, IPV4_SUFFIX, IPV6_SUFFIX};
use fnv::FnvHasher;
use std::hash::Hasher;

/// Family-qualified name for one family.
pub fn family_name(logical_name: &str, family: IpFamily) -> String {
    format!("{}{}", logical_name, family.suffix())
}

/// `(v4, v6)` family-qualified names for a logical name.
pub fn family_names(logical_name: &str) -> (String, String) {
    (
        family_name(logical_name, IpFamily::V4),
        family_name(logical_name, IpFamily::V6),
    )
}

/// `(v4, v6)` hashed identifiers for a logical name.
pub fn hashed_family_names(logical_name: &str) -> (String, String) {
    let (v4, v6) = family_names(logical_name);
    (hash_for_store(&v4), hash_for_store(&v6))
}

/// Backing-store identifier for an arbitrary name.
///
/// 64-bit FNV-1a rendered as `a<decimal>`. The leading letter keeps the
/// identifier legal where the store rejects names starting with a digit.
pub fn hash_for_store(name: &str) -> String {
    let mut hasher = FnvHasher::default();
    hasher.write(name.as_bytes());
    format!("a{}", hasher.finish())
}

/// Strip a trailing `_v4` / `_v6` suffix.
///
/// Sets created before dual-stack naming carry the bare logical name and are
/// returned unchanged.
pub fn normalize_legacy_name(raw: &str) -> &str {
    raw.strip_suffix(IPV4_SUFFIX)
        .or_else(|| raw.strip_suffix(IPV6_SUFFIX))
        .unwrap_or(raw)
}

/// Split a normalized name of the form `namespace[.suffix1[.suffix2...]]`
/// into `(namespace, suffix1)`. The suffix is empty when there is no dot.
pub fn split_namespace(name: &str) -> (&str, &str) {
    let mut parts = name.split('.');
    let namespace = parts.next().unwrap_or_default();
    let suffix = parts.next().unwrap_or_default();
    (namespace, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fnv1a_reference_vectors() {
        assert_eq!(hash_for_store(""), "a14695981039346656037");
        assert_eq!(hash_for_store("a"), "a12638187200555641996");
    }

    #[test]
    fn test_family_hashes() {
        let (v4, v6) = hashed_family_names("ns1");
        assert_eq!(v4, "a3133185508601987396");
        assert_eq!(v6, "a3133187707625243818");
        assert_eq!(v4, hash_for_store("ns1_v4"));
        assert_eq!(hash_for_store("ns1.egress_v6"), hashed_family_names("ns1.egress").1);
    }

    #[test]
    fn test_family_names() {
        assert_eq!(
            family_names("ns1.egress"),
            ("ns1.egress_v4".to_string(), "ns1.egress_v6".to_string())
        );
    }

    #[test]
    fn test_normalize_legacy_name() {
        assert_eq!(normalize_legacy_name("ns1_v4"), "ns1");
        assert_eq!(normalize_legacy_name("ns1_v6"), "ns1");
        assert_eq!(normalize_legacy_name("ns1"), "ns1");
        assert_eq!(normalize_legacy_name("ns1_v4_v6"), "ns1_v4");
        assert_eq!(normalize_legacy_name("_v4"), "");
    }

    #[test]
    fn test_split_namespace() {
        assert_eq!(split_namespace("ns1"), ("ns1", ""));
        assert_eq!(split_namespace("ns1.egress"), ("ns1", "egress"));
        assert_eq!(split_namespace("ns1.egress.extra"), ("ns1", "egress"));
        assert_eq!(split_namespace(""), ("", ""));
    }

    proptest! {
        #[test]
        fn prop_hash_is_deterministic(name in ".*") {
            prop_assert_eq!(hash_for_store(&name), hash_for_store(&name));
        }

        #[test]
        fn prop_hash_is_store_legal(name in ".*") {
            let hash = hash_for_store(&name);
            prop_assert!(hash.starts_with('a'));
            prop_assert!(hash[1..].chars().all(|c| c.is_ascii_digit()));
        }

        #[test]
        fn prop_family_names_differ(name in ".+") {
            let (v4, v6) = family_names(&name);
            prop_assert_ne!(&v4, &v6);
            prop_assert_eq!(normalize_legacy_name(&v4), name.as_str());
            prop_assert_eq!(normalize_legacy_name(&v6), name.as_str());
        }
    }
}
