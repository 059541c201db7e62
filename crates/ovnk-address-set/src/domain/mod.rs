//! # Domain Layer
//!
//! Pure logic: naming, family classification, membership diffs,
//! configuration and error types.
//!
//! RULES:
//! - No I/O operations
//! - No locking

pub mod config;
pub mod errors;
pub mod family;
pub mod membership;
pub mod naming;

pub use config::AddressSetConfig;
pub use errors::{AddressSetError, StoreError};
pub use family::{ip_key, join_ips, split_ips_by_family, IpFamily, IPV4_SUFFIX, IPV6_SUFFIX};
pub use membership::Membership;
pub use naming::{
    family_name, family_names, hash_for_store, hashed_family_names, normalize_legacy_name,
    split_namespace,
};
