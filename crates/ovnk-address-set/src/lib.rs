//! # OVN-Kubernetes Address Sets
//!
//! Dual-stack address sets mirrored into the logical-network northbound
//! database, where ACLs and routing policies reference them by hashed name.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `naming`: family-qualified names and store-safe hashed identifiers
//!   - `family`: IPv4/IPv6 classification
//!   - `membership`: cached membership and diffing
//!   - `AddressSetConfig`: which families are enabled
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `AddressSetApi` / `AddressSetFactoryApi`: Driving ports
//!   - `AddressSetStore`: Driven port (the northbound database client)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `FamilySet`: one backing object per family
//!   - `DualStackAddressSet`: the handle callers hold
//!   - `AddressSetFactory`: construction, enumeration, cleanup by name
//!
//! - **Adapters Layer** (`adapters/`)
//!   - `InMemoryAddressSetStore`: in-memory store with call recording
//!
//! ## Invariants
//!
//! - A family's cached membership equals what was last written to the store.
//! - Identical logical names always hash to identical identifiers.
//! - Mutations on one handle are serialized; families are not transactional.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ovnk_address_set::{
//!     AddressSetApi, AddressSetConfig, AddressSetFactory, AddressSetFactoryApi,
//!     InMemoryAddressSetStore,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryAddressSetStore::new());
//! let factory = AddressSetFactory::new(store, AddressSetConfig::dual_stack());
//!
//! let set = factory.new_address_set("ns1", &["10.0.0.1".parse()?])?;
//! set.add_ips(&["2001:db8::1".parse()?])?;
//! let (v4_hash, v6_hash) = set.hash_names();
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenience
pub use adapters::{FaultPhase, InMemoryAddressSetStore};
pub use domain::{
    family_names, hash_for_store, hashed_family_names, normalize_legacy_name,
    split_ips_by_family, AddressSetConfig, AddressSetError, IpFamily, Membership, StoreError,
};
pub use ports::{
    AddressSetApi, AddressSetFactoryApi, AddressSetRecord, AddressSetStore, ExternalIds,
    StoreCommand, StoreOp,
};
pub use service::{AddressSetFactory, DualStackAddressSet, FamilySet};
