//! # Inbound Ports (Driving Ports)
//!
//! The API controllers use to manage address sets.

use crate::domain::AddressSetError;
use std::net::IpAddr;

/// A dual-stack address set handle.
///
/// Mutating calls are serialized per handle. After a successful `destroy`
/// every mutation fails with `AddressSetError::Destroyed`, even with empty
/// input or no enabled family.
pub trait AddressSetApi: Send + Sync {
    /// `(v4, v6)` hashed identifiers; empty for a disabled family.
    fn hash_names(&self) -> (String, String);

    /// The logical name the set was created with.
    fn name(&self) -> &str;

    /// Add IPs, writing only families that gain a member. Empty input makes
    /// no store call.
    fn add_ips(&self, ips: &[IpAddr]) -> Result<(), AddressSetError>;

    /// Replace membership with exactly `ips`, for every enabled family.
    fn set_ips(&self, ips: &[IpAddr]) -> Result<(), AddressSetError>;

    /// Remove IPs. IPs that are not members are ignored. Empty input makes
    /// no store call.
    fn delete_ips(&self, ips: &[IpAddr]) -> Result<(), AddressSetError>;

    /// Delete the backing objects, v4 first. Stops at the first failure and
    /// may be retried.
    fn destroy(&self) -> Result<(), AddressSetError>;
}

/// Creates, enumerates and removes address sets.
pub trait AddressSetFactoryApi: Send + Sync {
    type Set: AddressSetApi;

    /// Create (or adopt) the backing objects for `name` holding `ips`.
    fn new_address_set(&self, name: &str, ips: &[IpAddr]) -> Result<Self::Set, AddressSetError>;

    /// Visit every distinct logical set in the store as
    /// `(name, namespace, suffix)`.
    fn for_each_address_set<F>(&self, visit: F) -> Result<(), AddressSetError>
    where
        F: FnMut(&str, &str, &str);

    /// Delete the legacy, v4 and v6 backing objects for `name`.
    ///
    /// Must not be called while a handle for `name` is alive.
    fn destroy_address_set_in_backing_store(&self, name: &str) -> Result<(), AddressSetError>;
}
