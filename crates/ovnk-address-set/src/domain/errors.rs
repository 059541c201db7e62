//! # Errors
//!
//! - `StoreError` is what the backing-store port reports.
//! - `AddressSetError` is what callers of this crate see. It wraps store
//!   errors with the operation and the `uuid/name/hash` of the set involved.
//!
//! Only two store outcomes are ever swallowed: `NotFound` when deleting, and
//! `NotFound` / `SchemaUnavailable` when reading.

use super::family::IpFamily;
use thiserror::Error;

/// Errors reported by a backing-store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("object not found")]
    NotFound,

    /// The store's schema lacks the address-set query surface.
    #[error("schema does not support address sets")]
    SchemaUnavailable,

    /// The store could not be reached or the command could not be built.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the command.
    #[error("command rejected: {0}")]
    Rejected(String),

    #[error("internal store error: {0}")]
    Internal(String),
}

/// Errors returned by address-set operations.
#[derive(Debug, Error)]
pub enum AddressSetError {
    /// Building a backing-store command failed before execution.
    #[error("failed to build {operation} command for address set {detail}: {source}")]
    CommandBuild {
        operation: &'static str,
        detail: String,
        #[source]
        source: StoreError,
    },

    /// The backing store failed to execute a command.
    #[error("failed to execute {operation} for address set {detail}: {source}")]
    Execute {
        operation: &'static str,
        detail: String,
        #[source]
        source: StoreError,
    },

    /// Reading an address set failed with something other than not-found.
    #[error("failed to get address set {name:?}: {source}")]
    Lookup {
        name: String,
        #[source]
        source: StoreError,
    },

    /// Listing address sets failed.
    #[error("error reading address sets: {source}")]
    List {
        #[source]
        source: StoreError,
    },

    /// One family of a dual-stack set failed; the other may have succeeded.
    #[error("{operation} failed for the {family} set: {source}")]
    Family {
        operation: &'static str,
        family: IpFamily,
        #[source]
        source: Box<AddressSetError>,
    },

    /// Both families failed a best-effort operation.
    #[error("{operation} failed for both families: v6: {v6}; v4: {v4}")]
    BothFamilies {
        operation: &'static str,
        v6: Box<AddressSetError>,
        v4: Box<AddressSetError>,
    },

    /// The set was destroyed and can no longer be mutated.
    #[error("address set {detail} has been destroyed")]
    Destroyed { detail: String },
}

impl AddressSetError {
    /// Families that failed, for partial-failure errors.
    pub fn failed_families(&self) -> Vec<IpFamily> {
        match self {
            AddressSetError::Family { family, .. } => vec![*family],
            AddressSetError::BothFamilies { .. } => vec![IpFamily::V6, IpFamily::V4],
            _ => Vec::new(),
        }
    }

    /// Innermost store error, if the failure came from the backing store.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            AddressSetError::CommandBuild { source, .. }
            | AddressSetError::Execute { source, .. }
            | AddressSetError::Lookup { source, .. }
            | AddressSetError::List { source } => Some(source),
            AddressSetError::Family { source, .. } => source.store_error(),
            AddressSetError::BothFamilies { v6, .. } => v6.store_error(),
            AddressSetError::Destroyed { .. } => None,
        }
    }
}
