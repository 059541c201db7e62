//! # Dual-Stack Address Set
//!
//! Pairs zero, one or two per-family sets under one logical name.
//!
//! ## Locking
//!
//! A single mutex guards both families, so a mutation never interleaves with
//! another on the same handle. The name and hashed identifiers are fixed at
//! construction and are read without the lock.
//!
//! ## Failure Policy
//!
//! - `set_ips`, `add_ips`, `delete_ips`: v6 then v4, best-effort. Both
//!   families are attempted; failures come back as one error naming the
//!   failed family (or both).
//! - `destroy`: v4 then v6, fail-fast.
//!
//! Once `destroy` succeeds the handle rejects every mutation with
//! `Destroyed`, including empty input and handles with no enabled family.
//!
//! There is no cross-family transaction. After a partial failure the two
//! families may disagree until the caller retries.

use super::family_set::FamilySet;
use crate::domain::{split_ips_by_family, AddressSetError, IpFamily};
use crate::ports::inbound::AddressSetApi;
use crate::ports::outbound::AddressSetStore;
use parking_lot::Mutex;
use std::net::IpAddr;
use tracing::warn;

struct FamilySets<S: AddressSetStore> {
    v4: Option<FamilySet<S>>,
    v6: Option<FamilySet<S>>,
    destroyed: bool,
}

/// Dual-stack address set handle returned by the factory.
pub struct DualStackAddressSet<S: AddressSetStore> {
    name: String,
    v4_hash: String,
    v6_hash: String,
    sets: Mutex<FamilySets<S>>,
}

impl<S: AddressSetStore> DualStackAddressSet<S> {
    pub(crate) fn new(name: String, v4: Option<FamilySet<S>>, v6: Option<FamilySet<S>>) -> Self {
        let v4_hash = v4.as_ref().map(|s| s.hash_name().to_string()).unwrap_or_default();
        let v6_hash = v6.as_ref().map(|s| s.hash_name().to_string()).unwrap_or_default();
        Self {
            name,
            v4_hash,
            v6_hash,
            sets: Mutex::new(FamilySets {
                v4,
                v6,
                destroyed: false,
            }),
        }
    }

    /// Cached members of one family, or `None` when the family is disabled.
    pub fn members(&self, family: IpFamily) -> Option<Vec<IpAddr>> {
        let sets = self.sets.lock();
        let set = match family {
            IpFamily::V4 => sets.v4.as_ref(),
            IpFamily::V6 => sets.v6.as_ref(),
        };
        set.map(|s| s.members().ips())
    }

    /// Whether a backing object exists for `family`.
    pub fn has_family(&self, family: IpFamily) -> bool {
        match family {
            IpFamily::V4 => !self.v4_hash.is_empty(),
            IpFamily::V6 => !self.v6_hash.is_empty(),
        }
    }

    fn combine(
        &self,
        operation: &'static str,
        v6: Result<(), AddressSetError>,
        v4: Result<(), AddressSetError>,
    ) -> Result<(), AddressSetError> {
        let err = match (v6, v4) {
            (Ok(()), Ok(())) => return Ok(()),
            (Err(e), Ok(())) => family_error(operation, IpFamily::V6, e),
            (Ok(()), Err(e)) => family_error(operation, IpFamily::V4, e),
            (Err(v6), Err(v4)) => AddressSetError::BothFamilies {
                operation,
                v6: Box::new(v6),
                v4: Box::new(v4),
            },
        };
        warn!(set = %self.name, error = %err, "address set update partially failed");
        Err(err)
    }

    /// Run `op` on each enabled family, v6 first, then combine the results.
    ///
    /// With `skip_empty`, an empty `ips` makes no store call.
    fn for_each_family<F>(
        &self,
        operation: &'static str,
        ips: &[IpAddr],
        skip_empty: bool,
        mut op: F,
    ) -> Result<(), AddressSetError>
    where
        F: FnMut(&mut FamilySet<S>, &[IpAddr]) -> Result<(), AddressSetError>,
    {
        let mut sets = self.sets.lock();
        if sets.destroyed {
            return Err(AddressSetError::Destroyed {
                detail: self.name.clone(),
            });
        }
        if skip_empty && ips.is_empty() {
            return Ok(());
        }
        let (v4_ips, v6_ips) = split_ips_by_family(ips);

        let v6 = match sets.v6.as_mut() {
            Some(set) => op(set, v6_ips.as_slice()),
            None => Ok(()),
        };
        let v4 = match sets.v4.as_mut() {
            Some(set) => op(set, v4_ips.as_slice()),
            None => Ok(()),
        };
        drop(sets);

        self.combine(operation, v6, v4)
    }
}

fn family_error(
    operation: &'static str,
    family: IpFamily,
    source: AddressSetError,
) -> AddressSetError {
    AddressSetError::Family {
        operation,
        family,
        source: Box::new(source),
    }
}

impl<S: AddressSetStore> AddressSetApi for DualStackAddressSet<S> {
    fn hash_names(&self) -> (String, String) {
        (self.v4_hash.clone(), self.v6_hash.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn add_ips(&self, ips: &[IpAddr]) -> Result<(), AddressSetError> {
        self.for_each_family("AddIPs", ips, true, |set, ips| set.add(ips))
    }

    fn set_ips(&self, ips: &[IpAddr]) -> Result<(), AddressSetError> {
        self.for_each_family("SetIPs", ips, false, |set, ips| set.replace(ips))
    }

    fn delete_ips(&self, ips: &[IpAddr]) -> Result<(), AddressSetError> {
        self.for_each_family("DeleteIPs", ips, true, |set, ips| set.delete(ips))
    }

    fn destroy(&self) -> Result<(), AddressSetError> {
        let mut sets = self.sets.lock();
        if let Some(set) = sets.v4.as_mut() {
            set.destroy()
                .map_err(|e| family_error("Destroy", IpFamily::V4, e))?;
        }
        if let Some(set) = sets.v6.as_mut() {
            set.destroy()
                .map_err(|e| family_error("Destroy", IpFamily::V6, e))?;
        }
        sets.destroyed = true;
        Ok(())
    }
}

impl<S: AddressSetStore> std::fmt::Debug for DualStackAddressSet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualStackAddressSet")
            .field("name", &self.name)
            .field("v4_hash", &self.v4_hash)
            .field("v6_hash", &self.v6_hash)
            .finish()
    }
}
