//! # Address Set Factory
//!
//! Builds dual-stack handles and works on the store by logical name.
//!
//! The factory holds no mutable state: a shared store handle and an
//! immutable family configuration. It can be cloned and used from any
//! thread.

use super::address_set::DualStackAddressSet;
use super::family_set::{destroy_in_store, FamilySet};
use crate::domain::{
    family_name, family_names, hash_for_store, normalize_legacy_name, split_ips_by_family,
    split_namespace, AddressSetConfig, AddressSetError, IpFamily, StoreError,
};
use crate::ports::inbound::AddressSetFactoryApi;
use crate::ports::outbound::AddressSetStore;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{trace, warn};

/// Factory for address sets backed by an `AddressSetStore`.
pub struct AddressSetFactory<S: AddressSetStore> {
    store: Arc<S>,
    config: AddressSetConfig,
}

impl<S: AddressSetStore> Clone for AddressSetFactory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<S: AddressSetStore> AddressSetFactory<S> {
    pub fn new(store: Arc<S>, config: AddressSetConfig) -> Self {
        if config.enabled_families().is_empty() {
            warn!("no IP family enabled; address sets will have no backing objects");
        }
        Self { store, config }
    }

    pub fn config(&self) -> &AddressSetConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn family_set(
        &self,
        name: &str,
        family: IpFamily,
        ips: &[IpAddr],
    ) -> Result<Option<FamilySet<S>>, AddressSetError> {
        if !self.config.is_enabled(family) {
            return Ok(None);
        }
        FamilySet::create_or_adopt(
            Arc::clone(&self.store),
            family_name(name, family),
            family,
            ips,
        )
        .map(Some)
    }
}

impl<S: AddressSetStore> AddressSetFactoryApi for AddressSetFactory<S> {
    type Set = DualStackAddressSet<S>;

    fn new_address_set(&self, name: &str, ips: &[IpAddr]) -> Result<Self::Set, AddressSetError> {
        let (v4_ips, v6_ips) = split_ips_by_family(ips);
        let v4 = self.family_set(name, IpFamily::V4, &v4_ips)?;
        let v6 = self.family_set(name, IpFamily::V6, &v6_ips)?;
        Ok(DualStackAddressSet::new(name.to_string(), v4, v6))
    }

    /// Visit every distinct logical set as `(name, namespace, suffix)`.
    ///
    /// Records without a string `name` external id are skipped. The v4 and
    /// v6 records of one set collapse into a single visit. A list that comes
    /// back not-found, or a schema without address sets, counts as empty.
    fn for_each_address_set<F>(&self, mut visit: F) -> Result<(), AddressSetError>
    where
        F: FnMut(&str, &str, &str),
    {
        let records = match self.store.list() {
            Ok(records) => records,
            Err(StoreError::NotFound) | Err(StoreError::SchemaUnavailable) => Vec::new(),
            Err(source) => return Err(AddressSetError::List { source }),
        };

        let mut processed = HashSet::new();
        for record in &records {
            let Some(raw) = record.set_name() else {
                trace!(hash = %record.name, "skipping address set without a name");
                continue;
            };
            let name = normalize_legacy_name(raw);
            if !processed.insert(name.to_string()) {
                continue;
            }
            let (namespace, suffix) = split_namespace(name);
            visit(name, namespace, suffix);
        }
        Ok(())
    }

    /// Delete by name without a handle.
    ///
    /// Legacy sets were keyed by the bare name, so the raw name is deleted
    /// first, then the v4 and v6 names. Missing objects are fine.
    fn destroy_address_set_in_backing_store(&self, name: &str) -> Result<(), AddressSetError> {
        let (v4_name, v6_name) = family_names(name);
        for target in [name, v4_name.as_str(), v6_name.as_str()] {
            let hash = hash_for_store(target);
            destroy_in_store(&*self.store, &hash, &format!("{target}/{hash}"))?;
        }
        Ok(())
    }
}
