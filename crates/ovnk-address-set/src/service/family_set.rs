//! # Per-Family Address Set
//!
//! One backing-store object for one address family.
//!
//! ## Invariant
//!
//! `members` always equals what was last successfully written to the store
//! under `hash_name`. It changes only after `execute` succeeds.
//!
//! Every mutation reduces to a single full-replace `update`. The store has no
//! incremental add/remove command here; the cache is authoritative enough to
//! compute the replacement.

use crate::domain::{
    hash_for_store, join_ips, AddressSetError, IpFamily, Membership, StoreError,
};
use crate::ports::outbound::{AddressSetStore, ExternalIds, NAME_EXTERNAL_ID};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Address set for a single family, keyed in the store by `hash_name`.
pub struct FamilySet<S: AddressSetStore> {
    name: String,
    hash_name: String,
    family: IpFamily,
    uuid: String,
    members: Membership,
    destroyed: bool,
    store: Arc<S>,
}

impl<S: AddressSetStore> FamilySet<S> {
    /// Create the backing object, or adopt it if it already exists.
    ///
    /// An existing object (left by an earlier run) is converged to `ips`
    /// with a replace instead of being recreated, so construction is
    /// idempotent across restarts.
    pub fn create_or_adopt(
        store: Arc<S>,
        name: String,
        family: IpFamily,
        ips: &[IpAddr],
    ) -> Result<Self, AddressSetError> {
        let hash_name = hash_for_store(&name);
        let mut set = Self {
            name,
            hash_name,
            family,
            uuid: String::new(),
            members: Membership::new(),
            destroyed: false,
            store,
        };

        match set.store.get(&set.hash_name) {
            Ok(existing) => {
                set.uuid = existing.uuid;
                debug!(set = %set.detail(), "New() already exists; updating IPs");
                set.replace(ips)?;
            }
            Err(StoreError::NotFound) | Err(StoreError::SchemaUnavailable) => {
                set.create(ips)?;
            }
            Err(source) => {
                return Err(AddressSetError::Lookup {
                    name: set.name,
                    source,
                });
            }
        }

        debug!(set = %set.detail(), ips = %join_ips(ips), "New() address set");
        Ok(set)
    }

    fn create(&mut self, ips: &[IpAddr]) -> Result<(), AddressSetError> {
        let members = Membership::from_ips(ips);
        let command = self
            .store
            .create(&self.hash_name, members.to_strings(), self.external_ids())
            .map_err(|source| AddressSetError::CommandBuild {
                operation: "create",
                detail: self.detail(),
                source,
            })?;
        self.store
            .execute(command)
            .map_err(|source| AddressSetError::Execute {
                operation: "create",
                detail: self.detail(),
                source,
            })?;
        self.members = members;
        Ok(())
    }

    /// Replace membership with exactly `ips`, disregarding current state.
    pub fn replace(&mut self, ips: &[IpAddr]) -> Result<(), AddressSetError> {
        self.ensure_live()?;
        self.write(Membership::from_ips(ips))
    }

    /// Add the IPs that are not yet members. No store call when nothing is
    /// new.
    pub fn add(&mut self, ips: &[IpAddr]) -> Result<(), AddressSetError> {
        self.ensure_live()?;
        let missing = self.members.missing(ips);
        if missing.is_empty() {
            return Ok(());
        }

        debug!(set = %self.detail(), ips = %join_ips(&missing), "adding IPs to address set");
        let next = self.members.union(&missing);
        self.write(next)
    }

    /// Remove `ips`. Non-members are ignored, and the replace is issued even
    /// when nothing changes.
    pub fn delete(&mut self, ips: &[IpAddr]) -> Result<(), AddressSetError> {
        self.ensure_live()?;
        debug!(set = %self.detail(), ips = %join_ips(ips), "deleting IPs from address set");
        let next = self.members.without(ips);
        self.write(next)
    }

    /// Delete the backing object. Not-found counts as success. After this
    /// the set rejects mutation; `destroy` itself may be repeated.
    pub fn destroy(&mut self) -> Result<(), AddressSetError> {
        debug!(set = %self.detail(), "destroy()");
        destroy_in_store(&*self.store, &self.hash_name, &self.detail())?;
        self.members = Membership::new();
        self.destroyed = true;
        Ok(())
    }

    fn write(&mut self, next: Membership) -> Result<(), AddressSetError> {
        let command = self
            .store
            .update(&self.hash_name, next.to_strings(), self.external_ids())
            .map_err(|source| AddressSetError::CommandBuild {
                operation: "update",
                detail: self.detail(),
                source,
            })?;
        self.store
            .execute(command)
            .map_err(|source| AddressSetError::Execute {
                operation: "update",
                detail: self.detail(),
                source,
            })?;
        self.members = next;
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), AddressSetError> {
        if self.destroyed {
            return Err(AddressSetError::Destroyed {
                detail: self.detail(),
            });
        }
        Ok(())
    }

    // The store does not merge metadata, so it goes out with every write.
    fn external_ids(&self) -> ExternalIds {
        let mut ids = ExternalIds::new();
        ids.insert(NAME_EXTERNAL_ID.to_string(), self.name.clone());
        ids
    }

    /// `uuid/name/hash`, for logs and errors.
    pub fn detail(&self) -> String {
        format!("{}/{}/{}", self.uuid, self.name, self.hash_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash_name(&self) -> &str {
        &self.hash_name
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// Store uuid, known only when an existing object was adopted.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn members(&self) -> &Membership {
        &self.members
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Delete `hash_name` from the store, treating not-found as success.
pub(crate) fn destroy_in_store<S: AddressSetStore + ?Sized>(
    store: &S,
    hash_name: &str,
    detail: &str,
) -> Result<(), AddressSetError> {
    let command = store
        .delete(hash_name)
        .map_err(|source| AddressSetError::CommandBuild {
            operation: "delete",
            detail: detail.to_string(),
            source,
        })?;
    match store.execute(command) {
        Ok(()) | Err(StoreError::NotFound) => Ok(()),
        Err(source) => Err(AddressSetError::Execute {
            operation: "destroy",
            detail: detail.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FaultPhase, InMemoryAddressSetStore};
    use crate::ports::outbound::{StoreCommand, StoreOp};

    fn ips(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn new_set(
        store: &Arc<InMemoryAddressSetStore>,
        list: &[&str],
    ) -> FamilySet<InMemoryAddressSetStore> {
        FamilySet::create_or_adopt(store.clone(), "ns1_v4".to_string(), IpFamily::V4, &ips(list))
            .unwrap()
    }

    #[test]
    fn test_create_deduplicates() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        let set = new_set(&store, &["10.0.0.1", "10.0.0.1"]);

        let hash = hash_for_store("ns1_v4");
        assert_eq!(set.hash_name(), hash);
        assert_eq!(
            store.executed(),
            vec![StoreCommand::Create {
                name: hash.clone(),
                addresses: vec!["10.0.0.1".to_string()],
                external_ids: set.external_ids(),
            }]
        );
        assert_eq!(set.members().to_strings(), vec!["10.0.0.1"]);
        assert_eq!(set.uuid(), "");
    }

    #[test]
    fn test_adopt_existing_replaces() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        let hash = hash_for_store("ns1_v4");
        let uuid = store.seed(&hash, "ns1_v4", &["10.0.0.9"]);

        let set = new_set(&store, &["10.0.0.1"]);

        assert_eq!(set.uuid(), uuid);
        assert!(set.detail().starts_with(&uuid));
        assert_eq!(store.call_count(StoreOp::Create), 0);
        assert_eq!(store.call_count(StoreOp::Update), 1);
        assert_eq!(store.addresses(&hash), Some(vec!["10.0.0.1".to_string()]));
    }

    #[test]
    fn test_schema_unavailable_creates() {
        let store = Arc::new(InMemoryAddressSetStore::without_schema());
        let set = new_set(&store, &["10.0.0.1"]);

        assert_eq!(store.call_count(StoreOp::Create), 1);
        assert!(store.contains(set.hash_name()));
    }

    #[test]
    fn test_lookup_error_is_fatal() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        store.fail(
            StoreOp::Get,
            None,
            FaultPhase::Execute,
            StoreError::Unavailable("connection reset".to_string()),
        );

        let result =
            FamilySet::create_or_adopt(store.clone(), "ns1_v4".to_string(), IpFamily::V4, &[]);
        assert!(matches!(result, Err(AddressSetError::Lookup { .. })));
        assert_eq!(store.call_count(StoreOp::Create), 0);
    }

    #[test]
    fn test_create_build_failure() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        store.fail(
            StoreOp::Create,
            None,
            FaultPhase::Build,
            StoreError::Unavailable("no leader".to_string()),
        );

        let result =
            FamilySet::create_or_adopt(store.clone(), "ns1_v4".to_string(), IpFamily::V4, &[]);
        match result {
            Err(AddressSetError::CommandBuild {
                operation: "create",
                detail,
                ..
            }) => assert_eq!(detail, format!("/ns1_v4/{}", hash_for_store("ns1_v4"))),
            other => panic!("unexpected result: {:?}", other.map(|s| s.detail())),
        }
        assert!(store.executed().is_empty());
    }

    #[test]
    fn test_add_skips_existing_members() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        let mut set = new_set(&store, &["10.0.0.1"]);
        store.reset_calls();

        set.add(&ips(&["10.0.0.1"])).unwrap();
        assert!(store.executed().is_empty());

        set.add(&ips(&["10.0.0.2", "10.0.0.1"])).unwrap();
        assert_eq!(store.executed().len(), 1);
        assert_eq!(
            store.addresses(set.hash_name()),
            Some(vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()])
        );
    }

    #[test]
    fn test_delete_always_replaces() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        let mut set = new_set(&store, &["10.0.0.1", "10.0.0.2"]);
        store.reset_calls();

        set.delete(&ips(&["10.0.0.9"])).unwrap();
        assert_eq!(store.call_count(StoreOp::Update), 1);
        assert_eq!(set.members().len(), 2);

        set.delete(&ips(&["10.0.0.1", "10.0.0.9"])).unwrap();
        assert_eq!(set.members().to_strings(), vec!["10.0.0.2"]);
        assert_eq!(
            store.addresses(set.hash_name()),
            Some(vec!["10.0.0.2".to_string()])
        );
    }

    #[test]
    fn test_failed_replace_keeps_cache() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        let mut set = new_set(&store, &["10.0.0.1"]);
        store.fail(
            StoreOp::Update,
            None,
            FaultPhase::Execute,
            StoreError::Rejected("txn aborted".to_string()),
        );

        let err = set.replace(&ips(&["10.0.0.5"])).unwrap_err();
        assert!(matches!(err, AddressSetError::Execute { .. }));
        assert_eq!(set.members().to_strings(), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_destroy_tolerates_not_found_and_blocks_mutation() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        let mut set = new_set(&store, &["10.0.0.1"]);

        set.destroy().unwrap();
        assert!(!store.contains(set.hash_name()));
        assert!(set.members().is_empty());

        // Second destroy hits not-found in the store and still succeeds.
        set.destroy().unwrap();

        let err = set.add(&ips(&["10.0.0.2"])).unwrap_err();
        assert!(matches!(err, AddressSetError::Destroyed { .. }));
        assert!(set.replace(&[]).is_err());
        assert!(set.delete(&[]).is_err());
    }

    #[test]
    fn test_destroy_surfaces_other_errors() {
        let store = Arc::new(InMemoryAddressSetStore::new());
        let mut set = new_set(&store, &["10.0.0.1"]);
        store.fail(
            StoreOp::Delete,
            None,
            FaultPhase::Execute,
            StoreError::Rejected("referenced by ACL".to_string()),
        );

        assert!(set.destroy().is_err());
        assert!(!set.is_destroyed());
        assert_eq!(set.members().len(), 1);
    }
}
