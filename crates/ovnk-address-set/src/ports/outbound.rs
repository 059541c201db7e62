//! # Outbound Ports (Driven Ports)
//!
//! The backing-store client this crate needs the host application to provide.
//!
//! The store follows a build-then-execute protocol: `create`, `update` and
//! `delete` only build a command (and may fail doing so); `execute` runs it.
//!
//! Production: a northbound database client.
//! Testing: `InMemoryAddressSetStore` (adapters/memory.rs)

use crate::domain::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Metadata attached to a record when writing.
pub type ExternalIds = BTreeMap<String, String>;

/// Key under which the readable set name is stored.
pub const NAME_EXTERNAL_ID: &str = "name";

/// An address-set record as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSetRecord {
    /// Store-assigned row identifier.
    pub uuid: String,
    /// Hashed identifier the record is keyed by.
    pub name: String,
    /// Member addresses in string form.
    pub addresses: Vec<String>,
    /// Free-form metadata. Values are not guaranteed to be strings.
    pub external_ids: BTreeMap<String, Value>,
}

impl AddressSetRecord {
    /// The readable name from `external_ids["name"]`, if present and a string.
    pub fn set_name(&self) -> Option<&str> {
        self.external_ids
            .get(NAME_EXTERNAL_ID)
            .and_then(Value::as_str)
    }
}

/// A built, not yet executed, store command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreCommand {
    /// Insert a new address set.
    Create {
        name: String,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    },
    /// Overwrite the members and metadata of an existing address set.
    Update {
        name: String,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    },
    /// Remove an address set.
    Delete { name: String },
}

impl StoreCommand {
    /// Hashed identifier the command targets.
    pub fn target(&self) -> &str {
        match self {
            StoreCommand::Create { name, .. }
            | StoreCommand::Update { name, .. }
            | StoreCommand::Delete { name } => name,
        }
    }

    /// Short operation name for diagnostics.
    pub fn kind(&self) -> StoreOp {
        match self {
            StoreCommand::Create { .. } => StoreOp::Create,
            StoreCommand::Update { .. } => StoreOp::Update,
            StoreCommand::Delete { .. } => StoreOp::Delete,
        }
    }
}

/// Store operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreOp {
    Get,
    List,
    Create,
    Update,
    Delete,
}

/// Abstract interface for the address-set table of the backing store.
///
/// All calls are synchronous request/response. Implementations must not
/// retry on their own; retry policy belongs to the caller.
pub trait AddressSetStore: Send + Sync {
    /// Read one address set by hashed identifier.
    ///
    /// Returns `StoreError::NotFound` when absent and
    /// `StoreError::SchemaUnavailable` on schemas without address sets.
    fn get(&self, name: &str) -> Result<AddressSetRecord, StoreError>;

    /// List every address set, in the store's native order.
    fn list(&self) -> Result<Vec<AddressSetRecord>, StoreError>;

    /// Build a command creating an address set.
    fn create(
        &self,
        name: &str,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    ) -> Result<StoreCommand, StoreError>;

    /// Build a command replacing members and metadata of an address set.
    ///
    /// Metadata is not merged by the store and must be supplied in full.
    fn update(
        &self,
        name: &str,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    ) -> Result<StoreCommand, StoreError>;

    /// Build a command deleting an address set.
    fn delete(&self, name: &str) -> Result<StoreCommand, StoreError>;

    /// Execute a previously built command.
    fn execute(&self, command: StoreCommand) -> Result<(), StoreError>;
}

impl<T: AddressSetStore + ?Sized> AddressSetStore for Arc<T> {
    fn get(&self, name: &str) -> Result<AddressSetRecord, StoreError> {
        (**self).get(name)
    }

    fn list(&self) -> Result<Vec<AddressSetRecord>, StoreError> {
        (**self).list()
    }

    fn create(
        &self,
        name: &str,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    ) -> Result<StoreCommand, StoreError> {
        (**self).create(name, addresses, external_ids)
    }

    fn update(
        &self,
        name: &str,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    ) -> Result<StoreCommand, StoreError> {
        (**self).update(name, addresses, external_ids)
    }

    fn delete(&self, name: &str) -> Result<StoreCommand, StoreError> {
        (**self).delete(name)
    }

    fn execute(&self, command: StoreCommand) -> Result<(), StoreError> {
        (**self).execute(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(external_ids: BTreeMap<String, Value>) -> AddressSetRecord {
        AddressSetRecord {
            uuid: "uuid-1".to_string(),
            name: "a1".to_string(),
            addresses: vec![],
            external_ids,
        }
    }

    #[test]
    fn test_set_name_requires_string() {
        let mut ids = BTreeMap::new();
        ids.insert("name".to_string(), json!("ns1_v4"));
        assert_eq!(record(ids).set_name(), Some("ns1_v4"));

        let mut ids = BTreeMap::new();
        ids.insert("name".to_string(), json!(42));
        assert_eq!(record(ids).set_name(), None);

        assert_eq!(record(BTreeMap::new()).set_name(), None);
    }

    #[test]
    fn test_command_target_and_kind() {
        let cmd = StoreCommand::Delete {
            name: "a42".to_string(),
        };
        assert_eq!(cmd.target(), "a42");
        assert_eq!(cmd.kind(), StoreOp::Delete);
    }
}
