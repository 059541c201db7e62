//! # In-Memory Address Set Store
//!
//! Implements `AddressSetStore` over a `Vec` of records so enumeration keeps
//! insertion order, like the real table's native order.
//!
//! Every call is recorded, and failures can be injected per operation and
//! hashed name, which lets tests assert exact write counts and exercise the
//! error paths without a live database.

use crate::domain::StoreError;
use crate::ports::outbound::{
    AddressSetRecord, AddressSetStore, ExternalIds, StoreCommand, StoreOp, NAME_EXTERNAL_ID,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;
use uuid::Uuid;

/// Where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPhase {
    /// When the command is built (`create` / `update` / `delete`).
    Build,
    /// When the command is executed, or on `get` / `list`.
    Execute,
}

#[derive(Debug, Clone)]
struct Fault {
    op: StoreOp,
    name: Option<String>,
    phase: FaultPhase,
    error: StoreError,
}

impl Fault {
    fn matches(&self, op: StoreOp, name: &str, phase: FaultPhase) -> bool {
        self.op == op
            && self.phase == phase
            && self.name.as_deref().map_or(true, |n| n == name)
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<AddressSetRecord>,
    calls: Vec<(StoreOp, String)>,
    executed: Vec<StoreCommand>,
    faults: Vec<Fault>,
    schema_unavailable: bool,
}

impl Inner {
    fn position(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.name == name)
    }

    fn fault(&self, op: StoreOp, name: &str, phase: FaultPhase) -> Result<(), StoreError> {
        match self.faults.iter().find(|f| f.matches(op, name, phase)) {
            Some(fault) => Err(fault.error.clone()),
            None => Ok(()),
        }
    }
}

/// In-memory backing store for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryAddressSetStore {
    inner: Mutex<Inner>,
}

impl InMemoryAddressSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose schema predates address sets: `get` and `list` report
    /// `SchemaUnavailable`, commands still execute.
    pub fn without_schema() -> Self {
        let store = Self::new();
        store.inner.lock().schema_unavailable = true;
        store
    }

    /// Insert a record directly, bypassing call recording. Returns its uuid.
    pub fn seed(&self, hashed_name: &str, set_name: &str, addresses: &[&str]) -> String {
        let mut external_ids = BTreeMap::new();
        external_ids.insert(
            NAME_EXTERNAL_ID.to_string(),
            Value::String(set_name.to_string()),
        );
        self.seed_record(
            hashed_name,
            addresses.iter().map(|a| a.to_string()).collect(),
            external_ids,
        )
    }

    /// Insert a record with arbitrary metadata. Returns its uuid.
    pub fn seed_record(
        &self,
        hashed_name: &str,
        addresses: Vec<String>,
        external_ids: BTreeMap<String, Value>,
    ) -> String {
        let uuid = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock();
        if let Some(pos) = inner.position(hashed_name) {
            inner.records.remove(pos);
        }
        inner.records.push(AddressSetRecord {
            uuid: uuid.clone(),
            name: hashed_name.to_string(),
            addresses,
            external_ids,
        });
        uuid
    }

    /// Make `op` fail with `error` for `name` (or every name when `None`)
    /// until `clear_faults` is called.
    pub fn fail(&self, op: StoreOp, name: Option<&str>, phase: FaultPhase, error: StoreError) {
        self.inner.lock().faults.push(Fault {
            op,
            name: name.map(str::to_string),
            phase,
            error,
        });
    }

    pub fn clear_faults(&self) {
        self.inner.lock().faults.clear();
    }

    /// Current record for a hashed name.
    pub fn record(&self, hashed_name: &str) -> Option<AddressSetRecord> {
        let inner = self.inner.lock();
        inner
            .position(hashed_name)
            .map(|pos| inner.records[pos].clone())
    }

    /// Sorted members of a hashed name, or `None` if the record is absent.
    pub fn addresses(&self, hashed_name: &str) -> Option<Vec<String>> {
        self.record(hashed_name).map(|r| {
            let mut addresses = r.addresses;
            addresses.sort();
            addresses
        })
    }

    pub fn contains(&self, hashed_name: &str) -> bool {
        self.inner.lock().position(hashed_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every command passed to `execute`, including ones that failed.
    pub fn executed(&self) -> Vec<StoreCommand> {
        self.inner.lock().executed.clone()
    }

    /// Executed commands targeting one hashed name.
    pub fn executed_for(&self, hashed_name: &str) -> Vec<StoreCommand> {
        self.inner
            .lock()
            .executed
            .iter()
            .filter(|c| c.target() == hashed_name)
            .cloned()
            .collect()
    }

    /// Every port call as `(operation, hashed name)`. `list` records an
    /// empty name; command builds are not recorded, executes are.
    pub fn calls(&self) -> Vec<(StoreOp, String)> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self, op: StoreOp) -> usize {
        self.inner.lock().calls.iter().filter(|(o, _)| *o == op).count()
    }

    /// Forget recorded calls and executed commands, keeping records.
    pub fn reset_calls(&self) {
        let mut inner = self.inner.lock();
        inner.calls.clear();
        inner.executed.clear();
    }

    fn build(&self, op: StoreOp, name: &str) -> Result<(), StoreError> {
        self.inner.lock().fault(op, name, FaultPhase::Build)
    }
}

fn to_values(external_ids: ExternalIds) -> BTreeMap<String, Value> {
    external_ids
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

impl AddressSetStore for InMemoryAddressSetStore {
    fn get(&self, name: &str) -> Result<AddressSetRecord, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push((StoreOp::Get, name.to_string()));
        inner.fault(StoreOp::Get, name, FaultPhase::Execute)?;
        if inner.schema_unavailable {
            return Err(StoreError::SchemaUnavailable);
        }
        inner
            .position(name)
            .map(|pos| inner.records[pos].clone())
            .ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Result<Vec<AddressSetRecord>, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push((StoreOp::List, String::new()));
        inner.fault(StoreOp::List, "", FaultPhase::Execute)?;
        if inner.schema_unavailable {
            return Err(StoreError::SchemaUnavailable);
        }
        Ok(inner.records.clone())
    }

    fn create(
        &self,
        name: &str,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    ) -> Result<StoreCommand, StoreError> {
        self.build(StoreOp::Create, name)?;
        Ok(StoreCommand::Create {
            name: name.to_string(),
            addresses,
            external_ids,
        })
    }

    fn update(
        &self,
        name: &str,
        addresses: Vec<String>,
        external_ids: ExternalIds,
    ) -> Result<StoreCommand, StoreError> {
        self.build(StoreOp::Update, name)?;
        Ok(StoreCommand::Update {
            name: name.to_string(),
            addresses,
            external_ids,
        })
    }

    fn delete(&self, name: &str) -> Result<StoreCommand, StoreError> {
        self.build(StoreOp::Delete, name)?;
        Ok(StoreCommand::Delete {
            name: name.to_string(),
        })
    }

    fn execute(&self, command: StoreCommand) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let op = command.kind();
        inner.calls.push((op, command.target().to_string()));
        inner.executed.push(command.clone());
        inner.fault(op, command.target(), FaultPhase::Execute)?;
        trace!(?op, target = command.target(), "executing store command");

        match command {
            StoreCommand::Create {
                name,
                addresses,
                external_ids,
            } => {
                if inner.position(&name).is_some() {
                    return Err(StoreError::Rejected(format!(
                        "address set {name} already exists"
                    )));
                }
                inner.records.push(AddressSetRecord {
                    uuid: Uuid::new_v4().to_string(),
                    name,
                    addresses,
                    external_ids: to_values(external_ids),
                });
                Ok(())
            }
            StoreCommand::Update {
                name,
                addresses,
                external_ids,
            } => {
                let pos = inner.position(&name).ok_or(StoreError::NotFound)?;
                let record = &mut inner.records[pos];
                record.addresses = addresses;
                record.external_ids = to_values(external_ids);
                Ok(())
            }
            StoreCommand::Delete { name } => {
                let pos = inner.position(&name).ok_or(StoreError::NotFound)?;
                inner.records.remove(pos);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(name: &str) -> ExternalIds {
        let mut ids = ExternalIds::new();
        ids.insert(NAME_EXTERNAL_ID.to_string(), name.to_string());
        ids
    }

    #[test]
    fn test_create_update_delete() {
        let store = InMemoryAddressSetStore::new();

        let cmd = store
            .create("a1", vec!["10.0.0.1".to_string()], ids("ns_v4"))
            .unwrap();
        store.execute(cmd).unwrap();
        assert_eq!(store.addresses("a1"), Some(vec!["10.0.0.1".to_string()]));
        assert_eq!(store.get("a1").unwrap().set_name(), Some("ns_v4"));

        let cmd = store.update("a1", vec![], ids("ns_v4")).unwrap();
        store.execute(cmd).unwrap();
        assert_eq!(store.addresses("a1"), Some(vec![]));

        let cmd = store.delete("a1").unwrap();
        store.execute(cmd).unwrap();
        assert!(store.is_empty());

        let cmd = store.delete("a1").unwrap();
        assert_eq!(store.execute(cmd), Err(StoreError::NotFound));
    }

    #[test]
    fn test_duplicate_create_is_rejected() {
        let store = InMemoryAddressSetStore::new();
        store.seed("a1", "ns_v4", &[]);

        let cmd = store.create("a1", vec![], ids("ns_v4")).unwrap();
        assert!(matches!(store.execute(cmd), Err(StoreError::Rejected(_))));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = InMemoryAddressSetStore::new();
        let cmd = store.update("a9", vec![], ids("x_v4")).unwrap();
        assert_eq!(store.execute(cmd), Err(StoreError::NotFound));
    }

    #[test]
    fn test_faults_by_phase_and_name() {
        let store = InMemoryAddressSetStore::new();
        store.fail(
            StoreOp::Create,
            Some("a1"),
            FaultPhase::Build,
            StoreError::Unavailable("down".to_string()),
        );

        assert!(store.create("a1", vec![], ids("x")).is_err());
        assert!(store.create("a2", vec![], ids("y")).is_ok());

        store.clear_faults();
        assert!(store.create("a1", vec![], ids("x")).is_ok());
    }

    #[test]
    fn test_without_schema() {
        let store = InMemoryAddressSetStore::without_schema();
        assert_eq!(store.get("a1"), Err(StoreError::SchemaUnavailable));
        assert_eq!(store.list(), Err(StoreError::SchemaUnavailable));
        assert_eq!(store.call_count(StoreOp::Get), 1);
        assert_eq!(store.call_count(StoreOp::List), 1);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let store = InMemoryAddressSetStore::new();
        store.seed("a2", "b_v4", &[]);
        store.seed("a1", "a_v4", &[]);

        let names: Vec<_> = store.list().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a2", "a1"]);
    }
}
