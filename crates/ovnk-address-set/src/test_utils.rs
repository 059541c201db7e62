use crate::adapters::InMemoryAddressSetStore;
use crate::domain::AddressSetConfig;
use crate::service::AddressSetFactory;
use std::net::IpAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness. Honors `RUST_LOG`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ips(list: &[&str]) -> Vec<IpAddr> {
    list.iter()
        .map(|s| s.parse().expect("test IP literal"))
        .collect()
}

pub fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn make_factory(
    config: AddressSetConfig,
) -> (
    Arc<InMemoryAddressSetStore>,
    AddressSetFactory<InMemoryAddressSetStore>,
) {
    init_test_logging();
    let store = Arc::new(InMemoryAddressSetStore::new());
    let factory = AddressSetFactory::new(Arc::clone(&store), config);
    (store, factory)
}
