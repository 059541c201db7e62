//! # Ports Layer
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (API exposed to controllers)
//! - `outbound.rs` - Driven ports (the backing-store client)

pub mod inbound;
pub mod outbound;

pub use inbound::{AddressSetApi, AddressSetFactoryApi};
pub use outbound::{
    AddressSetRecord, AddressSetStore, ExternalIds, StoreCommand, StoreOp, NAME_EXTERNAL_ID,
};
