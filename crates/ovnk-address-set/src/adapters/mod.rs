//! # Adapters Module
//!
//! - `memory`: In-memory backing store with call recording and fault injection

pub mod memory;

pub use memory::{FaultPhase, InMemoryAddressSetStore};
