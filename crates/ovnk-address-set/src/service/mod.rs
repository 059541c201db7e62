//! # Service Layer
//!
//! - `family_set`: one backing object per address family
//! - `address_set`: the dual-stack handle callers hold
//! - `factory`: construction, enumeration and by-name cleanup

pub mod address_set;
pub mod factory;
pub mod family_set;

pub use address_set::DualStackAddressSet;
pub use factory::AddressSetFactory;
pub use family_set::FamilySet;
