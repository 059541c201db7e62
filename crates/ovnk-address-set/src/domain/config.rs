//! # Address Set Configuration
//!
//! Which address families the process handles. Passed explicitly into the
//! factory; nothing in this crate reads process-wide state on its own.

use super::family::IpFamily;
use serde::{Deserialize, Serialize};
use std::env;

/// Family enablement for address sets.
///
/// A disabled family never gets a backing object; every operation skips it.
/// Disabling both is valid and yields sets that are only a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressSetConfig {
    /// Handle IPv4 members (default: true).
    pub ipv4_mode: bool,
    /// Handle IPv6 members (default: false).
    pub ipv6_mode: bool,
}

impl Default for AddressSetConfig {
    fn default() -> Self {
        Self::ipv4_only()
    }
}

impl AddressSetConfig {
    pub const fn ipv4_only() -> Self {
        Self {
            ipv4_mode: true,
            ipv6_mode: false,
        }
    }

    pub const fn ipv6_only() -> Self {
        Self {
            ipv4_mode: false,
            ipv6_mode: true,
        }
    }

    pub const fn dual_stack() -> Self {
        Self {
            ipv4_mode: true,
            ipv6_mode: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OVNK_IPV4_MODE`: Enable IPv4 (default: true)
    /// - `OVNK_IPV6_MODE`: Enable IPv6 (default: false)
    ///
    /// `true`/`1` enable, `false`/`0` disable. Anything else keeps the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ipv4_mode: env_flag("OVNK_IPV4_MODE").unwrap_or(defaults.ipv4_mode),
            ipv6_mode: env_flag("OVNK_IPV6_MODE").unwrap_or(defaults.ipv6_mode),
        }
    }

    pub fn with_ipv4_mode(mut self, enabled: bool) -> Self {
        self.ipv4_mode = enabled;
        self
    }

    pub fn with_ipv6_mode(mut self, enabled: bool) -> Self {
        self.ipv6_mode = enabled;
        self
    }

    pub fn is_enabled(&self, family: IpFamily) -> bool {
        match family {
            IpFamily::V4 => self.ipv4_mode,
            IpFamily::V6 => self.ipv6_mode,
        }
    }

    /// Enabled families, v4 first.
    pub fn enabled_families(&self) -> Vec<IpFamily> {
        [IpFamily::V4, IpFamily::V6]
            .into_iter()
            .filter(|family| self.is_enabled(*family))
            .collect()
    }

    pub fn is_dual_stack(&self) -> bool {
        self.ipv4_mode && self.ipv6_mode
    }
}

fn env_flag(key: &str) -> Option<bool> {
    parse_flag(&env::var(key).ok()?)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
