//! Node configuration
//!
//! Compile-time settings; the firmware generates a `NodeConfig` constant
//! from `node.toml` at build time.

use emlink_protocol::{TempUnit, MAX_NAME_LEN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Radio module name, stored inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleName {
    bytes: [u8; MAX_NAME_LEN],
    len: u8,
}

impl ModuleName {
    /// Returns `None` if `name` is longer than the module accepts
    pub const fn new(name: &str) -> Option<Self> {
        let src = name.as_bytes();
        if src.len() > MAX_NAME_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_NAME_LEN];
        let mut i = 0;
        while i < src.len() {
            bytes[i] = src[i];
            i += 1;
        }
        Some(Self {
            bytes,
            len: src.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        let len = usize::from(self.len).min(MAX_NAME_LEN);
        core::str::from_utf8(&self.bytes[..len]).unwrap_or("")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ModuleName {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

/// Node settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Measurement period in milliseconds
    pub period_ms: u32,
    /// Active part of each period in milliseconds
    pub active_ms: u32,
    /// Unit of reports until a command switches it
    pub unit: TempUnit,
    /// Indicator turns on at or above this reading, in Fahrenheit
    pub threshold_f: f32,
    /// Rename the radio module at boot
    pub module_name: Option<ModuleName>,
}

impl NodeConfig {
    pub const DEFAULT: Self = Self {
        period_ms: 10_000,
        active_ms: 100,
        unit: TempUnit::Fahrenheit,
        threshold_f: 85.0,
        module_name: None,
    };
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name() {
        let name = ModuleName::new("Node7").unwrap();
        assert_eq!(name.as_str(), "Node7");
        assert!(ModuleName::new("ThirteenChars").is_none());
    }

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.period_ms, 10_000);
        assert_eq!(config.active_ms, 100);
        assert_eq!(config.unit, TempUnit::Fahrenheit);
        assert!(config.module_name.is_none());
    }
}
