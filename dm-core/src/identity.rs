//! Identity keys
//!
//! The fixed, ordered set of platform attributes queried from the identity
//! provider. Order matters: acquisition and matching both walk `ALL` front
//! to back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DmiError;

/// One platform identity attribute (system/baseboard x manufacturer/product/version)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityKey {
    SystemManufacturer,
    SystemProduct,
    SystemVersion,
    BaseboardManufacturer,
    BaseboardProduct,
    BaseboardVersion,
}

impl IdentityKey {
    /// Number of identity keys
    pub const COUNT: usize = 6;

    /// Every key in acquisition order
    pub const ALL: [IdentityKey; Self::COUNT] = [
        IdentityKey::SystemManufacturer,
        IdentityKey::SystemProduct,
        IdentityKey::SystemVersion,
        IdentityKey::BaseboardManufacturer,
        IdentityKey::BaseboardProduct,
        IdentityKey::BaseboardVersion,
    ];

    /// Position of this key in `ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name passed to the identity provider (dmidecode string keyword)
    pub fn provider_name(self) -> &'static str {
        match self {
            IdentityKey::SystemManufacturer => "system-manufacturer",
            IdentityKey::SystemProduct => "system-product-name",
            IdentityKey::SystemVersion => "system-version",
            IdentityKey::BaseboardManufacturer => "baseboard-manufacturer",
            IdentityKey::BaseboardProduct => "baseboard-product-name",
            IdentityKey::BaseboardVersion => "baseboard-version",
        }
    }

    /// Two-character id for external callers.
    /// Baseboard ids start with "m" as in mainboard, leaving "b" for BIOS.
    pub fn short_id(self) -> &'static str {
        match self {
            IdentityKey::SystemManufacturer => "sm",
            IdentityKey::SystemProduct => "sp",
            IdentityKey::SystemVersion => "sv",
            IdentityKey::BaseboardManufacturer => "mm",
            IdentityKey::BaseboardProduct => "mp",
            IdentityKey::BaseboardVersion => "mv",
        }
    }

    /// Attribute file name under /sys/class/dmi/id
    pub fn sysfs_attribute(self) -> &'static str {
        match self {
            IdentityKey::SystemManufacturer => "sys_vendor",
            IdentityKey::SystemProduct => "product_name",
            IdentityKey::SystemVersion => "product_version",
            IdentityKey::BaseboardManufacturer => "board_vendor",
            IdentityKey::BaseboardProduct => "board_name",
            IdentityKey::BaseboardVersion => "board_version",
        }
    }

    pub fn from_short_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.short_id() == id)
    }

    pub fn from_provider_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.provider_name() == name)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_name())
    }
}

impl FromStr for IdentityKey {
    type Err = DmiError;

    /// Accepts either the short id or the provider-facing name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_short_id(s)
            .or_else(|| Self::from_provider_name(s))
            .ok_or_else(|| DmiError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_index_order() {
        for (i, key) in IdentityKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn test_short_ids_are_unique_and_two_chars() {
        let mut seen = std::collections::HashSet::new();
        for key in IdentityKey::ALL {
            assert_eq!(key.short_id().len(), 2);
            assert!(seen.insert(key.short_id()));
        }
    }

    #[test]
    fn test_lookup_by_either_name() {
        assert_eq!(IdentityKey::from_short_id("mp"), Some(IdentityKey::BaseboardProduct));
        assert_eq!(
            IdentityKey::from_provider_name("system-product-name"),
            Some(IdentityKey::SystemProduct)
        );
        assert_eq!(IdentityKey::from_short_id("bv"), None);

        assert_eq!("sv".parse::<IdentityKey>().unwrap(), IdentityKey::SystemVersion);
        assert_eq!(
            "baseboard-manufacturer".parse::<IdentityKey>().unwrap(),
            IdentityKey::BaseboardManufacturer
        );
        assert!(matches!("bios-vendor".parse::<IdentityKey>(), Err(DmiError::UnknownKey(_))));
    }

    #[test]
    fn test_display_uses_provider_name() {
        assert_eq!(IdentityKey::BaseboardVersion.to_string(), "baseboard-version");
    }
}
