//! dmimatch core library
//!
//! Identifies the hardware platform from its DMI strings and tests those
//! strings against simple anchored patterns.
//!
//! # Module Structure
//!
//! - `identity` - the fixed set of identity keys
//! - `provider` - where identity strings come from (dmidecode, sysfs)
//! - `store` - one-shot, all-or-nothing acquisition of every key
//! - `pattern` - the `^prefix`, `suffix$`, `^exact$`, `substring` matcher
//! - `settings` - persisted provider configuration
//!
//! # Example
//!
//! ```no_run
//! use dm_core::{DmidecodeProvider, IdentityStore};
//!
//! let store = IdentityStore::initialize(&DmidecodeProvider::default());
//! if store.matches_any("^P8Z77") {
//!     // board specific path
//! }
//! ```

pub mod constants;
pub mod error;
pub mod identity;
pub mod pattern;
pub mod provider;
pub mod settings;
pub mod store;
pub mod system;

// Re-export error types
pub use error::{DmiError, Result};

pub use identity::IdentityKey;
pub use pattern::{matches, Pattern};
pub use provider::{read_answer, DmidecodeProvider, IdentityProvider, SysfsProvider};
pub use settings::{
    get_settings_path, load_settings, load_settings_from, save_settings, save_settings_to,
    ProviderKind, Settings,
};
pub use store::{matches_any, IdentityCell, IdentityStore};
pub use system::{has_dmi_sysfs, is_root};
