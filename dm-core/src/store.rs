//! Identity store
//!
//! Holds one string per [`IdentityKey`], acquired in a single pass. The
//! table is all-or-nothing: if any key fails to come back, none of the
//! strings are kept and the store reports itself unavailable. Once built the
//! store is immutable and may be shared across threads without locking.

use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::identity::IdentityKey;
use crate::pattern::{matches, Pattern};
use crate::provider::IdentityProvider;

/// Platform identity strings acquired from an identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityStore {
    strings: Option<[String; IdentityKey::COUNT]>,
}

impl IdentityStore {
    /// Query every key in order. Stops at the first failure and returns an
    /// unavailable store; keys after the failing one are never queried.
    pub fn initialize<P: IdentityProvider + ?Sized>(provider: &P) -> Self {
        let mut acquired: Vec<String> = Vec::with_capacity(IdentityKey::COUNT);

        for key in IdentityKey::ALL {
            match provider.query(key) {
                Ok(answer) => {
                    let value = chomp(answer);
                    debug!("DMI string {} ({}): {:?}", key, key.short_id(), value);
                    acquired.push(value);
                }
                Err(e) => {
                    debug!("DMI acquisition failed at {}: {}", key, e);
                    debug!("DMI identity unavailable");
                    return Self::unavailable();
                }
            }
        }

        match <[String; IdentityKey::COUNT]>::try_from(acquired) {
            Ok(strings) => {
                debug!("DMI identity acquired");
                Self::from_strings(strings)
            }
            Err(_) => Self::unavailable(),
        }
    }

    /// A store with no identity data
    pub fn unavailable() -> Self {
        Self { strings: None }
    }

    /// A store built from strings obtained elsewhere, in `IdentityKey::ALL` order
    pub fn from_strings(strings: [String; IdentityKey::COUNT]) -> Self {
        Self {
            strings: Some(strings),
        }
    }

    pub fn is_available(&self) -> bool {
        self.strings.is_some()
    }

    /// The acquired string for `key`, or `None` when the store is unavailable
    pub fn string_for(&self, key: IdentityKey) -> Option<&str> {
        self.strings.as_ref().map(|s| s[key.index()].as_str())
    }

    /// Every `(key, value)` pair in key order; empty when unavailable
    pub fn iter(&self) -> impl Iterator<Item = (IdentityKey, &str)> + '_ {
        self.strings
            .iter()
            .flat_map(|s| IdentityKey::ALL.into_iter().zip(s.iter().map(String::as_str)))
    }

    /// The first key, in `IdentityKey::ALL` order, whose string matches `pattern`
    pub fn first_match(&self, pattern: &str) -> Option<IdentityKey> {
        let parsed = Pattern::parse(pattern);
        self.iter()
            .find(|(key, value)| {
                let hit = parsed.matches(value);
                trace!("matching {} {:?} against {:?}: {}", key, value, pattern, hit);
                hit
            })
            .map(|(key, _)| key)
    }

    /// Whether any identity string matches `pattern`. Always false when
    /// the store is unavailable.
    pub fn matches_any(&self, pattern: &str) -> bool {
        self.first_match(pattern).is_some()
    }
}

/// Free-function form of [`IdentityStore::matches_any`]
pub fn matches_any(pattern: &str, store: &IdentityStore) -> bool {
    if !store.is_available() {
        return false;
    }
    IdentityKey::ALL
        .into_iter()
        .filter_map(|key| store.string_for(key))
        .any(|value| matches(value, pattern))
}

/// Drop one trailing line terminator, if present
fn chomp(mut answer: String) -> String {
    if answer.ends_with('\n') {
        answer.pop();
    }
    answer
}

/// A store that is initialized at most once.
///
/// The first `get_or_init` runs the provider; every later call returns the
/// same store without touching any provider.
#[derive(Debug, Default)]
pub struct IdentityCell {
    store: OnceLock<IdentityStore>,
}

impl IdentityCell {
    pub const fn new() -> Self {
        Self {
            store: OnceLock::new(),
        }
    }

    pub fn get_or_init<P: IdentityProvider + ?Sized>(&self, provider: &P) -> &IdentityStore {
        self.store.get_or_init(|| IdentityStore::initialize(provider))
    }

    /// The store, if initialization already ran
    pub fn get(&self) -> Option<&IdentityStore> {
        self.store.get()
    }

    pub fn is_available(&self) -> bool {
        self.get().is_some_and(IdentityStore::is_available)
    }

    pub fn matches_any(&self, pattern: &str) -> bool {
        self.get().is_some_and(|s| s.matches_any(pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DmiError;
    use crate::provider::MockIdentityProvider;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn sample_store() -> IdentityStore {
        IdentityStore::from_strings([
            "ASUSTeK COMPUTER INC.".to_string(),
            "P8Z77-V".to_string(),
            "Rev 1.xx".to_string(),
            "ASUSTeK COMPUTER INC.".to_string(),
            "P8Z77-V".to_string(),
            "Rev X.0x".to_string(),
        ])
    }

    #[test]
    fn test_initialize_strips_one_newline() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_query().returning(|key| match key {
            IdentityKey::SystemVersion => Ok("1.0\n\n".to_string()),
            IdentityKey::BaseboardVersion => Ok(String::new()),
            _ => Ok(format!("{}\n", key.short_id())),
        });

        let store = IdentityStore::initialize(&provider);
        assert!(store.is_available());
        assert_eq!(store.string_for(IdentityKey::SystemManufacturer), Some("sm"));
        assert_eq!(store.string_for(IdentityKey::SystemVersion), Some("1.0\n"));
        assert_eq!(store.string_for(IdentityKey::BaseboardVersion), Some(""));
    }

    #[test]
    fn test_initialize_queries_in_key_order() {
        let mut provider = MockIdentityProvider::new();
        let mut seq = Sequence::new();
        for key in IdentityKey::ALL {
            provider
                .expect_query()
                .with(eq(key))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|k| Ok(k.provider_name().to_string()));
        }

        let store = IdentityStore::initialize(&provider);
        let keys: Vec<_> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, IdentityKey::ALL.to_vec());
    }

    #[test]
    fn test_single_failure_makes_everything_unavailable() {
        let mut provider = MockIdentityProvider::new();
        let mut seq = Sequence::new();
        for key in &IdentityKey::ALL[..2] {
            provider
                .expect_query()
                .with(eq(*key))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok("ok\n".to_string()));
        }
        provider
            .expect_query()
            .with(eq(IdentityKey::SystemVersion))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(DmiError::config("provider broke")));
        // Keys after the failure must not be queried; mockall panics on any
        // call without a matching expectation.

        let store = IdentityStore::initialize(&provider);
        assert!(!store.is_available());
        assert_eq!(store.string_for(IdentityKey::SystemManufacturer), None);
        assert!(!store.matches_any(""));
        assert!(!store.matches_any("ok"));
        assert!(!matches_any("ok", &store));
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn test_matches_any() {
        let store = sample_store();
        assert!(store.matches_any("^ASUSTeK"));
        assert!(store.matches_any("Rev X.0x"));
        assert!(store.matches_any("^P8Z77-V$"));
        assert!(store.matches_any(""));
        assert!(!store.matches_any("^P8Z77$"));
        assert!(!store.matches_any("Gigabyte"));

        assert!(matches_any("^ASUSTeK", &store));
        assert!(!matches_any("Gigabyte", &store));
    }

    #[test]
    fn test_first_match_follows_key_order() {
        let store = sample_store();
        assert_eq!(store.first_match("ASUSTeK"), Some(IdentityKey::SystemManufacturer));
        assert_eq!(store.first_match("P8Z77"), Some(IdentityKey::SystemProduct));
        assert_eq!(store.first_match("X.0x$"), Some(IdentityKey::BaseboardVersion));
        assert_eq!(store.first_match(""), Some(IdentityKey::SystemManufacturer));
        assert_eq!(store.first_match("nothing"), None);
        assert_eq!(IdentityStore::unavailable().first_match(""), None);
    }

    #[test]
    fn test_cell_initializes_once() {
        let cell = IdentityCell::new();
        assert!(cell.get().is_none());
        assert!(!cell.is_available());
        assert!(!cell.matches_any(""));

        let mut first = MockIdentityProvider::new();
        first
            .expect_query()
            .times(IdentityKey::COUNT)
            .returning(|key| Ok(format!("{}\n", key.short_id())));
        assert!(cell.get_or_init(&first).is_available());

        let mut second = MockIdentityProvider::new();
        second.expect_query().never();
        assert!(cell.get_or_init(&second).matches_any("^mp$"));
        assert!(cell.matches_any("sv"));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_acquisition_is_silent_above_debug() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut failing = MockIdentityProvider::new();
            failing
                .expect_query()
                .returning(|_| Err(DmiError::config("no provider")));
            assert!(!IdentityStore::initialize(&failing).is_available());

            let mut working = MockIdentityProvider::new();
            working.expect_query().returning(|k| Ok(k.short_id().to_string()));
            assert!(IdentityStore::initialize(&working).is_available());
        });

        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_store_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IdentityStore>();
        assert_send_sync::<IdentityCell>();
    }
}
