//! Path sanitization into flat storage keys.
//!
//! A raw path is reduced to the characters in `[A-Za-z0-9._-]`, preserving
//! their order. Everything else is dropped, path separators included, so
//! `"users/alice"` and `"usersalice"` address the same document. An input
//! with no surviving characters is rejected.

use std::fmt;

use crate::error::{StoreError, StoreResult};

/// Extension of every persisted document file.
pub const FILE_EXTENSION: &str = "json";

/// Whether `ch` survives sanitization.
fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')
}

/// Sanitize a caller-supplied path into a [`StorageKey`].
///
/// # Examples
///
/// ```
/// use jsonbox_store::sanitize;
///
/// assert_eq!(sanitize("users/alice.v2").unwrap().as_str(), "usersalice.v2");
/// assert!(sanitize("???").is_err());
/// ```
pub fn sanitize(raw: &str) -> StoreResult<StorageKey> {
    let key: String = raw.chars().filter(|c| is_key_char(*c)).collect();
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            raw: raw.to_string(),
        });
    }
    Ok(StorageKey(key))
}

/// Canonical, sanitized identifier of a stored document.
///
/// Only constructed through [`sanitize`] or [`StorageKey::from_file_name`],
/// so it is never empty and never contains a path separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the file holding this document, `{key}.json`.
    pub fn file_name(&self) -> String {
        format!("{}.{FILE_EXTENSION}", self.0)
    }

    /// Recover a key from a persisted file name.
    ///
    /// Returns `None` unless the name is exactly `{key}.json` for a key that
    /// is already in sanitized form.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(FILE_EXTENSION)?.strip_suffix('.')?;
        if stem.is_empty() || !stem.chars().all(is_key_char) {
            return None;
        }
        Some(Self(stem.to_string()))
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_allowed_characters() {
        assert_eq!(sanitize("config").unwrap().as_str(), "config");
        assert_eq!(sanitize("v1.0_final-2").unwrap().as_str(), "v1.0_final-2");
        assert_eq!(sanitize("ABCxyz789").unwrap().as_str(), "ABCxyz789");
    }

    #[test]
    fn flattens_hierarchical_paths() {
        assert_eq!(sanitize("a/b").unwrap(), sanitize("ab").unwrap());
        assert_eq!(sanitize("users/alice/prefs").unwrap().as_str(), "usersaliceprefs");
    }

    #[test]
    fn strips_traversal_and_specials() {
        assert_eq!(sanitize("../../etc/passwd").unwrap().as_str(), "....etcpasswd");
        assert_eq!(sanitize("a b\tc\n").unwrap().as_str(), "abc");
        assert_eq!(sanitize("x?y=1&z#frag").unwrap().as_str(), "xy1zfrag");
    }

    #[test]
    fn drops_non_ascii_alphanumerics() {
        assert_eq!(sanitize("café").unwrap().as_str(), "caf");
        assert!(sanitize("данные").is_err());
    }

    #[test]
    fn reject_empty_result() {
        assert!(matches!(sanitize("???"), Err(StoreError::InvalidKey { .. })));
        assert!(sanitize("").is_err());
        assert!(sanitize("///").is_err());
    }

    #[test]
    fn invalid_key_keeps_raw_input() {
        match sanitize("/?/") {
            Err(StoreError::InvalidKey { raw }) => assert_eq!(raw, "/?/"),
            other => panic!("expected InvalidKey, got {other:?}"),
        }
    }

    #[test]
    fn file_name_round_trip() {
        let key = sanitize("notes/today").unwrap();
        assert_eq!(key.file_name(), "notestoday.json");
        assert_eq!(StorageKey::from_file_name(&key.file_name()), Some(key));
    }

    #[test]
    fn from_file_name_rejects_foreign_files() {
        assert_eq!(StorageKey::from_file_name("notes.txt"), None);
        assert_eq!(StorageKey::from_file_name(".json"), None);
        assert_eq!(StorageKey::from_file_name("json"), None);
        assert_eq!(StorageKey::from_file_name("has space.json"), None);
        assert_eq!(StorageKey::from_file_name(".tmpA1b2C3"), None);
    }

    #[test]
    fn dotted_key_file_name() {
        let key = StorageKey::from_file_name("archive.2024.json").unwrap();
        assert_eq!(key.as_str(), "archive.2024");
    }

    proptest! {
        #[test]
        fn output_uses_only_key_characters(raw in ".*") {
            if let Ok(key) = sanitize(&raw) {
                prop_assert!(!key.as_str().is_empty());
                prop_assert!(key.as_str().chars().all(is_key_char));
            }
        }

        #[test]
        fn sanitize_is_idempotent(raw in ".*") {
            if let Ok(key) = sanitize(&raw) {
                prop_assert_eq!(sanitize(key.as_str()).unwrap(), key);
            }
        }

        #[test]
        fn rejects_iff_no_key_characters(raw in ".*") {
            let has_key_char = raw.chars().any(is_key_char);
            prop_assert_eq!(sanitize(&raw).is_ok(), has_key_char);
        }
    }
}
