//! Key extraction rules
//!
//! A [`KeyRule`] turns a record into the string a [`KeyedIndex`] orders it
//! by. Rules are plain function pointers plus a case-folding flag, picked
//! once when the index is constructed.
//!
//! [`KeyedIndex`]: crate::index::KeyedIndex

use std::fmt;

/// Strategy mapping a record to its index key
pub struct KeyRule<T> {
    name: &'static str,
    extract: fn(&T) -> String,
    fold_case: bool,
}

impl<T> KeyRule<T> {
    /// Key compared exactly as extracted
    pub fn exact(name: &'static str, extract: fn(&T) -> String) -> Self {
        Self {
            name,
            extract,
            fold_case: false,
        }
    }

    /// Key lower-cased before comparison, at insertion and at lookup
    pub fn case_insensitive(name: &'static str, extract: fn(&T) -> String) -> Self {
        Self {
            name,
            extract,
            fold_case: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Derive the normalized key of a record
    pub fn key_of(&self, record: &T) -> String {
        let raw = (self.extract)(record);
        if self.fold_case {
            raw.to_lowercase()
        } else {
            raw
        }
    }

    /// Normalize a probe (exact key or prefix) the same way keys are
    pub fn normalize(&self, probe: &str) -> String {
        if self.fold_case {
            probe.to_lowercase()
        } else {
            probe.to_string()
        }
    }
}

// Manual impls: derive would demand `T: Clone` / `T: Debug`.
impl<T> Clone for KeyRule<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            extract: self.extract,
            fold_case: self.fold_case,
        }
    }
}

impl<T> fmt::Debug for KeyRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRule")
            .field("name", &self.name)
            .field("fold_case", &self.fold_case)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(s: &String) -> String {
        s.clone()
    }

    #[test]
    fn test_exact_rule_keeps_case() {
        let rule = KeyRule::exact("id", identity);
        assert_eq!(rule.key_of(&"ABC-1".to_string()), "ABC-1");
        assert_eq!(rule.normalize("ABC-1"), "ABC-1");
        assert_eq!(format!("{:?}", rule), "KeyRule { name: \"id\", fold_case: false }");
    }

    #[test]
    fn test_case_insensitive_rule_lowercases() {
        let rule = KeyRule::case_insensitive("title", identity);
        assert_eq!(rule.name(), "title");
        assert_eq!(rule.key_of(&"The Hobbit".to_string()), "the hobbit");
        assert_eq!(rule.normalize("THE"), "the");
    }
}
