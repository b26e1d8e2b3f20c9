//! Named bind parameters.

use std::collections::BTreeMap;

use crate::{SqlValue, ToSql};

/// Named parameters supplied alongside a templated query.
///
/// Names are stored without the placeholder prefix (`id`, not `:id`).
/// Iteration order is by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binds {
    values: BTreeMap<String, SqlValue>,
}

impl Binds {
    /// Create an empty set of binds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any previous value with the same name.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl ToSql) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a parameter, returning the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToSql) -> Option<SqlValue> {
        self.values.insert(name.into(), value.to_sql())
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.values.get(name)
    }

    /// Check whether a parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: ToSql> FromIterator<(K, V)> for Binds {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut binds = Self::new();
        for (name, value) in iter {
            binds.insert(name, value);
        }
        binds
    }
}

impl<K: Into<String>, V: ToSql, const N: usize> From<[(K, V); N]> for Binds {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_replaces_existing() {
        let binds = Binds::new().bind("id", 1).bind("id", 2);
        assert_eq!(binds.len(), 1);
        assert_eq!(binds.get("id"), Some(&SqlValue::Int(2)));
    }

    #[test]
    fn test_from_array() {
        let binds = Binds::from([("id", 7)]);
        assert!(binds.contains("id"));
        assert!(!binds.contains("name"));
    }

    #[test]
    fn test_iter_is_sorted_by_name() {
        let binds = Binds::new().bind("b", 2).bind("a", 1);
        let names: Vec<_> = binds.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
