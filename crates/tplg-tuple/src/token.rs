use serde::{Deserialize, Serialize};

/// Maps symbolic token names to the integers the firmware understands.
///
/// Lookups are linear: token tables hold tens of entries, and keeping
/// declaration order makes dumps stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTable {
    entries: Vec<(String, u32)>,
}

impl TokenTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a token.
    pub fn insert(&mut self, name: impl Into<String>, value: u32) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Resolve a token name.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no token is defined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tokens in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for TokenTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut table = TokenTable::new();
        table.insert("SOF_TKN_BUF_SIZE", 100);
        table.insert("SOF_TKN_BUF_CAPS", 101);
        assert_eq!(table.get("SOF_TKN_BUF_SIZE"), Some(100));
        assert_eq!(table.get("SOF_TKN_BUF_CAPS"), Some(101));
        assert_eq!(table.get("missing"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn insert_replaces() {
        let mut table: TokenTable = [("a", 1)].into_iter().collect();
        table.insert("a", 9);
        assert_eq!(table.get("a"), Some(9));
        assert_eq!(table.len(), 1);
    }
}
