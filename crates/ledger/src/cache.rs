//! Cache keys surfaced by every mutation.
//!
//! The engine never caches anything itself. Each write returns the keys of
//! the read models it made stale, so the caller can invalidate whatever cache
//! sits in front of the engine.

use std::fmt;

use serde::{Serialize, Serializer};

/// A read model that a mutation may invalidate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `transactions:org:<organization_id>`
    OrganizationTransactions(String),
    /// `transactions:group:<group_id>`
    GroupTransactions(String),
    /// `stats:org:<organization_id>`
    OrganizationStats(String),
    /// `groups:org:<organization_id>`
    OrganizationGroups(String),
    /// `group:<group_id>`
    Group(String),
    /// `giveTakes:org:<organization_id>`
    OrganizationObligations(String),
    /// `organizations:user:<user_id>`
    UserOrganizations(String),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrganizationTransactions(id) => write!(f, "transactions:org:{id}"),
            Self::GroupTransactions(id) => write!(f, "transactions:group:{id}"),
            Self::OrganizationStats(id) => write!(f, "stats:org:{id}"),
            Self::OrganizationGroups(id) => write!(f, "groups:org:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
            Self::OrganizationObligations(id) => write!(f, "giveTakes:org:{id}"),
            Self::UserOrganizations(id) => write!(f, "organizations:user:{id}"),
        }
    }
}

impl Serialize for CacheKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of a write: the value plus the cache keys it invalidated.
///
/// Keys are kept in insertion order without duplicates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mutation<T> {
    pub value: T,
    pub affected: Vec<CacheKey>,
}

impl<T> Mutation<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            affected: Vec::new(),
        }
    }

    #[must_use]
    pub fn affects(mut self, key: CacheKey) -> Self {
        if !self.affected.contains(&key) {
            self.affected.push(key);
        }
        self
    }

    #[must_use]
    pub fn affects_all(self, keys: impl IntoIterator<Item = CacheKey>) -> Self {
        keys.into_iter().fold(self, Self::affects)
    }

    /// Keys of every ledger-level read model touched when a transaction of
    /// `organization_id` changes, plus the per-group keys for `group_id`.
    #[must_use]
    pub(crate) fn affects_transaction(self, organization_id: &str, group_id: Option<&str>) -> Self {
        let out = self
            .affects(CacheKey::OrganizationTransactions(organization_id.to_string()))
            .affects(CacheKey::OrganizationStats(organization_id.to_string()));
        match group_id {
            Some(group_id) => out
                .affects(CacheKey::GroupTransactions(group_id.to_string()))
                .affects(CacheKey::Group(group_id.to_string()))
                .affects(CacheKey::OrganizationGroups(organization_id.to_string())),
            None => out,
        }
    }

    /// Rendered keys, ready to hand to an external cache.
    #[must_use]
    pub fn affected_keys(&self) -> Vec<String> {
        self.affected.iter().map(ToString::to_string).collect()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Mutation<U> {
        Mutation {
            value: f(self.value),
            affected: self.affected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_in_wire_form() {
        let keys = [
            CacheKey::OrganizationTransactions("o1".to_string()),
            CacheKey::GroupTransactions("g1".to_string()),
            CacheKey::OrganizationStats("o1".to_string()),
            CacheKey::OrganizationGroups("o1".to_string()),
            CacheKey::Group("g1".to_string()),
            CacheKey::OrganizationObligations("o1".to_string()),
            CacheKey::UserOrganizations("u1".to_string()),
        ];
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "transactions:org:o1",
                "transactions:group:g1",
                "stats:org:o1",
                "groups:org:o1",
                "group:g1",
                "giveTakes:org:o1",
                "organizations:user:u1",
            ]
        );
    }

    #[test]
    fn affects_deduplicates() {
        let mutation = Mutation::new(())
            .affects_transaction("o1", Some("g1"))
            .affects_transaction("o1", Some("g2"));
        assert_eq!(
            mutation.affected_keys(),
            vec![
                "transactions:org:o1",
                "stats:org:o1",
                "transactions:group:g1",
                "group:g1",
                "groups:org:o1",
                "transactions:group:g2",
                "group:g2",
            ]
        );
    }

    #[test]
    fn serializes_keys_as_strings() {
        let mutation = Mutation::new(1).affects(CacheKey::OrganizationStats("o1".to_string()));
        assert_eq!(
            serde_json::to_string(&mutation).unwrap(),
            r#"{"value":1,"affected":["stats:org:o1"]}"#
        );
    }
}
