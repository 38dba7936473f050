//! Shared RoleGate domain types.
//!
//! The central piece is the [`RoleTable`]: the operator-supplied, ordered
//! mapping from the *external identifier* a remote authorization endpoint
//! understands (a route fragment such as `route/admin`) to the *role name*
//! exposed to callers. It is built once at configuration time and replaced
//! wholesale, never mutated in place.

use indexmap::IndexMap;
use thiserror::Error;

pub mod logging;

/// Errors raised while building a [`RoleTable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleTableError {
    #[error("blank external identifier in role table")]
    BlankExternalId,

    #[error("blank role name for external identifier {0}")]
    BlankRoleName(String),

    #[error("duplicate role name: {0}")]
    DuplicateRoleName(String),
}

/// Ordered mapping from external identifier to role name.
///
/// Role names are unique across the table: two external identifiers may not
/// collapse to the same role name, since the role name is the key callers
/// and whitelists address roles by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    entries: IndexMap<String, String>,
}

impl RoleTable {
    /// Build a table from `(external identifier, role name)` pairs.
    ///
    /// Entries must be non-blank and role names pairwise distinct; a later
    /// pair with the same external identifier replaces the earlier one.
    pub fn new<K, V, I>(entries: I) -> Result<Self, RoleTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = IndexMap::new();
        for (external_id, role_name) in entries {
            let external_id: String = external_id.into();
            let role_name: String = role_name.into();
            if external_id.trim().is_empty() {
                return Err(RoleTableError::BlankExternalId);
            }
            if role_name.trim().is_empty() {
                return Err(RoleTableError::BlankRoleName(external_id));
            }
            let collision = table
                .iter()
                .any(|(id, name): (&String, &String)| *name == role_name && *id != external_id);
            if collision {
                return Err(RoleTableError::DuplicateRoleName(role_name));
            }
            table.insert(external_id, role_name);
        }
        Ok(Self { entries: table })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(external identifier, role name)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Role names in declaration order.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Role name for an external identifier, if declared.
    pub fn role_for(&self, external_id: &str) -> Option<&str> {
        self.entries.get(external_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_declaration_order() {
        let table = RoleTable::new([
            ("route/editor", "editor"),
            ("route/admin", "admin"),
            ("route/viewer", "viewer"),
        ])
        .unwrap();

        let names: Vec<&str> = table.role_names().collect();
        assert_eq!(names, vec!["editor", "admin", "viewer"]);
        assert_eq!(table.role_for("route/admin"), Some("admin"));
    }

    #[test]
    fn rejects_duplicate_role_names() {
        let err = RoleTable::new([("route/a", "admin"), ("route/b", "admin")]).unwrap_err();
        assert_eq!(err, RoleTableError::DuplicateRoleName("admin".to_string()));
    }

    #[test]
    fn rejects_blank_entries() {
        assert_eq!(
            RoleTable::new([("  ", "admin")]).unwrap_err(),
            RoleTableError::BlankExternalId
        );
        assert_eq!(
            RoleTable::new([("route/a", "")]).unwrap_err(),
            RoleTableError::BlankRoleName("route/a".to_string())
        );
    }

    #[test]
    fn later_entry_replaces_same_external_id() {
        let table = RoleTable::new([("route/a", "admin"), ("route/a", "root")]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.role_for("route/a"), Some("root"));
    }
}
