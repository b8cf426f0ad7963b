//! Role-based access declarations and the role → operation → paths map.
//!
//! The map is data for an access-control layer; nothing in this crate
//! enforces it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Operation kinds a role can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Find,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [Self::Find, Self::Insert, Self::Update, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation: {s}"))
    }
}

/// Roles allowed per operation, as declared on an entity or a field.
pub type Access = BTreeMap<Operation, Vec<String>>;

/// role → operation → ordered list of paths.
///
/// Paths keep insertion order and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMap {
    roles: BTreeMap<String, BTreeMap<Operation, Vec<String>>>,
}

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `path` under `(role, operation)` for every role, creating
    /// buckets as needed. This is the only way entries are added.
    pub fn add_roles<I, S>(&mut self, roles: I, operation: Operation, path: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for role in roles {
            self.roles
                .entry(role.as_ref().to_string())
                .or_default()
                .entry(operation)
                .or_default()
                .push(path.to_string());
        }
    }

    /// Paths recorded for `(role, operation)`, in insertion order.
    pub fn paths(&self, role: &str, operation: Operation) -> &[String] {
        self.roles
            .get(role)
            .and_then(|ops| ops.get(&operation))
            .map_or(&[], Vec::as_slice)
    }

    pub fn operations(&self, role: &str) -> Option<&BTreeMap<Operation, Vec<String>>> {
        self.roles.get(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Appends every entry of `other` after this map's own entries.
    pub fn merge(&mut self, other: &RoleMap) {
        for (role, ops) in &other.roles {
            for (operation, paths) in ops {
                for path in paths {
                    self.add_roles([role], *operation, path);
                }
            }
        }
    }
}
