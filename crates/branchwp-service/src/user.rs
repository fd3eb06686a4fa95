//! Users and group membership as seen by the permission service.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The user attempting to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name, matched against user rules and `{username}`.
    pub name: String,

    /// Mail address, substituted for `{mail}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
}

impl User {
    /// Create a user without a mail address.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mail: None,
        }
    }

    /// Set the mail address.
    pub fn with_mail(mut self, mail: impl Into<String>) -> Self {
        self.mail = Some(mail.into());
        self
    }
}

/// Resolves the groups a user belongs to.
///
/// The host owns group membership (internal groups, LDAP, ...); the
/// service only asks.
pub trait GroupResolver: Send + Sync {
    /// Get the names of all groups of `user`.
    fn groups(&self, user: &str) -> HashSet<String>;
}

/// Fixed user-to-groups table.
///
/// Suitable for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct StaticGroups {
    memberships: HashMap<String, HashSet<String>>,
}

impl StaticGroups {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `user` to `group`.
    pub fn add(&mut self, user: impl Into<String>, group: impl Into<String>) -> &mut Self {
        self.memberships
            .entry(user.into())
            .or_default()
            .insert(group.into());
        self
    }
}

impl GroupResolver for StaticGroups {
    fn groups(&self, user: &str) -> HashSet<String> {
        self.memberships.get(user).cloned().unwrap_or_default()
    }
}
