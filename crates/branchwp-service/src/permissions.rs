//! # Branch Write Permissions
//!
//! The structured per-repository configuration and the decision it drives.

use branchwp_rules::{Rule, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ServiceResult;
use crate::matcher::matches_branch;
use crate::user::User;

/// Branch write protection configuration of one repository.
///
/// # Decision
///
/// A user may write a branch when protection is disabled, or when
/// - no deny rule for the user or one of their groups matches the branch, and
/// - an allow rule for the user or one of their groups matches it.
///
/// Without any matching rule the write is refused.
///
/// # Example
///
/// ```
/// use branchwp_rules::Rule;
/// use branchwp_service::{BranchWritePermissions, User};
/// use std::collections::HashSet;
///
/// let mut config = BranchWritePermissions::default();
/// config.permissions.push(Rule::allow_group("*", "devs"));
/// config.permissions.push(Rule::deny_user("main", "dent"));
///
/// let devs: HashSet<String> = ["devs".to_string()].into();
/// assert!(config.permits(&User::new("trillian"), &devs, "main"));
/// assert!(!config.permits(&User::new("dent"), &devs, "main"));
/// assert!(config.permits(&User::new("dent"), &devs, "develop"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchWritePermissions {
    /// Whether protection is active for the repository
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// The whitelist
    #[serde(default)]
    pub permissions: RuleSet,
}

fn default_true() -> bool {
    true
}

impl Default for BranchWritePermissions {
    fn default() -> Self {
        Self {
            enabled: true,
            permissions: RuleSet::new(),
        }
    }
}

impl BranchWritePermissions {
    /// Create a configuration.
    pub fn new(enabled: bool, permissions: RuleSet) -> Self {
        Self {
            enabled,
            permissions,
        }
    }

    /// Check if the user may write `branch`.
    ///
    /// # Arguments
    ///
    /// * `user` - The writing user
    /// * `groups` - Names of the user's groups
    /// * `branch` - The branch being written
    pub fn permits(&self, user: &User, groups: &HashSet<String>, branch: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let applies = |rule: &Rule| {
            let principal_matches = if rule.is_group {
                groups.contains(&rule.principal)
            } else {
                rule.principal == user.name
            };
            principal_matches && matches_branch(&rule.branch, branch, user)
        };

        if self.permissions.deny_rules().any(|rule| applies(rule)) {
            return false;
        }
        self.permissions.allow_rules().any(|rule| applies(rule))
    }

    /// Serialize to the JSON payload of the host configuration resource.
    pub fn to_json(&self) -> ServiceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON payload of the host configuration resource.
    pub fn from_json(json: &str) -> ServiceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
