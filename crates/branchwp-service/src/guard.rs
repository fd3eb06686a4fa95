//! Write guards.
//!
//! Entry points the host calls before a write lands: editor changes and
//! pull request merges ask for obstacles, pushes are checked branch by
//! branch in the pre-receive hook.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::service::BranchWritePermissionService;
use crate::user::User;

/// Translation key of the obstacle raised for a protected branch.
pub const OBSTACLE_KEY: &str = "scm-branchwp-plugin.obstacle";

/// A reason a write cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Translation key.
    pub key: String,
    /// Human readable message.
    pub message: String,
}

impl Obstacle {
    /// The obstacle for a branch the user may not write.
    pub fn protected_branch(branch: &str) -> Self {
        Self {
            key: OBSTACLE_KEY.to_string(),
            message: format!("The user has no privileges to write to branch {}", branch),
        }
    }
}

/// Guards writes to protected branches.
#[derive(Debug, Clone)]
pub struct WriteGuard {
    service: Arc<BranchWritePermissionService>,
}

impl WriteGuard {
    /// Create a guard backed by a permission service.
    pub fn new(service: Arc<BranchWritePermissionService>) -> Self {
        Self { service }
    }

    /// Get the obstacles for writing `branch`.
    ///
    /// Used for editor changes (the edited branch) and merges (the pull
    /// request's target branch). Empty when the write may proceed.
    pub async fn obstacles(
        &self,
        user: &User,
        repository: &str,
        branch: &str,
    ) -> ServiceResult<Vec<Obstacle>> {
        if self.service.is_privileged(user, repository, branch).await? {
            Ok(Vec::new())
        } else {
            Ok(vec![Obstacle::protected_branch(branch)])
        }
    }

    /// Check every branch a push creates, modifies or deletes.
    ///
    /// # Errors
    ///
    /// [`ServiceError::WriteDenied`] for the first branch the user may not
    /// write.
    pub async fn check_push<I, S>(
        &self,
        user: &User,
        repository: &str,
        branches: I,
    ) -> ServiceResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for branch in branches {
            let branch = branch.as_ref();
            debug!(repository, branch, "checking pushed branch");

            if !self.service.is_privileged(user, repository, branch).await? {
                warn!(repository, branch, "access denied for branch");
                return Err(ServiceError::WriteDenied {
                    branch: branch.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::BranchWritePermissions;
    use crate::store::MemoryConfigurationStore;
    use crate::user::StaticGroups;
    use branchwp_rules::{Rule, RuleSet};

    async fn guard() -> WriteGuard {
        let service = BranchWritePermissionService::new(
            Arc::new(MemoryConfigurationStore::new()),
            Arc::new(StaticGroups::new()),
        );
        let rules: RuleSet = vec![
            Rule::allow_user("*", "trillian"),
            Rule::deny_user("release/*", "trillian"),
        ]
        .into();
        service
            .set_permissions("repo", BranchWritePermissions::new(true, rules))
            .await
            .unwrap();
        WriteGuard::new(Arc::new(service))
    }

    #[tokio::test]
    async fn test_no_obstacles_when_privileged() {
        let guard = guard().await;
        let obstacles = guard
            .obstacles(&User::new("trillian"), "repo", "develop")
            .await
            .unwrap();
        assert!(obstacles.is_empty());
    }

    #[tokio::test]
    async fn test_obstacle_for_protected_branch() {
        let guard = guard().await;
        let obstacles = guard
            .obstacles(&User::new("trillian"), "repo", "release/1.0")
            .await
            .unwrap();
        assert_eq!(
            obstacles,
            vec![Obstacle {
                key: "scm-branchwp-plugin.obstacle".to_string(),
                message: "The user has no privileges to write to branch release/1.0".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_check_push_reports_first_refused_branch() {
        let guard = guard().await;
        let user = User::new("trillian");

        assert!(guard
            .check_push(&user, "repo", ["main", "feature/a"])
            .await
            .is_ok());

        match guard
            .check_push(&user, "repo", vec!["main", "release/2", "release/3"])
            .await
        {
            Err(ServiceError::WriteDenied { branch }) => assert_eq!(branch, "release/2"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_push_without_branches() {
        let guard = guard().await;
        let none: Vec<String> = Vec::new();
        assert!(guard.check_push(&User::new("dent"), "repo", none).await.is_ok());
    }
}
