//! Branch write permission service.
//!
//! Reads repository configurations through a [`ConfigurationStore`] and
//! answers whether a user may write a branch.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::permissions::BranchWritePermissions;
use crate::store::ConfigurationStore;
use crate::user::{GroupResolver, User};

/// Permission service for branch write protection.
pub struct BranchWritePermissionService {
    /// Configuration backend
    store: Arc<dyn ConfigurationStore>,
    /// Group membership lookup
    groups: Arc<dyn GroupResolver>,
    /// Service settings
    config: ServiceConfig,
}

impl std::fmt::Debug for BranchWritePermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchWritePermissionService")
            .field("config", &self.config)
            .finish()
    }
}

impl BranchWritePermissionService {
    /// Create a service with default settings.
    pub fn new(store: Arc<dyn ConfigurationStore>, groups: Arc<dyn GroupResolver>) -> Self {
        Self::with_config(store, groups, ServiceConfig::default())
    }

    /// Create a service with custom settings.
    pub fn with_config(
        store: Arc<dyn ConfigurationStore>,
        groups: Arc<dyn GroupResolver>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            groups,
            config,
        }
    }

    /// Get the service settings.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Get the configuration of a repository.
    ///
    /// A repository without stored configuration gets a fresh one (no
    /// rules, enabled per [`ServiceConfig::default_enabled`]), which is
    /// stored before it is returned.
    pub async fn permissions(&self, repository: &str) -> ServiceResult<BranchWritePermissions> {
        if let Some(permissions) = self.store.get(repository).await? {
            return Ok(permissions);
        }

        debug!(repository, "no branchwp configuration found, storing default");
        let permissions =
            BranchWritePermissions::new(self.config.default_enabled, Default::default());
        self.store.set(repository, permissions.clone()).await?;
        Ok(permissions)
    }

    /// Replace the configuration of a repository.
    ///
    /// Every rule is validated first; nothing is stored if one is invalid.
    pub async fn set_permissions(
        &self,
        repository: &str,
        permissions: BranchWritePermissions,
    ) -> ServiceResult<()> {
        if let Err(e) = permissions.permissions.validate() {
            warn!(repository, error = %e, "rejected branchwp configuration");
            return Err(e.into());
        }

        debug!(
            repository,
            enabled = permissions.enabled,
            rules = permissions.permissions.len(),
            "storing branchwp configuration"
        );
        self.store.set(repository, permissions).await?;
        Ok(())
    }

    /// Check if protection is enabled for a repository.
    pub async fn is_enabled(&self, repository: &str) -> ServiceResult<bool> {
        Ok(self.permissions(repository).await?.enabled)
    }

    /// Check if the user may write `branch` of `repository`.
    ///
    /// See [`BranchWritePermissions::permits`] for the decision.
    #[instrument(skip(self, user), fields(user = %user.name))]
    pub async fn is_privileged(
        &self,
        user: &User,
        repository: &str,
        branch: &str,
    ) -> ServiceResult<bool> {
        let permissions = self.permissions(repository).await?;
        if !permissions.enabled {
            return Ok(true);
        }

        let groups = self.groups.groups(&user.name);
        let privileged = permissions.permits(user, &groups, branch);

        if !privileged {
            warn!(user = %user.name, repository, branch, "access denied");
        }
        Ok(privileged)
    }
}
