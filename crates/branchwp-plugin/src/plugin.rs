//! Branch write protection settings page.

use async_trait::async_trait;
use branchwp_service::{BranchWritePermissionService, BranchWritePermissions, ServiceError};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::error::{PluginError, PluginResult};
use crate::form::{AutocompleteLinks, PermissionsForm};
use crate::registry::{ExtensionRegistry, SettingDefinition, SettingsComponent, SettingsContext};

/// Route of the settings page.
pub const ROUTE: &str = "/branchwp";

/// Translation key of the navigation entry.
pub const LABEL_KEY: &str = "scm-branchwp-plugin.navLink";

/// Configuration link the page binds to.
pub const SETTINGS_KEY: &str = "branchWpConfig";

/// Settings component reading and writing through the permission service.
#[derive(Debug, Clone)]
pub struct BranchWpSettings {
    service: Arc<BranchWritePermissionService>,
}

impl BranchWpSettings {
    /// Create the component.
    pub fn new(service: Arc<BranchWritePermissionService>) -> Self {
        Self { service }
    }

    /// The page definition.
    pub fn definition() -> SettingDefinition {
        SettingDefinition {
            route: ROUTE.to_string(),
            label_key: LABEL_KEY.to_string(),
            settings_key: SETTINGS_KEY.to_string(),
        }
    }

    /// Open an editing form on the repository's current configuration.
    pub async fn form(&self, context: &SettingsContext) -> PluginResult<PermissionsForm> {
        let configuration = self.service.permissions(&context.repository).await?;

        Ok(PermissionsForm::new(configuration)
            .read_only(context.read_only)
            .with_links(AutocompleteLinks {
                users: context.user_autocomplete_link.clone(),
                groups: context.group_autocomplete_link.clone(),
            }))
    }

    /// Persist the configuration of a form.
    pub async fn submit(
        &self,
        context: &SettingsContext,
        form: PermissionsForm,
    ) -> PluginResult<()> {
        self.store(context, form.into_configuration()).await
    }

    async fn store(
        &self,
        context: &SettingsContext,
        configuration: BranchWritePermissions,
    ) -> PluginResult<()> {
        if context.read_only {
            return Err(PluginError::ReadOnly(context.repository.clone()));
        }

        if let Err(e) = self
            .service
            .set_permissions(&context.repository, configuration)
            .await
        {
            if e.is_server_error() {
                error!(
                    repository = %context.repository,
                    error = %e,
                    "failed to save branchwp settings"
                );
            } else {
                warn!(
                    repository = %context.repository,
                    error = %e,
                    "branchwp settings rejected"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsComponent for BranchWpSettings {
    async fn load(&self, context: &SettingsContext) -> PluginResult<serde_json::Value> {
        let configuration = self.service.permissions(&context.repository).await?;
        serde_json::to_value(configuration)
            .map_err(|e| PluginError::Service(ServiceError::Serialization(e)))
    }

    #[instrument(skip(self, payload), fields(repository = %context.repository))]
    async fn save(
        &self,
        context: &SettingsContext,
        payload: serde_json::Value,
    ) -> PluginResult<()> {
        let configuration: BranchWritePermissions = serde_json::from_value(payload)
            .map_err(|e| PluginError::Service(ServiceError::Serialization(e)))?;
        self.store(context, configuration).await
    }
}

/// Register the settings page with the host.
pub async fn register(
    registry: &ExtensionRegistry,
    service: Arc<BranchWritePermissionService>,
) -> PluginResult<()> {
    registry
        .bind_repository_setting(
            BranchWpSettings::definition(),
            Arc::new(BranchWpSettings::new(service)),
        )
        .await?;

    info!(route = ROUTE, "branchwp settings registered");
    Ok(())
}
