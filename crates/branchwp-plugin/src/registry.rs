//! Extension registry
//!
//! The host's navigation collects repository settings pages from plugins.
//! Each page is bound to a route and backed by a component that reads and
//! writes the page's configuration payload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};

/// What the host knows about the current settings page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsContext {
    /// Repository the page belongs to.
    pub repository: String,
    /// Whether the current user may only view the configuration.
    pub read_only: bool,
    /// User autocomplete endpoint.
    pub user_autocomplete_link: Option<String>,
    /// Group autocomplete endpoint.
    pub group_autocomplete_link: Option<String>,
}

impl SettingsContext {
    /// Create a writable context for a repository.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            ..Default::default()
        }
    }

    /// Set the read only flag.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set both autocomplete endpoints.
    pub fn with_autocomplete(
        mut self,
        users: impl Into<String>,
        groups: impl Into<String>,
    ) -> Self {
        self.user_autocomplete_link = Some(users.into());
        self.group_autocomplete_link = Some(groups.into());
        self
    }
}

/// Trait for repository settings components.
#[async_trait]
pub trait SettingsComponent: Send + Sync {
    /// Load the configuration payload of a repository.
    async fn load(&self, context: &SettingsContext) -> PluginResult<serde_json::Value>;

    /// Persist a configuration payload.
    async fn save(&self, context: &SettingsContext, payload: serde_json::Value)
        -> PluginResult<()>;
}

/// Description of a registered settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDefinition {
    /// Route below the repository settings path.
    pub route: String,
    /// Translation key of the navigation entry.
    pub label_key: String,
    /// Key of the configuration link the page binds to.
    pub settings_key: String,
}

struct Registration {
    definition: SettingDefinition,
    component: Arc<dyn SettingsComponent>,
}

/// Registry of repository settings pages.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    settings: Arc<RwLock<HashMap<String, Registration>>>,
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry").finish_non_exhaustive()
    }
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a settings page.
    ///
    /// # Errors
    ///
    /// [`PluginError::DuplicateRoute`] if the route is taken.
    pub async fn bind_repository_setting(
        &self,
        definition: SettingDefinition,
        component: Arc<dyn SettingsComponent>,
    ) -> PluginResult<()> {
        let mut settings = self.settings.write().await;

        if settings.contains_key(&definition.route) {
            warn!(route = %definition.route, "settings route already bound");
            return Err(PluginError::DuplicateRoute(definition.route));
        }

        debug!(
            route = %definition.route,
            label = %definition.label_key,
            "bound repository setting"
        );
        settings.insert(
            definition.route.clone(),
            Registration {
                definition,
                component,
            },
        );
        Ok(())
    }

    /// Get all settings pages, ordered by route.
    pub async fn list_settings(&self) -> Vec<SettingDefinition> {
        let settings = self.settings.read().await;
        let mut definitions: Vec<_> = settings.values().map(|r| r.definition.clone()).collect();
        definitions.sort_by(|a, b| a.route.cmp(&b.route));
        definitions
    }

    /// Get the component behind a route.
    pub async fn component(&self, route: &str) -> PluginResult<Arc<dyn SettingsComponent>> {
        let settings = self.settings.read().await;
        settings
            .get(route)
            .map(|r| r.component.clone())
            .ok_or_else(|| PluginError::RouteNotFound(route.to_string()))
    }

    /// Load the payload of the page behind `route`.
    pub async fn load(
        &self,
        route: &str,
        context: &SettingsContext,
    ) -> PluginResult<serde_json::Value> {
        self.component(route).await?.load(context).await
    }

    /// Save the payload of the page behind `route`.
    pub async fn save(
        &self,
        route: &str,
        context: &SettingsContext,
        payload: serde_json::Value,
    ) -> PluginResult<()> {
        self.component(route).await?.save(context, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoComponent {
        saved: Mutex<Option<serde_json::Value>>,
    }

    #[async_trait]
    impl SettingsComponent for EchoComponent {
        async fn load(&self, context: &SettingsContext) -> PluginResult<serde_json::Value> {
            Ok(serde_json::json!({ "repository": context.repository }))
        }

        async fn save(
            &self,
            _context: &SettingsContext,
            payload: serde_json::Value,
        ) -> PluginResult<()> {
            *self.saved.lock().unwrap() = Some(payload);
            Ok(())
        }
    }

    fn definition(route: &str) -> SettingDefinition {
        SettingDefinition {
            route: route.to_string(),
            label_key: "echo.navLink".to_string(),
            settings_key: "echoConfig".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bind_and_list() {
        let registry = ExtensionRegistry::new();
        registry
            .bind_repository_setting(definition("/zeta"), Arc::new(EchoComponent::default()))
            .await
            .unwrap();
        registry
            .bind_repository_setting(definition("/alpha"), Arc::new(EchoComponent::default()))
            .await
            .unwrap();

        let routes: Vec<_> = registry
            .list_settings()
            .await
            .into_iter()
            .map(|d| d.route)
            .collect();
        assert_eq!(routes, vec!["/alpha", "/zeta"]);
    }

    #[tokio::test]
    async fn test_duplicate_route() {
        let registry = ExtensionRegistry::new();
        registry
            .bind_repository_setting(definition("/echo"), Arc::new(EchoComponent::default()))
            .await
            .unwrap();

        let result = registry
            .bind_repository_setting(definition("/echo"), Arc::new(EchoComponent::default()))
            .await;
        assert!(matches!(result, Err(PluginError::DuplicateRoute(route)) if route == "/echo"));
    }

    #[tokio::test]
    async fn test_load_and_save() {
        let registry = ExtensionRegistry::new();
        let component = Arc::new(EchoComponent::default());
        registry
            .bind_repository_setting(definition("/echo"), component.clone())
            .await
            .unwrap();

        let context = SettingsContext::new("repo");
        let loaded = registry.load("/echo", &context).await.unwrap();
        assert_eq!(loaded["repository"], "repo");

        registry
            .save("/echo", &context, serde_json::json!({ "x": 1 }))
            .await
            .unwrap();
        assert_eq!(
            *component.saved.lock().unwrap(),
            Some(serde_json::json!({ "x": 1 }))
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let registry = ExtensionRegistry::new();
        let result = registry.load("/missing", &SettingsContext::new("repo")).await;
        assert!(matches!(result, Err(PluginError::RouteNotFound(_))));
    }
}
