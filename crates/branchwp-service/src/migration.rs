//! # Legacy Property Migration
//!
//! Version 1 of the plugin kept its configuration in two repository
//! properties:
//!
//! - `branchwp.enabled`: `"true"` or anything else
//! - `branchwp.permissions`: the legacy flat rule string
//!
//! The migration step turns those into structured
//! [`BranchWritePermissions`] records. [`legacy_properties`] goes the other
//! way for hosts that still persist the property form.

use branchwp_rules::{legacy, CodecResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::permissions::BranchWritePermissions;
use crate::store::ConfigurationStore;

/// Property key of the enabled flag.
pub const ENABLED_PROPERTY: &str = "branchwp.enabled";

/// Property key of the legacy rule string.
pub use branchwp_rules::legacy::PERMISSIONS_PROPERTY;

/// Repository properties as stored by version 1.
pub type LegacyProperties = HashMap<String, String>;

/// Build the structured configuration from legacy properties.
///
/// # Returns
///
/// `None` when there is no (or an empty) rule string; such repositories
/// keep the defaults of a fresh configuration.
///
/// # Example
///
/// ```
/// use branchwp_rules::Rule;
/// use branchwp_service::migration::{migrate_properties, LegacyProperties};
///
/// let mut props = LegacyProperties::new();
/// props.insert("branchwp.enabled".into(), "true".into());
/// props.insert("branchwp.permissions".into(), "master,dent;!default,@vogons;".into());
///
/// let config = migrate_properties(&props).unwrap();
/// assert!(config.enabled);
/// assert_eq!(config.permissions.get(1), Some(&Rule::deny_group("default", "vogons")));
/// ```
pub fn migrate_properties(properties: &LegacyProperties) -> Option<BranchWritePermissions> {
    let encoded = properties
        .get(PERMISSIONS_PROPERTY)
        .filter(|value| !value.is_empty())?;

    let enabled = properties
        .get(ENABLED_PROPERTY)
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Some(BranchWritePermissions::new(enabled, legacy::decode(encoded)))
}

/// Render a configuration as legacy properties.
///
/// # Errors
///
/// Fails if a rule cannot be written in the legacy format.
pub fn legacy_properties(permissions: &BranchWritePermissions) -> CodecResult<LegacyProperties> {
    let mut properties = LegacyProperties::new();
    properties.insert(ENABLED_PROPERTY.to_string(), permissions.enabled.to_string());
    properties.insert(
        PERMISSIONS_PROPERTY.to_string(),
        legacy::encode(&permissions.permissions)?,
    );
    Ok(properties)
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Repositories that received a structured configuration.
    pub migrated: usize,
    /// Repositories with branchwp properties but no rules to migrate.
    pub skipped: usize,
}

/// Update step migrating version 1 properties into the configuration store.
#[derive(Clone)]
pub struct MigrationStep {
    store: Arc<dyn ConfigurationStore>,
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("target_version", &Self::TARGET_VERSION)
            .finish()
    }
}

impl MigrationStep {
    /// Plugin version the step migrates to.
    pub const TARGET_VERSION: &'static str = "2.0.0";

    /// Data type the step rewrites.
    pub const AFFECTED_DATA_TYPE: &'static str = "sonia.scm.branchwp.config.repository.xml";

    /// Create the step.
    pub fn new(store: Arc<dyn ConfigurationStore>) -> Self {
        Self { store }
    }

    /// Migrate every repository that has any branchwp property.
    ///
    /// # Arguments
    ///
    /// * `repositories` - `(repository id, version 1 properties)` pairs
    pub async fn run<I>(&self, repositories: I) -> ServiceResult<MigrationReport>
    where
        I: IntoIterator<Item = (String, LegacyProperties)>,
    {
        let mut report = MigrationReport::default();

        for (repository, properties) in repositories {
            if !properties.contains_key(ENABLED_PROPERTY)
                && !properties.contains_key(PERMISSIONS_PROPERTY)
            {
                continue;
            }

            debug!(
                repository = %repository,
                "migrating repository specific branchwp configuration"
            );

            match migrate_properties(&properties) {
                Some(permissions) => {
                    self.store.set(&repository, permissions).await?;
                    report.migrated += 1;
                }
                None => report.skipped += 1,
            }
        }

        info!(
            migrated = report.migrated,
            skipped = report.skipped,
            "branchwp migration finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConfigurationStore;
    use branchwp_rules::Rule;

    fn props(pairs: &[(&str, &str)]) -> LegacyProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_migrate_without_permissions() {
        assert!(migrate_properties(&props(&[("branchwp.enabled", "true")])).is_none());
        assert!(migrate_properties(&props(&[("branchwp.permissions", "")])).is_none());
    }

    #[test]
    fn test_migrate_enabled_flag() {
        let config =
            migrate_properties(&props(&[("branchwp.permissions", "master,dent;")])).unwrap();
        assert!(!config.enabled);

        let config = migrate_properties(&props(&[
            ("branchwp.enabled", "TRUE"),
            ("branchwp.permissions", "master,dent;"),
        ]))
        .unwrap();
        assert!(config.enabled);

        let config = migrate_properties(&props(&[
            ("branchwp.enabled", "yes"),
            ("branchwp.permissions", "master,dent;"),
        ]))
        .unwrap();
        assert!(!config.enabled);
    }

    #[test]
    fn test_migrate_rules() {
        let config = migrate_properties(&props(&[
            ("branchwp.enabled", "true"),
            ("branchwp.permissions", "master,dent;default,@heartofgold;"),
        ]))
        .unwrap();

        assert_eq!(
            config.permissions.as_slice(),
            &[
                Rule::allow_user("master", "dent"),
                Rule::allow_group("default", "heartofgold")
            ]
        );
    }

    #[test]
    fn test_migrated_rules_are_savable() {
        let config = migrate_properties(&props(&[
            ("branchwp.enabled", "true"),
            ("branchwp.permissions", "x,@@ops;!!release, ;!,@;"),
        ]))
        .unwrap();

        assert_eq!(
            config.permissions.as_slice(),
            &[
                Rule::allow_group("x", "@ops"),
                Rule::deny_user("!release", " "),
                Rule::allow_user("!", "@"),
            ]
        );
        assert!(config.permissions.validate().is_ok());
        assert_eq!(
            legacy_properties(&config)
                .unwrap()
                .get("branchwp.permissions")
                .map(String::as_str),
            Some("x,@@ops;!!release, ;!,@;")
        );
    }

    #[test]
    fn test_legacy_properties() {
        let config = BranchWritePermissions::new(
            true,
            vec![Rule::deny_group("main", "vogons")].into(),
        );
        let properties = legacy_properties(&config).unwrap();
        assert_eq!(properties.get("branchwp.enabled").map(String::as_str), Some("true"));
        assert_eq!(
            properties.get("branchwp.permissions").map(String::as_str),
            Some("!main,@vogons;")
        );

        assert_eq!(migrate_properties(&properties), Some(config));
    }

    #[test]
    fn test_legacy_properties_rejects_invalid_rule() {
        let config = BranchWritePermissions::new(
            true,
            vec![Rule::allow_user("main", "a,b")].into(),
        );
        assert!(legacy_properties(&config).is_err());
    }

    #[tokio::test]
    async fn test_run() {
        let store = MemoryConfigurationStore::new();
        let step = MigrationStep::new(Arc::new(store.clone()));

        let report = step
            .run(vec![
                (
                    "repo-1".to_string(),
                    props(&[
                        ("branchwp.enabled", "true"),
                        ("branchwp.permissions", "master,dent;"),
                    ]),
                ),
                ("repo-2".to_string(), props(&[("branchwp.enabled", "true")])),
                ("repo-3".to_string(), props(&[("other.plugin", "x")])),
            ])
            .await
            .unwrap();

        assert_eq!(report, MigrationReport { migrated: 1, skipped: 1 });
        assert_eq!(store.repositories().await.unwrap(), vec!["repo-1"]);

        let migrated = store.get("repo-1").await.unwrap().unwrap();
        assert!(migrated.enabled);
        assert_eq!(migrated.permissions.len(), 1);
    }

    #[test]
    fn test_step_metadata() {
        assert_eq!(MigrationStep::TARGET_VERSION, "2.0.0");
        assert_eq!(
            MigrationStep::AFFECTED_DATA_TYPE,
            "sonia.scm.branchwp.config.repository.xml"
        );
    }
}
