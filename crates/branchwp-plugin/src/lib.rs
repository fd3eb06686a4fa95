//! # Branch Write Protection Plugin
//!
//! Repository settings page for branch write protection.
//!
//! ## Overview
//!
//! The branchwp-plugin crate handles:
//! - **Registration**: binds the `/branchwp` settings page to the host
//! - **Form state**: enabled toggle, rule table and the "add rule" form
//! - **Persistence**: loads and saves the JSON payload through the
//!   permission service
//!
//! ## Architecture
//!
//! ```text
//! ExtensionRegistry ─→ BranchWpSettings ─→ BranchWritePermissionService
//!                            │
//!                            └─→ PermissionsForm
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use branchwp_plugin::{register, ExtensionRegistry, SettingsContext, ROUTE};
//! use branchwp_service::{BranchWritePermissionService, MemoryConfigurationStore, StaticGroups};
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let service = Arc::new(BranchWritePermissionService::new(
//!     Arc::new(MemoryConfigurationStore::new()),
//!     Arc::new(StaticGroups::new()),
//! ));
//!
//! let registry = ExtensionRegistry::new();
//! register(&registry, service).await.unwrap();
//!
//! let payload = registry.load(ROUTE, &SettingsContext::new("repo")).await.unwrap();
//! assert_eq!(payload["enabled"], true);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod error;
pub mod form;
pub mod plugin;
pub mod registry;

// Re-export main types for convenience
pub use error::{PluginError, PluginResult};
pub use form::{AutocompleteLinks, FormError, FormResult, PermissionsForm, RuleDraft};
pub use plugin::{register, BranchWpSettings, LABEL_KEY, ROUTE, SETTINGS_KEY};
pub use registry::{ExtensionRegistry, SettingDefinition, SettingsComponent, SettingsContext};
