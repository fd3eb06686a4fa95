//! # Branch Write Protection Service
//!
//! This crate decides who may write which branch of a repository.
//!
//! ## Overview
//!
//! The branchwp-service crate handles:
//! - **Configuration**: the per-repository enabled flag and rule list
//! - **Store**: where configurations live, behind an async trait
//! - **Privileges**: deny-before-allow evaluation with glob branch patterns
//!   and `{username}` / `{mail}` placeholders
//! - **Guards**: obstacles for editor changes and merges, push checks
//! - **Migration**: version 1 repository properties to structured records
//!
//! ## Architecture
//!
//! ```text
//! WriteGuard ─→ BranchWritePermissionService ─┬─→ ConfigurationStore
//!                                             └─→ GroupResolver
//! MigrationStep ─→ legacy::decode ─→ ConfigurationStore
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use branchwp_rules::Rule;
//! use branchwp_service::{
//!     BranchWritePermissionService, BranchWritePermissions, MemoryConfigurationStore,
//!     StaticGroups, User,
//! };
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let mut groups = StaticGroups::new();
//! groups.add("trillian", "heartofgold");
//!
//! let service = BranchWritePermissionService::new(
//!     Arc::new(MemoryConfigurationStore::new()),
//!     Arc::new(groups),
//! );
//!
//! let mut config = BranchWritePermissions::default();
//! config.permissions.push(Rule::allow_group("*", "heartofgold"));
//! service.set_permissions("repo", config).await.unwrap();
//!
//! let trillian = User::new("trillian");
//! assert!(service.is_privileged(&trillian, "repo", "main").await.unwrap());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod matcher;
pub mod migration;
pub mod permissions;
pub mod service;
pub mod store;
pub mod user;

// Re-export main types for convenience
pub use config::{ConfigError, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use guard::{Obstacle, WriteGuard};
pub use migration::{LegacyProperties, MigrationReport, MigrationStep};
pub use permissions::BranchWritePermissions;
pub use service::BranchWritePermissionService;
pub use store::{ConfigurationStore, MemoryConfigurationStore, StoreError, StoreResult};
pub use user::{GroupResolver, StaticGroups, User};
