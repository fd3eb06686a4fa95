//! Settings page tests.
//!
//! Drive the page the way the host does: open the form, edit it, submit it,
//! then check that pushes are guarded by the saved rules.

use branchwp_plugin::{
    register, BranchWpSettings, ExtensionRegistry, SettingsComponent, SettingsContext, ROUTE,
};
use branchwp_rules::Rule;
use branchwp_service::{
    BranchWritePermissionService, LegacyProperties, MemoryConfigurationStore, MigrationStep,
    StaticGroups, User, WriteGuard,
};
use std::sync::Arc;

/// Test fixture with a registered settings page.
struct TestFixture {
    /// Registry holding the page.
    registry: ExtensionRegistry,
    /// Component behind the page.
    settings: BranchWpSettings,
    /// Guard sharing the page's service.
    guard: WriteGuard,
}

impl TestFixture {
    async fn new() -> Self {
        let mut groups = StaticGroups::new();
        groups.add("jeltz", "vogons");

        let service = Arc::new(BranchWritePermissionService::new(
            Arc::new(MemoryConfigurationStore::new()),
            Arc::new(groups),
        ));

        let registry = ExtensionRegistry::new();
        register(&registry, service.clone()).await.unwrap();

        Self {
            registry,
            settings: BranchWpSettings::new(service.clone()),
            guard: WriteGuard::new(service),
        }
    }

    fn context() -> SettingsContext {
        SettingsContext::new("hog").with_autocomplete(
            "/api/v2/autocomplete/users",
            "/api/v2/autocomplete/groups",
        )
    }
}

#[tokio::test]
async fn test_edit_and_submit_form() {
    let fixture = TestFixture::new().await;
    let context = TestFixture::context();

    let mut form = fixture.settings.form(&context).await.unwrap();
    assert!(form.shows_rules());
    assert_eq!(form.autocomplete_link(), Some("/api/v2/autocomplete/users"));

    form.add_rule(Rule::allow_user("*", "jeltz")).unwrap();

    let draft = form.draft_mut();
    draft.branch = "main".to_string();
    draft.set_group(true);
    draft.principal = Some("vogons".to_string());
    draft.is_deny = true;
    form.submit_draft().unwrap();

    assert!(form.is_valid());
    fixture.settings.submit(&context, form).await.unwrap();

    let jeltz = User::new("jeltz");
    fixture
        .guard
        .check_push(&jeltz, "hog", ["develop"])
        .await
        .unwrap();
    assert!(fixture
        .guard
        .check_push(&jeltz, "hog", ["main"])
        .await
        .is_err());
}

#[tokio::test]
async fn test_payload_round_trip_through_registry() {
    let fixture = TestFixture::new().await;
    let context = TestFixture::context();

    let mut payload = fixture.registry.load(ROUTE, &context).await.unwrap();
    payload["permissions"] = serde_json::json!([
        { "branch": "release/*", "name": "vogons", "group": true, "type": "DENY" }
    ]);
    fixture
        .registry
        .save(ROUTE, &context, payload.clone())
        .await
        .unwrap();

    assert_eq!(fixture.registry.load(ROUTE, &context).await.unwrap(), payload);
}

#[tokio::test]
async fn test_disabling_from_form() {
    let fixture = TestFixture::new().await;
    let context = TestFixture::context();

    let mut form = fixture.settings.form(&context).await.unwrap();
    form.add_rule(Rule::allow_user("*", "trillian")).unwrap();
    fixture.settings.submit(&context, form).await.unwrap();

    let marvin = User::new("marvin");
    assert!(fixture
        .guard
        .check_push(&marvin, "hog", ["main"])
        .await
        .is_err());

    let mut form = fixture.settings.form(&context).await.unwrap();
    form.set_enabled(false).unwrap();
    assert!(!form.shows_rules());
    fixture.settings.submit(&context, form).await.unwrap();

    fixture
        .guard
        .check_push(&marvin, "hog", ["main"])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_migrated_configuration_saves_again() {
    let store = MemoryConfigurationStore::new();
    let service = Arc::new(BranchWritePermissionService::new(
        Arc::new(store.clone()),
        Arc::new(StaticGroups::new()),
    ));
    let settings = BranchWpSettings::new(service.clone());
    let context = TestFixture::context();

    let mut properties = LegacyProperties::new();
    properties.insert("branchwp.enabled".to_string(), "true".to_string());
    properties.insert(
        "branchwp.permissions".to_string(),
        "x,@@ops;!!release, ;".to_string(),
    );
    MigrationStep::new(Arc::new(store))
        .run(vec![("hog".to_string(), properties)])
        .await
        .unwrap();

    let form = settings.form(&context).await.unwrap();
    assert!(form.is_valid());

    let payload = settings.load(&context).await.unwrap();
    settings.save(&context, payload.clone()).await.unwrap();
    assert_eq!(settings.load(&context).await.unwrap(), payload);

    let stored = service.permissions("hog").await.unwrap();
    assert_eq!(
        stored.permissions.as_slice(),
        &[
            Rule::allow_group("x", "@ops"),
            Rule::deny_user("!release", " ")
        ]
    );
}
