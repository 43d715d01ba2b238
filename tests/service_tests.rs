//! Service-layer tests against a temporary database

use modhub::db::Database;
use modhub::error::ServiceError;
use modhub::models::{Module, NewModule, Role, User};
use modhub::services::{ModerationService, ModuleService, UserService};
use tempfile::TempDir;

struct TestApp {
    _tmp: TempDir,
    db: Database,
    users: UserService,
    modules: ModuleService,
    moderation: ModerationService,
}

fn setup() -> TestApp {
    let tmp = TempDir::new().unwrap();
    let db = Database::new(&tmp.path().join("test.db")).unwrap();
    TestApp {
        users: UserService::new(db.clone()),
        modules: ModuleService::new(db.clone()),
        moderation: ModerationService::new(db.clone()),
        db,
        _tmp: tmp,
    }
}

fn register_developer(app: &TestApp, name: &str) -> User {
    app.users
        .register(
            name,
            &format!("{}@example.com", name),
            "password123",
            Some("Developer"),
        )
        .unwrap()
}

fn upload_module(app: &TestApp, author_id: i64, name: &str, category_id: i64) -> Module {
    app.modules
        .upload_new_module(NewModule {
            author_id,
            name: name.to_string(),
            description: "desc".to_string(),
            category_id,
            version: "v1.0".to_string(),
            download_link: "http://x/dl".to_string(),
            changelog: None,
            min_platform_version: "20.4".to_string(),
            file_size_mb: None,
        })
        .unwrap()
}

// ============================================================================
// Registration and login
// ============================================================================

#[test]
fn register_rejects_duplicate_username_and_persists_nothing() {
    let app = setup();

    app.users
        .register("alice", "alice@example.com", "pw123456", None)
        .unwrap();

    let err = app
        .users
        .register("ALICE", "other@example.com", "pw123456", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The losing call must not have written a row
    assert!(app
        .db
        .get_user_by_email("other@example.com")
        .unwrap()
        .is_none());
}

#[test]
fn register_rejects_duplicate_email() {
    let app = setup();

    app.users
        .register("alice", "alice@example.com", "pw123456", None)
        .unwrap();

    let err = app
        .users
        .register("bob", "Alice@Example.com", "pw123456", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert!(app.db.get_user_by_username("bob").unwrap().is_none());
}

#[test]
fn register_rejects_blank_fields() {
    let app = setup();

    for (username, email, password) in
        [("", "a@x.com", "pw"), ("a", "  ", "pw"), ("a", "a@x.com", "")]
    {
        let err = app.users.register(username, email, password, None).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}

#[test]
fn register_falls_back_to_end_user_for_unknown_role() {
    let app = setup();

    let user = app
        .users
        .register("carol", "carol@example.com", "pw123456", Some("SuperAdmin"))
        .unwrap();

    assert_eq!(user.role, Role::EndUser);
}

#[test]
fn login_returns_user_with_role() {
    let app = setup();
    register_developer(&app, "alice");

    let user = app.users.login("alice", "password123").unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.role, Role::Developer);
}

#[test]
fn login_does_not_reveal_which_credential_failed() {
    let app = setup();
    register_developer(&app, "alice");

    let missing = app.users.login("nobody", "password123").unwrap_err();
    let wrong = app.users.login("alice", "wrongpassword").unwrap_err();

    assert!(matches!(missing, ServiceError::NotFound(_)));
    assert!(matches!(wrong, ServiceError::NotFound(_)));
    assert_eq!(missing.to_string(), wrong.to_string());
}

// ============================================================================
// Module publishing
// ============================================================================

#[test]
fn developer_uploads_module_with_first_version() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Performance", None).unwrap();

    let module = app
        .modules
        .upload_new_module(NewModule {
            author_id: alice.id,
            name: "Cleaner".to_string(),
            description: "desc".to_string(),
            category_id: cat.id,
            version: "v1.0".to_string(),
            download_link: "http://x/dl".to_string(),
            changelog: None,
            min_platform_version: "20.4".to_string(),
            file_size_mb: None,
        })
        .unwrap();

    assert!(!module.is_verified);

    let detail = app.modules.get_by_id(module.id).unwrap();
    assert_eq!(detail.versions.len(), 1);
    assert_eq!(detail.versions[0].version.version, "v1.0");

    // A second module with the same name is rejected
    let err = app
        .modules
        .upload_new_module(NewModule {
            author_id: alice.id,
            name: "Cleaner".to_string(),
            description: "other".to_string(),
            category_id: cat.id,
            version: "v2.0".to_string(),
            download_link: "http://y/dl".to_string(),
            changelog: None,
            min_platform_version: "20.4".to_string(),
            file_size_mb: None,
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn non_developer_cannot_upload() {
    let app = setup();
    let enduser = app
        .users
        .register("eve", "eve@example.com", "pw123456", None)
        .unwrap();
    let cat = app.moderation.add_category("Audio", None).unwrap();

    let err = app
        .modules
        .upload_new_module(NewModule {
            author_id: enduser.id,
            name: "Boost".to_string(),
            description: "desc".to_string(),
            category_id: cat.id,
            version: "v1.0".to_string(),
            download_link: "http://x/dl".to_string(),
            changelog: None,
            min_platform_version: "20.4".to_string(),
            file_size_mb: None,
        })
        .unwrap_err();

    assert!(matches!(err, ServiceError::Permission(_)));
    assert!(app.db.get_module_by_name("Boost").unwrap().is_none());
}

#[test]
fn module_creation_is_atomic_when_version_insert_fails() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Theme", None).unwrap();

    // Bypass service validation so the failure happens mid-transaction: the
    // module insert succeeds, the version insert trips the length CHECK.
    let result = app.db.create_module_with_version(&NewModule {
        author_id: alice.id,
        name: "Partial".to_string(),
        description: "desc".to_string(),
        category_id: cat.id,
        version: String::new(),
        download_link: "http://x/dl".to_string(),
        changelog: None,
        min_platform_version: "20.4".to_string(),
        file_size_mb: None,
    });

    assert!(result.is_err());
    assert!(app.db.get_module_by_name("Partial").unwrap().is_none());
}

#[test]
fn non_author_cannot_add_version() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let bob = register_developer(&app, "bob");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    let err = app
        .modules
        .add_version_to_module(module.id, bob.id, "v2.0", "http://x/dl2", None, "20.4", None)
        .unwrap_err();

    assert!(matches!(err, ServiceError::Permission(_)));
    assert_eq!(app.db.get_versions_for_module(module.id).unwrap().len(), 1);
}

#[test]
fn adding_version_refreshes_module_timestamp() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    app.modules
        .add_version_to_module(module.id, alice.id, "v2.0", "http://x/dl2", Some("fixes"), "21.0", Some(3.5))
        .unwrap();

    let reloaded = app.db.get_module_by_id(module.id).unwrap().unwrap();
    assert_ne!(reloaded.updated_at, module.updated_at);
    assert_eq!(app.db.get_versions_for_module(module.id).unwrap().len(), 2);
}

#[test]
fn list_by_author_requires_existing_author() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    upload_module(&app, alice.id, "Cleaner", cat.id);
    upload_module(&app, alice.id, "Booster", cat.id);

    let modules = app.modules.list_by_author(alice.id).unwrap();
    assert_eq!(modules.len(), 2);

    let err = app.modules.list_by_author(9999).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn search_is_case_insensitive_substring_match() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    upload_module(&app, alice.id, "AdBlocker", cat.id);
    upload_module(&app, alice.id, "GreenBlock", cat.id);
    upload_module(&app, alice.id, "FontPack", cat.id);

    let hits = app.modules.search_by_name("block").unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn search_with_blank_term_yields_empty_result() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    upload_module(&app, alice.id, "Cleaner", cat.id);

    assert!(app.modules.search_by_name("   ").unwrap().is_empty());
    assert!(app.modules.search_by_name("").unwrap().is_empty());
}

// ============================================================================
// Reviews and compatibility reports
// ============================================================================

#[test]
fn rating_out_of_range_writes_nothing() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    for rating in [0, 6, -1] {
        let err = app
            .modules
            .add_review(module.id, alice.id, rating, Some("nope"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    assert!(app.db.get_reviews_for_module(module.id).unwrap().is_empty());
}

#[test]
fn review_requires_existing_module_and_user() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    let err = app.modules.add_review(9999, alice.id, 4, None).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = app.modules.add_review(module.id, 9999, 4, None).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn same_user_may_review_a_module_twice() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    app.modules.add_review(module.id, alice.id, 5, Some("great")).unwrap();
    app.modules.add_review(module.id, alice.id, 2, Some("regressed")).unwrap();

    assert_eq!(app.db.get_reviews_for_module(module.id).unwrap().len(), 2);
}

#[test]
fn compatibility_report_appears_in_module_detail() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    let version_id = app.db.get_versions_for_module(module.id).unwrap()[0].id;

    app.modules
        .add_compatibility_report(version_id, alice.id, "Pixel 7", "14", "Works", Some(""))
        .unwrap();

    let detail = app.modules.get_by_id(module.id).unwrap();
    let reports = &detail.versions[0].reports;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].device_model, "Pixel 7");
    assert_eq!(reports[0].works_status.as_str(), "Works");
    // Blank notes are stored as absent
    assert!(reports[0].notes.is_none());
}

#[test]
fn compatibility_report_validates_inputs() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);
    let version_id = app.db.get_versions_for_module(module.id).unwrap()[0].id;

    let err = app
        .modules
        .add_compatibility_report(version_id, alice.id, "", "14", "Works", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = app
        .modules
        .add_compatibility_report(version_id, alice.id, "Pixel 7", "14", "Sometimes", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = app
        .modules
        .add_compatibility_report(9999, alice.id, "Pixel 7", "14", "Works", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

// ============================================================================
// Categories and tags
// ============================================================================

#[test]
fn category_name_lookup_is_case_insensitive() {
    let app = setup();
    let created = app.moderation.add_category("Foo", None).unwrap();

    let found = app.db.get_category_by_name("foo").unwrap().unwrap();
    assert_eq!(found.id, created.id);

    let err = app.moderation.add_category("FOO", None).unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn category_in_use_cannot_be_deleted() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let used = app.moderation.add_category("Used", None).unwrap();
    let unused = app.moderation.add_category("Unused", None).unwrap();
    upload_module(&app, alice.id, "Cleaner", used.id);

    let err = app.moderation.delete_category(used.id).unwrap_err();
    assert!(matches!(err, ServiceError::BusinessRule(_)));
    assert!(app.db.get_category_by_id(used.id).unwrap().is_some());

    app.moderation.delete_category(unused.id).unwrap();
    assert!(app.db.get_category_by_id(unused.id).unwrap().is_none());
}

#[test]
fn category_update_rejects_rename_collision_and_skips_noops() {
    let app = setup();
    let a = app.moderation.add_category("Audio", Some("sound")).unwrap();
    app.moderation.add_category("Video", None).unwrap();

    let err = app
        .moderation
        .update_category(a.id, Some("video"), None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // No-op update returns the unchanged row
    let same = app
        .moderation
        .update_category(a.id, Some("Audio"), Some("sound"))
        .unwrap();
    assert_eq!(same.name, "Audio");
    assert_eq!(same.description.as_deref(), Some("sound"));

    let renamed = app
        .moderation
        .update_category(a.id, Some("Sound"), None)
        .unwrap();
    assert_eq!(renamed.name, "Sound");

    let err = app.moderation.update_category(9999, Some("X"), None).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn tag_in_use_cannot_be_deleted() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    let used = app.moderation.add_tag("systemless").unwrap();
    let unused = app.moderation.add_tag("beta").unwrap();
    app.moderation
        .assign_tags_to_module(module.id, &[used.id])
        .unwrap();

    let err = app.moderation.delete_tag(used.id).unwrap_err();
    assert!(matches!(err, ServiceError::BusinessRule(_)));
    assert!(app.db.get_tag_by_id(used.id).unwrap().is_some());

    app.moderation.delete_tag(unused.id).unwrap();
    assert!(app.db.get_tag_by_id(unused.id).unwrap().is_none());
}

#[test]
fn assign_tags_reconciles_to_exact_set() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    let a = app.moderation.add_tag("alpha").unwrap();
    let b = app.moderation.add_tag("bravo").unwrap();
    let c = app.moderation.add_tag("charlie").unwrap();

    app.moderation
        .assign_tags_to_module(module.id, &[a.id, b.id])
        .unwrap();
    let mut ids = app.db.get_tag_ids_for_module(module.id).unwrap();
    ids.sort();
    assert_eq!(ids, vec![a.id, b.id]);

    // Reconcile: bravo stays, alpha is removed, charlie is added
    app.moderation
        .assign_tags_to_module(module.id, &[b.id, c.id])
        .unwrap();
    let mut ids = app.db.get_tag_ids_for_module(module.id).unwrap();
    ids.sort();
    assert_eq!(ids, vec![b.id, c.id]);

    // Unknown tag ids are rejected before anything changes
    let err = app
        .moderation
        .assign_tags_to_module(module.id, &[b.id, 9999])
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    let mut ids = app.db.get_tag_ids_for_module(module.id).unwrap();
    ids.sort();
    assert_eq!(ids, vec![b.id, c.id]);
}

// ============================================================================
// Verification
// ============================================================================

#[test]
fn verify_flips_flag_and_refreshes_timestamp() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    assert_eq!(app.moderation.list_unverified().unwrap().len(), 1);

    let verified = app.moderation.verify(module.id, true).unwrap();
    assert!(verified.is_verified);
    assert_ne!(verified.updated_at, module.updated_at);
    assert!(app.moderation.list_unverified().unwrap().is_empty());

    // Revoking refreshes the stamp again
    let revoked = app.moderation.verify(module.id, false).unwrap();
    assert!(!revoked.is_verified);
    assert_ne!(revoked.updated_at, verified.updated_at);
}

#[test]
fn double_verify_is_idempotent() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);

    let first = app.moderation.verify(module.id, true).unwrap();
    let second = app.moderation.verify(module.id, true).unwrap();

    assert!(second.is_verified);
    assert_eq!(second.updated_at, first.updated_at);
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn username_lookup_is_case_insensitive() {
    let app = setup();
    register_developer(&app, "alice");

    let user = app.db.get_user_by_username("ALICE").unwrap().unwrap();
    assert_eq!(user.username, "alice");

    let detail_via_login = app.users.login("Alice", "password123").unwrap();
    assert_eq!(detail_via_login.username, "alice");
}

#[test]
fn module_detail_includes_author_category_and_tags() {
    let app = setup();
    let alice = register_developer(&app, "alice");
    let cat = app.moderation.add_category("Tools", None).unwrap();
    let module = upload_module(&app, alice.id, "Cleaner", cat.id);
    let tag = app.moderation.add_tag("systemless").unwrap();
    app.moderation
        .assign_tags_to_module(module.id, &[tag.id])
        .unwrap();
    app.modules.add_review(module.id, alice.id, 4, Some("solid")).unwrap();

    let detail = app.modules.get_by_id(module.id).unwrap();
    assert_eq!(detail.module.author_username, "alice");
    assert_eq!(detail.module.category_name, "Tools");
    assert_eq!(detail.tags.len(), 1);
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.reviews[0].rating, 4);

    let err = app.modules.get_by_id(9999).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
