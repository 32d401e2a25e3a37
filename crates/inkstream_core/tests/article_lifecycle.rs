use inkstream_core::db::open_db_in_memory;
use inkstream_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use inkstream_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use inkstream_core::service::article_service::{ArticleDraft, ArticlePatch, ArticleService};
use inkstream_core::{
    ArticleStatus, Category, DomainError, MemoryAssetStore, NullAssetStore,
    SqliteArticleRepository, User, UserId,
};
use rusqlite::Connection;

fn seed_user(conn: &Connection, handle: &str) -> UserId {
    let user = User::new(
        format!("{handle} name"),
        handle,
        format!("{handle}@example.com"),
    );
    SqliteUserRepository::new(conn).create_user(&user).unwrap()
}

fn seed_category(conn: &Connection, name: &str, slug: &str) -> Category {
    let category = Category::new(name, slug);
    SqliteCategoryRepository::new(conn)
        .create_category(&category)
        .unwrap();
    category
}

fn draft(title: &str, body: &str) -> ArticleDraft {
    ArticleDraft {
        title: title.to_string(),
        body: body.to_string(),
        ..ArticleDraft::default()
    }
}

#[test]
fn create_stores_article_with_derived_slug() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let record = service
        .create_article(author, draft("Hello, World!", "first body"))
        .unwrap();

    assert_eq!(record.article.title, "Hello, World!");
    assert_eq!(record.article.slug, "hello-world");
    assert_eq!(record.article.status, ArticleStatus::Published);
    assert_eq!(record.article.view_count, 0);
    assert_eq!(record.author.handle, "alice");
}

#[test]
fn identical_titles_receive_distinct_slugs() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let first = service
        .create_article(author, draft("My Post", "one"))
        .unwrap();
    let second = service
        .create_article(author, draft("My Post", "two"))
        .unwrap();
    let third = service
        .create_article(author, draft("My Post", "three"))
        .unwrap();

    assert_eq!(first.article.slug, "my-post");
    assert_eq!(second.article.slug, "my-post-1");
    assert_eq!(third.article.slug, "my-post-2");
}

#[test]
fn create_rejects_empty_title_and_body() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let err = service.create_article(author, draft("   ", "body")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let err = service.create_article(author, draft("Title", "  ")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn create_rejects_title_without_slug_characters() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let err = service.create_article(author, draft("!!!", "body")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn create_with_unknown_status_is_invalid_input() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let mut payload = draft("Title", "body");
    payload.status = Some("live".to_string());
    let err = service.create_article(author, payload).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn create_as_draft_keeps_draft_status() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let mut payload = draft("Quiet Work", "body");
    payload.status = Some("draft".to_string());
    let record = service.create_article(author, payload).unwrap();

    assert_eq!(record.article.status, ArticleStatus::Draft);
}

#[test]
fn create_attaches_categories() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let rust = seed_category(&conn, "Rust", "rust");
    let tools = seed_category(&conn, "Tools", "tools");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let mut payload = draft("Crates I Use", "body");
    payload.categories = vec![rust.uuid, tools.uuid];
    let record = service.create_article(author, payload).unwrap();

    let mut names: Vec<_> = record
        .categories
        .iter()
        .map(|category| category.name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Rust", "Tools"]);
}

#[test]
fn create_with_unknown_category_is_invalid_input() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let mut payload = draft("Title", "body");
    payload.categories = vec![uuid::Uuid::new_v4()];
    let err = service.create_article(author, payload).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn update_without_title_change_keeps_slug() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let created = service
        .create_article(author, draft("Stable Title", "body"))
        .unwrap();

    let patch = ArticlePatch {
        body: Some("revised body".to_string()),
        ..ArticlePatch::default()
    };
    let updated = service
        .update_article(author, created.article.uuid, patch)
        .unwrap();

    assert_eq!(updated.article.slug, "stable-title");
    assert_eq!(updated.article.body, "revised body");
}

#[test]
fn update_with_new_title_rederives_slug() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let created = service
        .create_article(author, draft("Old Title", "body"))
        .unwrap();

    let patch = ArticlePatch {
        title: Some("New Title".to_string()),
        ..ArticlePatch::default()
    };
    let updated = service
        .update_article(author, created.article.uuid, patch)
        .unwrap();

    assert_eq!(updated.article.title, "New Title");
    assert_eq!(updated.article.slug, "new-title");
}

#[test]
fn update_by_non_owner_is_forbidden_and_leaves_article_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let intruder = seed_user(&conn, "mallory");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let created = service
        .create_article(author, draft("Owned Post", "body"))
        .unwrap();

    let patch = ArticlePatch {
        title: Some("Hijacked".to_string()),
        ..ArticlePatch::default()
    };
    let err = service
        .update_article(intruder, created.article.uuid, patch)
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let reloaded = service.get_article(created.article.uuid).unwrap();
    assert_eq!(reloaded.article.title, "Owned Post");
    assert_eq!(reloaded.article.slug, "owned-post");
}

#[test]
fn delete_hides_article_and_keeps_row() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let created = service
        .create_article(author, draft("Short Lived", "body"))
        .unwrap();
    service.delete_article(author, created.article.uuid).unwrap();

    let err = service.get_article(created.article.uuid).unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    drop(service);

    let tombstoned: i64 = conn
        .query_row(
            "SELECT is_deleted FROM articles WHERE uuid = ?1;",
            [created.article.uuid.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tombstoned, 1);
}

#[test]
fn delete_by_non_owner_is_forbidden() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let intruder = seed_user(&conn, "mallory");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let created = service
        .create_article(author, draft("Keep Out", "body"))
        .unwrap();
    let err = service
        .delete_article(intruder, created.article.uuid)
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    assert!(service.get_article(created.article.uuid).is_ok());
}

#[test]
fn deleted_article_frees_its_slug() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let first = service
        .create_article(author, draft("Recycled", "body"))
        .unwrap();
    service.delete_article(author, first.article.uuid).unwrap();

    let second = service
        .create_article(author, draft("Recycled", "body"))
        .unwrap();
    assert_eq!(second.article.slug, "recycled");
}

#[test]
fn replacing_image_releases_previous_asset() {
    let store = MemoryAssetStore::new();
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), &store);

    let mut payload = draft("Cover Story", "body");
    payload.image_ref = Some("asset:cover-v1".to_string());
    let created = service.create_article(author, payload).unwrap();

    let patch = ArticlePatch {
        image_ref: Some("asset:cover-v2".to_string()),
        ..ArticlePatch::default()
    };
    let updated = service
        .update_article(author, created.article.uuid, patch)
        .unwrap();

    assert_eq!(updated.article.image_ref.as_deref(), Some("asset:cover-v2"));
    assert_eq!(store.released_refs(), vec!["asset:cover-v1".to_string()]);
}

#[test]
fn deleting_article_releases_its_image() {
    let store = MemoryAssetStore::new();
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), &store);

    let mut payload = draft("Illustrated", "body");
    payload.image_ref = Some("asset:final".to_string());
    let created = service.create_article(author, payload).unwrap();

    service.delete_article(author, created.article.uuid).unwrap();
    assert_eq!(store.released_refs(), vec!["asset:final".to_string()]);
}

#[test]
fn view_article_counts_each_view() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let created = service
        .create_article(author, draft("Popular", "body"))
        .unwrap();

    service.view_article(created.article.uuid).unwrap();
    service.view_article(created.article.uuid).unwrap();
    let record = service.view_article(created.article.uuid).unwrap();

    assert_eq!(record.article.view_count, 3);
}
