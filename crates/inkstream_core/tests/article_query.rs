use inkstream_core::db::open_db_in_memory;
use inkstream_core::model::comment::Comment;
use inkstream_core::model::reaction::ReactionKind;
use inkstream_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use inkstream_core::repo::comment_repo::{CommentRepository, SqliteCommentRepository};
use inkstream_core::repo::reaction_repo::{ReactionRepository, SqliteReactionRepository};
use inkstream_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use inkstream_core::service::article_service::{ArticleDraft, ArticleQueryRequest, ArticleService};
use inkstream_core::{
    ArticleId, Category, DomainError, NullAssetStore, SqliteArticleRepository, User, UserId,
};
use rusqlite::Connection;
use uuid::Uuid;

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

fn seed_article(
    service: &mut ArticleService<SqliteArticleRepository<'_>, NullAssetStore>,
    author: UserId,
    title: &str,
    body: &str,
) -> ArticleId {
    let payload = ArticleDraft {
        title: title.to_string(),
        body: body.to_string(),
        ..ArticleDraft::default()
    };
    service.create_article(author, payload).unwrap().article.uuid
}

fn query() -> ArticleQueryRequest {
    ArticleQueryRequest {
        page: 1,
        ..ArticleQueryRequest::default()
    }
}

#[test]
fn listing_returns_published_articles_only() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    seed_article(&mut service, author, "Public Piece", "body");
    let mut hidden = ArticleDraft {
        title: "Hidden Draft".to_string(),
        body: "body".to_string(),
        ..ArticleDraft::default()
    };
    hidden.status = Some("draft".to_string());
    service.create_article(author, hidden).unwrap();

    let page = service.list_articles(query()).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].article.title, "Public Piece");
}

#[test]
fn short_search_term_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let _author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let mut request = query();
    request.search_term = Some("ab".to_string());
    let err = service.list_articles(request).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn search_matches_title_body_summary_and_category_name() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let ferris = seed_category(&conn, "Ferrises", "ferrises");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    seed_article(&mut service, author, "All about ferris", "plain body");
    seed_article(&mut service, author, "Second", "the ferris appears here");
    let mut with_summary = ArticleDraft {
        title: "Third".to_string(),
        body: "body".to_string(),
        summary: Some("a ferris summary".to_string()),
        ..ArticleDraft::default()
    };
    service.create_article(author, with_summary.clone()).unwrap();
    with_summary.title = "Fourth".to_string();
    with_summary.summary = None;
    with_summary.categories = vec![ferris.uuid];
    service.create_article(author, with_summary).unwrap();
    seed_article(&mut service, author, "Unrelated", "nothing to see");

    let mut request = query();
    request.search_term = Some("ferris".to_string());
    let page = service.list_articles(request).unwrap();
    assert_eq!(page.total_count, 4);
}

#[test]
fn search_treats_like_wildcards_literally() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    seed_article(&mut service, author, "Discount", "save 50% today");
    seed_article(&mut service, author, "Other", "save 50 dollars today");

    let mut request = query();
    request.search_term = Some("50%".to_string());
    let page = service.list_articles(request).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].article.title, "Discount");
}

#[test]
fn category_and_author_filters_compose_with_and() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let rust = seed_category(&conn, "Rust", "rust");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let mut in_rust = ArticleDraft {
        title: "Alice on Rust".to_string(),
        body: "body".to_string(),
        categories: vec![rust.uuid],
        ..ArticleDraft::default()
    };
    service.create_article(alice, in_rust.clone()).unwrap();
    in_rust.title = "Bob on Rust".to_string();
    service.create_article(bob, in_rust).unwrap();
    seed_article(&mut service, alice, "Alice off topic", "body");

    let mut request = query();
    request.category_slug = Some("rust".to_string());
    request.author = Some(alice);
    let page = service.list_articles(request).unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].article.title, "Alice on Rust");
}

#[test]
fn unknown_sort_field_falls_back_to_created_at() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    for title in ["One", "Two", "Three"] {
        seed_article(&mut service, author, title, "body");
    }

    let mut bogus = query();
    bogus.sort_field = Some("nonsense".to_string());
    let bogus_page = service.list_articles(bogus).unwrap();

    let default_page = service.list_articles(query()).unwrap();

    let bogus_ids: Vec<_> = bogus_page
        .items
        .iter()
        .map(|record| record.article.uuid)
        .collect();
    let default_ids: Vec<_> = default_page
        .items
        .iter()
        .map(|record| record.article.uuid)
        .collect();
    assert_eq!(bogus_ids, default_ids);
}

#[test]
fn title_sort_orders_case_insensitively() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    seed_article(&mut service, author, "banana", "body");
    seed_article(&mut service, author, "Apple", "body");
    seed_article(&mut service, author, "cherry", "body");

    let mut request = query();
    request.sort_field = Some("title".to_string());
    request.sort_direction = Some("asc".to_string());
    let page = service.list_articles(request).unwrap();

    let titles: Vec<_> = page
        .items
        .iter()
        .map(|record| record.article.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
}

#[test]
fn view_count_sort_orders_by_views() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    let quiet = seed_article(&mut service, author, "Quiet", "body");
    let popular = seed_article(&mut service, author, "Popular", "body");
    for _ in 0..3 {
        service.view_article(popular).unwrap();
    }
    service.view_article(quiet).unwrap();

    let mut request = query();
    request.sort_field = Some("view_count".to_string());
    let page = service.list_articles(request).unwrap();

    let titles: Vec<_> = page
        .items
        .iter()
        .map(|record| record.article.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Popular", "Quiet"]);
}

#[test]
fn pagination_envelope_reports_totals() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    for n in 0..12 {
        seed_article(&mut service, author, &format!("Post {n}"), "body");
    }

    let first = service.list_articles(query()).unwrap();
    assert_eq!(first.page, 1);
    assert_eq!(first.page_size, 10);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_count, 12);

    let mut second_request = query();
    second_request.page = 2;
    let second = service.list_articles(second_request).unwrap();
    assert_eq!(second.page, 2);
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.total_count, 12);
}

#[test]
fn huge_page_number_yields_an_empty_page() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    seed_article(&mut service, author, "Lonely", "body");

    let mut request = query();
    request.page = u32::MAX;
    request.page_size = Some(50);
    let page = service.list_articles(request).unwrap();

    assert_eq!(page.page, u32::MAX);
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 1);
}

#[test]
fn records_carry_reaction_and_comment_counts() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let fans: Vec<_> = ["fan1", "fan2", "fan3"]
        .iter()
        .map(|handle| seed_user(&conn, handle))
        .collect();

    let article_id = {
        let mut service =
            ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);
        seed_article(&mut service, author, "Counted", "body")
    };

    let reactions = SqliteReactionRepository::new(&conn);
    for fan in &fans {
        reactions
            .insert_reaction(Uuid::new_v4(), article_id, *fan, ReactionKind::Like)
            .unwrap();
    }
    reactions
        .insert_reaction(Uuid::new_v4(), article_id, fans[0], ReactionKind::Bookmark)
        .unwrap();

    let comments = SqliteCommentRepository::new(&conn);
    comments
        .create_comment(&Comment::new(article_id, fans[0], "nice"))
        .unwrap();
    comments
        .create_comment(&Comment::new(article_id, fans[1], "agreed"))
        .unwrap();

    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);
    let record = service.get_article(article_id).unwrap();
    assert_eq!(record.like_count, 3);
    assert_eq!(record.bookmark_count, 1);
    assert_eq!(record.favorite_count, 0);
    assert_eq!(record.comment_count, 2);
}

#[test]
fn my_articles_includes_drafts_and_filters_by_status() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);

    seed_article(&mut service, author, "Live Post", "body");
    let draft = ArticleDraft {
        title: "Work in Progress".to_string(),
        body: "body".to_string(),
        status: Some("draft".to_string()),
        ..ArticleDraft::default()
    };
    service.create_article(author, draft).unwrap();

    let all = service.my_articles(author, None, 1, None).unwrap();
    assert_eq!(all.total_count, 2);

    let drafts = service.my_articles(author, Some("draft"), 1, None).unwrap();
    assert_eq!(drafts.total_count, 1);
    assert_eq!(drafts.items[0].article.title, "Work in Progress");

    let err = service.my_articles(author, Some("bogus"), 1, None).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn reacted_articles_lists_only_reacted_ones() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "alice");
    let reader = seed_user(&conn, "bob");

    let (liked, _ignored) = {
        let mut service =
            ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);
        (
            seed_article(&mut service, author, "Bookmarked", "body"),
            seed_article(&mut service, author, "Skipped", "body"),
        )
    };

    SqliteReactionRepository::new(&conn)
        .insert_reaction(Uuid::new_v4(), liked, reader, ReactionKind::Bookmark)
        .unwrap();

    let mut service = ArticleService::new(SqliteArticleRepository::new(&mut conn), NullAssetStore);
    let page = service.reacted_articles(reader, "bookmark", 1, None).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].article.uuid, liked);

    let err = service.reacted_articles(reader, "applause", 1, None).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}
