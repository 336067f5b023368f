//! Entity store tests against an in-memory database
//!
//! Covers upsert-on-login role handling, listing predicates and ordering,
//! the publish-transition timestamp, view recording, like toggling, and
//! comment ownership at the store level.

use inkpost_common::db::{articles, categories, comments, connect_memory, likes};
use inkpost_common::db::{
    articles::{ArticleFilter, ArticlePatch, NewArticle},
    categories::NewCategory,
    users::{self, UserIdentity},
};
use inkpost_common::models::{ArticleStatus, Role, User};
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    connect_memory().await.expect("in-memory database should open")
}

fn identity(open_id: &str, name: &str) -> UserIdentity {
    UserIdentity {
        open_id: open_id.to_string(),
        name: Some(name.to_string()),
        email: None,
        avatar_url: None,
    }
}

async fn seed_user(pool: &SqlitePool, open_id: &str, name: &str) -> User {
    users::upsert_user(pool, &identity(open_id, name), None)
        .await
        .expect("upsert should succeed")
}

async fn seed_category(pool: &SqlitePool, name: &str, slug: &str) -> i64 {
    categories::create_category(
        pool,
        &NewCategory {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
        },
    )
    .await
    .expect("category insert should succeed")
}

fn new_article(title: &str, slug: &str, status: ArticleStatus, category_id: Option<i64>) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        slug: slug.to_string(),
        excerpt: None,
        content: format!("{} body", title),
        cover_image_url: None,
        category_id,
        status,
    }
}

#[tokio::test]
async fn test_upsert_creates_user_with_default_role() {
    let pool = test_pool().await;

    let user = seed_user(&pool, "open-1", "Alice").await;

    assert_eq!(user.role, Role::User);
    assert_eq!(user.name.as_deref(), Some("Alice"));
    assert!(user.last_signed_in.is_some());
}

#[tokio::test]
async fn test_upsert_grants_admin_to_owner_token() {
    let pool = test_pool().await;

    let user = users::upsert_user(&pool, &identity("owner-token", "Root"), Some("owner-token"))
        .await
        .unwrap();
    assert_eq!(user.role, Role::Admin);

    // A later sign-in with the owner policy still in force keeps admin
    let again = users::upsert_user(&pool, &identity("owner-token", "Root"), Some("owner-token"))
        .await
        .unwrap();
    assert_eq!(again.id, user.id);
    assert_eq!(again.role, Role::Admin);
}

#[tokio::test]
async fn test_upsert_keeps_absent_fields() {
    let pool = test_pool().await;

    let first = users::upsert_user(
        &pool,
        &UserIdentity {
            open_id: "open-2".to_string(),
            name: Some("Bob".to_string()),
            email: Some("bob@example.com".to_string()),
            avatar_url: None,
        },
        None,
    )
    .await
    .unwrap();

    // Second sign-in supplies no email; the stored one must survive
    let second = users::upsert_user(
        &pool,
        &UserIdentity {
            open_id: "open-2".to_string(),
            name: Some("Bobby".to_string()),
            email: None,
            avatar_url: None,
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.name.as_deref(), Some("Bobby"));
    assert_eq!(second.email.as_deref(), Some("bob@example.com"));
}

#[tokio::test]
async fn test_profile_patch_updates_only_given_fields() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "open-3", "Carol").await;

    users::update_profile(
        &pool,
        user.id,
        &users::ProfilePatch {
            bio: Some("writes about space".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let reloaded = users::get_user_by_id(&pool, user.id).await.unwrap();
    assert_eq!(reloaded.name.as_deref(), Some("Carol"));
    assert_eq!(reloaded.bio.as_deref(), Some("writes about space"));
}

#[tokio::test]
async fn test_categories_list_sorted_and_slug_unique() {
    let pool = test_pool().await;

    seed_category(&pool, "Technology", "tech").await;
    seed_category(&pool, "Art", "art").await;

    let listed = categories::list_categories(&pool).await;
    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Art", "Technology"]);

    let duplicate = categories::create_category(
        &pool,
        &NewCategory {
            name: "Tech Again".to_string(),
            slug: "tech".to_string(),
            description: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(inkpost_common::Error::Validation(_))));

    assert!(categories::get_category_by_slug(&pool, "art").await.is_some());
    assert!(categories::get_category_by_slug(&pool, "missing").await.is_none());
}

#[tokio::test]
async fn test_published_listing_excludes_drafts() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-4", "Dave").await;

    articles::create_article(
        &pool,
        author.id,
        &new_article("Visible", "visible", ArticleStatus::Published, None),
    )
    .await
    .unwrap();
    articles::create_article(
        &pool,
        author.id,
        &new_article("Hidden", "hidden", ArticleStatus::Draft, None),
    )
    .await
    .unwrap();

    let filter = ArticleFilter {
        category_id: None,
        search: None,
        limit: 20,
        offset: 0,
    };
    let listed = articles::list_published(&pool, &filter).await;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].article.slug, "visible");
    assert_eq!(listed[0].article.status, ArticleStatus::Published);
}

#[tokio::test]
async fn test_published_listing_filters_and_pagination() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-5", "Erin").await;
    let tech = seed_category(&pool, "Tech", "tech").await;
    let art = seed_category(&pool, "Art", "art").await;

    for (title, slug, category) in [
        ("Rust Patterns", "rust-patterns", tech),
        ("Async Servers", "async-servers", tech),
        ("Watercolors", "watercolors", art),
    ] {
        articles::create_article(
            &pool,
            author.id,
            &new_article(title, slug, ArticleStatus::Published, Some(category)),
        )
        .await
        .unwrap();
    }

    let tech_only = articles::list_published(
        &pool,
        &ArticleFilter {
            category_id: Some(tech),
            search: None,
            limit: 20,
            offset: 0,
        },
    )
    .await;
    assert_eq!(tech_only.len(), 2);
    assert!(tech_only.iter().all(|a| a.article.category_id == Some(tech)));

    // Case-insensitive substring over title
    let searched = articles::list_published(
        &pool,
        &ArticleFilter {
            category_id: None,
            search: Some("rust".to_string()),
            limit: 20,
            offset: 0,
        },
    )
    .await;
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].article.slug, "rust-patterns");

    // Newest publication first, paged
    let page_one = articles::list_published(
        &pool,
        &ArticleFilter {
            category_id: None,
            search: None,
            limit: 2,
            offset: 0,
        },
    )
    .await;
    let page_two = articles::list_published(
        &pool,
        &ArticleFilter {
            category_id: None,
            search: None,
            limit: 2,
            offset: 2,
        },
    )
    .await;
    assert_eq!(page_one.len(), 2);
    assert_eq!(page_one[0].article.slug, "watercolors");
    assert_eq!(page_two.len(), 1);
    assert_eq!(page_two[0].article.slug, "rust-patterns");
}

#[tokio::test]
async fn test_search_matches_excerpt() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-6", "Faye").await;

    let mut article = new_article("Plain Title", "plain-title", ArticleStatus::Published, None);
    article.excerpt = Some("An essay on Gardening".to_string());
    articles::create_article(&pool, author.id, &article).await.unwrap();

    let found = articles::list_published(
        &pool,
        &ArticleFilter {
            category_id: None,
            search: Some("gardening".to_string()),
            limit: 20,
            offset: 0,
        },
    )
    .await;
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_get_by_slug_attaches_author_and_category() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-7", "Gail").await;
    let tech = seed_category(&pool, "Tech", "tech").await;

    articles::create_article(
        &pool,
        author.id,
        &new_article("Attached", "attached", ArticleStatus::Published, Some(tech)),
    )
    .await
    .unwrap();
    articles::create_article(
        &pool,
        author.id,
        &new_article("Bare", "bare", ArticleStatus::Published, None),
    )
    .await
    .unwrap();

    let attached = articles::get_article_by_slug(&pool, "attached").await.unwrap();
    assert_eq!(attached.author.as_ref().unwrap().id, author.id);
    assert_eq!(attached.category.as_ref().unwrap().slug, "tech");

    let bare = articles::get_article_by_slug(&pool, "bare").await.unwrap();
    assert!(bare.category.is_none());
    assert!(bare.author.is_some());

    assert!(articles::get_article_by_slug(&pool, "missing").await.is_none());
}

#[tokio::test]
async fn test_publish_transition_sets_timestamp_once() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-8", "Hugh").await;

    let id = articles::create_article(
        &pool,
        author.id,
        &new_article("Draft First", "draft-first", ArticleStatus::Draft, None),
    )
    .await
    .unwrap();

    let created = articles::get_article_by_id(&pool, id).await.unwrap();
    assert!(created.article.published_at.is_none());

    // Title-only update on a draft leaves the timestamp unset
    articles::update_article(
        &pool,
        id,
        &ArticlePatch {
            title: Some("Draft Renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let renamed = articles::get_article_by_id(&pool, id).await.unwrap();
    assert!(renamed.article.published_at.is_none());

    // Publishing stamps the timestamp
    articles::update_article(
        &pool,
        id,
        &ArticlePatch {
            status: Some(ArticleStatus::Published),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let published = articles::get_article_by_id(&pool, id).await.unwrap();
    let first_published_at = published.article.published_at.expect("timestamp set");

    // Idempotent re-publish must not move it
    articles::update_article(
        &pool,
        id,
        &ArticlePatch {
            status: Some(ArticleStatus::Published),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let republished = articles::get_article_by_id(&pool, id).await.unwrap();
    assert_eq!(republished.article.published_at, Some(first_published_at));
}

#[tokio::test]
async fn test_update_missing_article_is_not_found() {
    let pool = test_pool().await;

    let result = articles::update_article(
        &pool,
        999,
        &ArticlePatch {
            title: Some("ghost".to_string()),
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(inkpost_common::Error::NotFound(_))));
}

#[tokio::test]
async fn test_record_view_increments_and_logs_event() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-9", "Iris").await;

    let id = articles::create_article(
        &pool,
        author.id,
        &new_article("Viewed", "viewed", ArticleStatus::Published, None),
    )
    .await
    .unwrap();

    articles::record_view(&pool, id, None).await.unwrap();
    articles::record_view(&pool, id, Some(author.id)).await.unwrap();

    let detail = articles::get_article_by_id(&pool, id).await.unwrap();
    assert_eq!(detail.article.view_count, 2);
    assert_eq!(articles::view_event_count(&pool, id).await, 2);

    let missing = articles::record_view(&pool, 999, None).await;
    assert!(matches!(missing, Err(inkpost_common::Error::NotFound(_))));
}

#[tokio::test]
async fn test_popular_orders_by_view_count() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-10", "Jan").await;

    let quiet = articles::create_article(
        &pool,
        author.id,
        &new_article("Quiet", "quiet", ArticleStatus::Published, None),
    )
    .await
    .unwrap();
    let busy = articles::create_article(
        &pool,
        author.id,
        &new_article("Busy", "busy", ArticleStatus::Published, None),
    )
    .await
    .unwrap();

    for _ in 0..3 {
        articles::record_view(&pool, busy, None).await.unwrap();
    }
    articles::record_view(&pool, quiet, None).await.unwrap();

    let popular = articles::list_popular(&pool, 10).await;
    assert_eq!(popular[0].article.id, busy);
    let counts: Vec<i64> = popular.iter().map(|a| a.article.view_count).collect();
    let mut sorted = counts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(counts, sorted);

    let limited = articles::list_popular(&pool, 1).await;
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_related_shares_category_and_excludes_self() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-11", "Kim").await;
    let tech = seed_category(&pool, "Tech", "tech").await;

    let source = articles::create_article(
        &pool,
        author.id,
        &new_article("Source", "source", ArticleStatus::Published, Some(tech)),
    )
    .await
    .unwrap();
    articles::create_article(
        &pool,
        author.id,
        &new_article("Sibling", "sibling", ArticleStatus::Published, Some(tech)),
    )
    .await
    .unwrap();
    articles::create_article(
        &pool,
        author.id,
        &new_article("Sibling Draft", "sibling-draft", ArticleStatus::Draft, Some(tech)),
    )
    .await
    .unwrap();
    let uncategorized = articles::create_article(
        &pool,
        author.id,
        &new_article("Loner", "loner", ArticleStatus::Published, None),
    )
    .await
    .unwrap();

    let related = articles::list_related(&pool, source, 5).await;
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].article.slug, "sibling");

    assert!(articles::list_related(&pool, uncategorized, 5).await.is_empty());
}

#[tokio::test]
async fn test_author_listing_orders_and_filters_drafts() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-12", "Lee").await;

    articles::create_article(
        &pool,
        author.id,
        &new_article("Older", "older", ArticleStatus::Published, None),
    )
    .await
    .unwrap();
    articles::create_article(
        &pool,
        author.id,
        &new_article("Newer Draft", "newer-draft", ArticleStatus::Draft, None),
    )
    .await
    .unwrap();

    let with_drafts = articles::list_by_author(&pool, author.id, true).await;
    assert_eq!(with_drafts.len(), 2);
    assert_eq!(with_drafts[0].article.slug, "newer-draft");

    let published_only = articles::list_by_author(&pool, author.id, false).await;
    assert_eq!(published_only.len(), 1);
    assert_eq!(published_only[0].article.slug, "older");
}

#[tokio::test]
async fn test_like_toggle_round_trip() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-13", "Max").await;
    let reader = seed_user(&pool, "open-14", "Nia").await;

    let id = articles::create_article(
        &pool,
        author.id,
        &new_article("Likable", "likable", ArticleStatus::Published, None),
    )
    .await
    .unwrap();

    assert!(likes::toggle_like(&pool, id, reader.id).await.unwrap());
    assert_eq!(likes::like_count(&pool, id).await, 1);
    assert_eq!(likes::liked_article_ids(&pool, reader.id).await, vec![id]);

    assert!(!likes::toggle_like(&pool, id, reader.id).await.unwrap());
    assert_eq!(likes::like_count(&pool, id).await, 0);
    assert!(likes::liked_article_ids(&pool, reader.id).await.is_empty());
}

#[tokio::test]
async fn test_comments_list_newest_first_with_author() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-15", "Oli").await;

    let id = articles::create_article(
        &pool,
        author.id,
        &new_article("Discussed", "discussed", ArticleStatus::Published, None),
    )
    .await
    .unwrap();

    comments::create_comment(&pool, id, author.id, "first!").await.unwrap();
    comments::create_comment(&pool, id, author.id, "second thoughts").await.unwrap();

    let listed = comments::list_for_article(&pool, id).await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].comment.content, "second thoughts");
    assert_eq!(listed[0].author.as_ref().unwrap().id, author.id);
}

#[tokio::test]
async fn test_comment_delete_requires_matching_author() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-16", "Pat").await;
    let other = seed_user(&pool, "open-17", "Quin").await;

    let id = articles::create_article(
        &pool,
        author.id,
        &new_article("Guarded", "guarded", ArticleStatus::Published, None),
    )
    .await
    .unwrap();
    let comment_id = comments::create_comment(&pool, id, author.id, "mine").await.unwrap();

    // A delete conditioned on the wrong author touches nothing
    comments::delete_comment(&pool, comment_id, other.id).await.unwrap();
    assert!(comments::get_comment(&pool, comment_id).await.is_some());

    comments::delete_comment(&pool, comment_id, author.id).await.unwrap();
    assert!(comments::get_comment(&pool, comment_id).await.is_none());
}

#[tokio::test]
async fn test_article_delete_cascades_comments_and_likes() {
    let pool = test_pool().await;
    let author = seed_user(&pool, "open-18", "Rae").await;

    let id = articles::create_article(
        &pool,
        author.id,
        &new_article("Doomed", "doomed", ArticleStatus::Published, None),
    )
    .await
    .unwrap();
    let comment_id = comments::create_comment(&pool, id, author.id, "gone soon").await.unwrap();
    likes::toggle_like(&pool, id, author.id).await.unwrap();

    articles::delete_article(&pool, id).await.unwrap();

    assert!(articles::get_article_by_id(&pool, id).await.is_none());
    assert!(comments::get_comment(&pool, comment_id).await.is_none());
    assert_eq!(likes::like_count(&pool, id).await, 0);
}
