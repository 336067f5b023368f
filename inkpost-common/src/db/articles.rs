//! Article table operations
//!
//! Every read that touches an article also attaches its author and category
//! as nested optional records via LEFT JOIN. Listing predicates are appended
//! one AND-condition at a time through `QueryBuilder`.
//!
//! The read-then-write sequences (publish transition, view recording) each
//! run inside a single transaction.

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;

use crate::models::{Article, ArticleDetail, ArticleStatus, Category, Role, UserProfile};
use crate::{Error, Result};

use super::read_or_empty;

/// Shared SELECT head: article columns plus aliased author/category columns
const ARTICLE_SELECT: &str = "\
    SELECT a.id, a.title, a.slug, a.excerpt, a.content, a.cover_image_url, \
           a.author_id, a.category_id, a.status, a.view_count, a.published_at, \
           a.created_at, a.updated_at, \
           u.id AS author_uid, u.name AS author_name, u.bio AS author_bio, \
           u.avatar_url AS author_avatar_url, u.role AS author_role, \
           c.id AS category_cid, c.name AS category_name, c.slug AS category_slug, \
           c.description AS category_description \
    FROM articles a \
    LEFT JOIN users u ON u.id = a.author_id \
    LEFT JOIN categories c ON c.id = a.category_id";

/// Fields for article creation; the author comes from the acting user
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub category_id: Option<i64>,
    pub status: ArticleStatus,
}

/// Partial article update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ArticleStatus>,
}

/// Predicates and paging for the public listing
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

fn map_article(row: &SqliteRow) -> Result<ArticleDetail> {
    let status: String = row.try_get("status")?;
    let article = Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        excerpt: row.try_get("excerpt")?,
        content: row.try_get("content")?,
        cover_image_url: row.try_get("cover_image_url")?,
        author_id: row.try_get("author_id")?,
        category_id: row.try_get("category_id")?,
        status: ArticleStatus::from_str(&status)?,
        view_count: row.try_get("view_count")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    let author = match row.try_get::<Option<i64>, _>("author_uid")? {
        Some(id) => {
            let role: String = row.try_get("author_role")?;
            Some(UserProfile {
                id,
                name: row.try_get("author_name")?,
                bio: row.try_get("author_bio")?,
                avatar_url: row.try_get("author_avatar_url")?,
                role: Role::from_str(&role)?,
            })
        }
        None => None,
    };

    let category = match row.try_get::<Option<i64>, _>("category_cid")? {
        Some(id) => Some(Category {
            id,
            name: row.try_get("category_name")?,
            slug: row.try_get("category_slug")?,
            description: row.try_get("category_description")?,
        }),
        None => None,
    };

    Ok(ArticleDetail {
        article,
        author,
        category,
    })
}

/// Insert an article, returning the generated id.
///
/// An article created directly in the published state gets its publication
/// timestamp at creation. A duplicate slug surfaces as a validation error.
pub async fn create_article(pool: &SqlitePool, author_id: i64, article: &NewArticle) -> Result<i64> {
    let now = Utc::now();
    let published_at = match article.status {
        ArticleStatus::Published => Some(now),
        ArticleStatus::Draft => None,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, slug, excerpt, content, cover_image_url,
                              author_id, category_id, status, published_at,
                              created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.title)
    .bind(&article.slug)
    .bind(&article.excerpt)
    .bind(&article.content)
    .bind(&article.cover_image_url)
    .bind(author_id)
    .bind(article.category_id)
    .bind(article.status.as_str())
    .bind(published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation()) {
            Error::Validation(format!("article slug already in use: {}", article.slug))
        } else {
            Error::Database(e)
        }
    })?;

    Ok(result.last_insert_rowid())
}

pub async fn get_article_by_id(pool: &SqlitePool, id: i64) -> Option<ArticleDetail> {
    read_or_empty("article lookup", try_get_by_id(pool, id).await)
}

async fn try_get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ArticleDetail>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ARTICLE_SELECT);
    builder.push(" WHERE a.id = ").push_bind(id);

    let row = builder.build().fetch_optional(pool).await?;
    row.as_ref().map(map_article).transpose()
}

pub async fn get_article_by_slug(pool: &SqlitePool, slug: &str) -> Option<ArticleDetail> {
    read_or_empty("article lookup", try_get_by_slug(pool, slug).await)
}

async fn try_get_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<ArticleDetail>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ARTICLE_SELECT);
    builder.push(" WHERE a.slug = ").push_bind(slug.to_string());

    let row = builder.build().fetch_optional(pool).await?;
    row.as_ref().map(map_article).transpose()
}

/// Published articles, newest publication first, optionally filtered by
/// category and by case-insensitive substring over title OR excerpt.
pub async fn list_published(pool: &SqlitePool, filter: &ArticleFilter) -> Vec<ArticleDetail> {
    read_or_empty("article listing", try_list_published(pool, filter).await)
}

async fn try_list_published(pool: &SqlitePool, filter: &ArticleFilter) -> Result<Vec<ArticleDetail>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ARTICLE_SELECT);
    builder.push(" WHERE a.status = 'published'");

    if let Some(category_id) = filter.category_id {
        builder.push(" AND a.category_id = ").push_bind(category_id);
    }

    if let Some(search) = &filter.search {
        // SQLite LIKE is case-insensitive for ASCII
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (a.title LIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.excerpt LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    builder
        .push(" ORDER BY a.published_at DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    let rows = builder.build().fetch_all(pool).await?;
    rows.iter().map(map_article).collect()
}

/// Articles by one author, newest creation first; drafts only when asked for
pub async fn list_by_author(
    pool: &SqlitePool,
    author_id: i64,
    include_drafts: bool,
) -> Vec<ArticleDetail> {
    read_or_empty(
        "article listing",
        try_list_by_author(pool, author_id, include_drafts).await,
    )
}

async fn try_list_by_author(
    pool: &SqlitePool,
    author_id: i64,
    include_drafts: bool,
) -> Result<Vec<ArticleDetail>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ARTICLE_SELECT);
    builder.push(" WHERE a.author_id = ").push_bind(author_id);

    if !include_drafts {
        builder.push(" AND a.status = 'published'");
    }

    builder.push(" ORDER BY a.created_at DESC");

    let rows = builder.build().fetch_all(pool).await?;
    rows.iter().map(map_article).collect()
}

/// Published articles by descending view count
pub async fn list_popular(pool: &SqlitePool, limit: i64) -> Vec<ArticleDetail> {
    read_or_empty("article listing", try_list_popular(pool, limit).await)
}

async fn try_list_popular(pool: &SqlitePool, limit: i64) -> Result<Vec<ArticleDetail>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ARTICLE_SELECT);
    builder
        .push(" WHERE a.status = 'published' ORDER BY a.view_count DESC LIMIT ")
        .push_bind(limit);

    let rows = builder.build().fetch_all(pool).await?;
    rows.iter().map(map_article).collect()
}

/// Published articles sharing the source article's category, excluding the
/// source itself. Empty when the source has no category.
pub async fn list_related(pool: &SqlitePool, article_id: i64, limit: i64) -> Vec<ArticleDetail> {
    read_or_empty("article listing", try_list_related(pool, article_id, limit).await)
}

async fn try_list_related(
    pool: &SqlitePool,
    article_id: i64,
    limit: i64,
) -> Result<Vec<ArticleDetail>> {
    let category_id: Option<Option<i64>> =
        sqlx::query_scalar("SELECT category_id FROM articles WHERE id = ?")
            .bind(article_id)
            .fetch_optional(pool)
            .await?;

    let Some(Some(category_id)) = category_id else {
        return Ok(Vec::new());
    };

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ARTICLE_SELECT);
    builder
        .push(" WHERE a.category_id = ")
        .push_bind(category_id)
        .push(" AND a.id != ")
        .push_bind(article_id)
        .push(" AND a.status = 'published' ORDER BY a.published_at DESC LIMIT ")
        .push_bind(limit);

    let rows = builder.build().fetch_all(pool).await?;
    rows.iter().map(map_article).collect()
}

/// Apply a partial update.
///
/// The stored status is re-read inside the same transaction that applies the
/// patch: `published_at` is stamped only on an actual draft-to-published
/// transition, so re-publishing never resets it.
pub async fn update_article(pool: &SqlitePool, id: i64, patch: &ArticlePatch) -> Result<()> {
    let mut tx = pool.begin().await?;

    let current: Option<String> = sqlx::query_scalar("SELECT status FROM articles WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(current) = current else {
        return Err(Error::NotFound(format!("article {}", id)));
    };
    let current = ArticleStatus::from_str(&current)?;

    let now = Utc::now();
    let publishes =
        patch.status == Some(ArticleStatus::Published) && current == ArticleStatus::Draft;

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE articles SET updated_at = ");
    builder.push_bind(now);

    if let Some(title) = &patch.title {
        builder.push(", title = ").push_bind(title);
    }
    if let Some(slug) = &patch.slug {
        builder.push(", slug = ").push_bind(slug);
    }
    if let Some(excerpt) = &patch.excerpt {
        builder.push(", excerpt = ").push_bind(excerpt);
    }
    if let Some(content) = &patch.content {
        builder.push(", content = ").push_bind(content);
    }
    if let Some(cover_image_url) = &patch.cover_image_url {
        builder.push(", cover_image_url = ").push_bind(cover_image_url);
    }
    if let Some(category_id) = patch.category_id {
        builder.push(", category_id = ").push_bind(category_id);
    }
    if let Some(status) = patch.status {
        builder.push(", status = ").push_bind(status.as_str());
    }
    if publishes {
        builder.push(", published_at = ").push_bind(now);
    }

    builder.push(" WHERE id = ").push_bind(id);

    builder.build().execute(&mut *tx).await.map_err(|e| {
        if e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation()) {
            Error::Validation("article slug already in use".to_string())
        } else {
            Error::Database(e)
        }
    })?;

    tx.commit().await?;
    Ok(())
}

/// Hard-delete an article; comments, views, and likes cascade
pub async fn delete_article(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Record one view: bump the stored counter atomically and append the view
/// event, both in one transaction.
///
/// The increment is `view_count = view_count + 1` at the store, never an
/// application-level read-modify-write, so concurrent readers cannot lose
/// updates.
pub async fn record_view(pool: &SqlitePool, article_id: i64, viewer_id: Option<i64>) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = ?")
        .bind(article_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("article {}", article_id)));
    }

    sqlx::query("INSERT INTO article_views (article_id, user_id, viewed_at) VALUES (?, ?, ?)")
        .bind(article_id)
        .bind(viewer_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Number of view events recorded for an article (analytics feed)
pub async fn view_event_count(pool: &SqlitePool, article_id: i64) -> i64 {
    read_or_empty("view count", try_view_event_count(pool, article_id).await)
}

async fn try_view_event_count(pool: &SqlitePool, article_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM article_views WHERE article_id = ?")
        .bind(article_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
