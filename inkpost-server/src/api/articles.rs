//! Article endpoints
//!
//! Listing endpoints are public and never expose drafts. Mutations require
//! an actor and run the ownership policy before touching the store.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use inkpost_common::db::{articles, categories};
use inkpost_common::models::{ArticleDetail, ArticleStatus};

use crate::api::auth::{CurrentUser, MaybeUser};
use crate::{policy, ApiError, ApiResult, AppState};

const MAX_LIST_LIMIT: i64 = 100;
const DEFAULT_LIST_LIMIT: i64 = 20;
const MAX_POPULAR_LIMIT: i64 = 50;
const DEFAULT_POPULAR_LIMIT: i64 = 10;
const DEFAULT_RELATED_LIMIT: i64 = 5;
const MAX_TITLE_CHARS: usize = 500;
const MAX_SLUG_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Range-check a limit parameter, applying its default
fn resolve_limit(limit: Option<i64>, default: i64, max: i64) -> ApiResult<i64> {
    let limit = limit.unwrap_or(default);
    if limit < 1 || limit > max {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {}",
            max
        )));
    }
    Ok(limit)
}

/// GET /api/articles — published articles, newest publication first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ArticleDetail>>> {
    let limit = resolve_limit(query.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::Validation("offset must be non-negative".to_string()));
    }

    let filter = articles::ArticleFilter {
        category_id: query.category_id,
        search: query.search.filter(|s| !s.is_empty()),
        limit,
        offset,
    };

    Ok(Json(articles::list_published(&state.db, &filter).await))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// GET /api/articles/popular — published articles by view count
pub async fn popular(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<ArticleDetail>>> {
    let limit = resolve_limit(query.limit, DEFAULT_POPULAR_LIMIT, MAX_POPULAR_LIMIT)?;
    Ok(Json(articles::list_popular(&state.db, limit).await))
}

/// GET /api/articles/mine — the actor's own articles, drafts included
pub async fn mine(State(state): State<AppState>, user: CurrentUser) -> Json<Vec<ArticleDetail>> {
    Json(articles::list_by_author(&state.db, user.0.id, true).await)
}

/// GET /api/articles/:id — no side effects, no visibility filtering
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Option<ArticleDetail>> {
    Json(articles::get_article_by_id(&state.db, id).await)
}

/// GET /api/articles/by-slug/:slug
///
/// Fetching a published article counts as a view: the stored counter is
/// bumped and a view event is appended (with the actor's id when present),
/// and the response carries the incremented count. Drafts are served only to
/// actors the draft-visibility policy admits, and never record views.
pub async fn get_by_slug(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleDetail>> {
    let Some(mut detail) = articles::get_article_by_slug(&state.db, &slug).await else {
        return Err(ApiError::NotFound(format!("article {}", slug)));
    };

    if detail.article.status == ArticleStatus::Draft {
        if !policy::can_view_draft(user.as_ref(), &detail.article) {
            return Err(ApiError::Forbidden(
                "draft articles are visible only to their author".to_string(),
            ));
        }
        return Ok(Json(detail));
    }

    articles::record_view(&state.db, detail.article.id, user.map(|u| u.id)).await?;
    detail.article.view_count += 1;

    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<i64>,
}

/// GET /api/articles/:id/related — published articles from the same category
pub async fn related(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RelatedQuery>,
) -> ApiResult<Json<Vec<ArticleDetail>>> {
    let limit = resolve_limit(query.limit, DEFAULT_RELATED_LIMIT, MAX_POPULAR_LIMIT)?;
    Ok(Json(articles::list_related(&state.db, id, limit).await))
}

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

fn validate_title(title: &str) -> ApiResult<()> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_CHARS {
        return Err(ApiError::Validation(format!(
            "title must be 1-{} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> ApiResult<()> {
    let len = slug.chars().count();
    if len == 0 || len > MAX_SLUG_CHARS {
        return Err(ApiError::Validation(format!(
            "slug must be 1-{} characters",
            MAX_SLUG_CHARS
        )));
    }
    Ok(())
}

async fn ensure_category_exists(state: &AppState, category_id: Option<i64>) -> ApiResult<()> {
    if let Some(category_id) = category_id {
        if categories::get_category_by_id(&state.db, category_id).await.is_none() {
            return Err(ApiError::NotFound(format!("category {}", category_id)));
        }
    }
    Ok(())
}

/// POST /api/articles — any authenticated user may write
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateArticleRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    validate_title(&payload.title)?;
    validate_slug(&payload.slug)?;
    if payload.content.is_empty() {
        return Err(ApiError::Validation("content must not be empty".to_string()));
    }
    ensure_category_exists(&state, payload.category_id).await?;

    let article = articles::NewArticle {
        title: payload.title,
        slug: payload.slug,
        excerpt: payload.excerpt,
        content: payload.content,
        cover_image_url: payload.cover_image_url,
        category_id: payload.category_id,
        status: payload.status.unwrap_or(ArticleStatus::Draft),
    };

    let id = articles::create_article(&state.db, user.0.id, &article).await?;
    Ok(Json(CreatedResponse { id }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ArticleStatus>,
}

/// PATCH /api/articles/:id — author or admin
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateArticleRequest>,
) -> ApiResult<Json<Value>> {
    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(slug) = &payload.slug {
        validate_slug(slug)?;
    }
    if let Some(content) = &payload.content {
        if content.is_empty() {
            return Err(ApiError::Validation("content must not be empty".to_string()));
        }
    }

    let Some(existing) = articles::get_article_by_id(&state.db, id).await else {
        return Err(ApiError::NotFound(format!("article {}", id)));
    };
    if !policy::can_mutate_article(Some(&user.0), &existing.article) {
        return Err(ApiError::Forbidden(
            "you can only edit your own articles".to_string(),
        ));
    }
    ensure_category_exists(&state, payload.category_id).await?;

    let patch = articles::ArticlePatch {
        title: payload.title,
        slug: payload.slug,
        excerpt: payload.excerpt,
        content: payload.content,
        cover_image_url: payload.cover_image_url,
        category_id: payload.category_id,
        status: payload.status,
    };

    articles::update_article(&state.db, id, &patch).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/articles/:id — author or admin; hard delete
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let Some(existing) = articles::get_article_by_id(&state.db, id).await else {
        return Err(ApiError::NotFound(format!("article {}", id)));
    };
    if !policy::can_mutate_article(Some(&user.0), &existing.article) {
        return Err(ApiError::Forbidden(
            "you can only delete your own articles".to_string(),
        ));
    }

    articles::delete_article(&state.db, id).await?;
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles", get(list).post(create))
        .route("/api/articles/popular", get(popular))
        .route("/api/articles/mine", get(mine))
        .route("/api/articles/by-slug/:slug", get(get_by_slug))
        .route("/api/articles/:id", get(get_by_id).patch(update).delete(delete))
        .route("/api/articles/:id/related", get(related))
}
