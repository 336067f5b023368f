//! Comment endpoints

use axum::{
    extract::{Path, State},
    routing::{delete as delete_route, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use inkpost_common::db::{articles, comments};
use inkpost_common::models::CommentDetail;

use crate::api::auth::CurrentUser;
use crate::{policy, ApiError, ApiResult, AppState};

const MAX_COMMENT_CHARS: usize = 5000;

/// GET /api/articles/:id/comments — newest first, authors attached
pub async fn list(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> Json<Vec<CommentDetail>> {
    Json(comments::list_for_article(&state.db, article_id).await)
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// POST /api/articles/:id/comments
///
/// Content is trimmed and must be 1-5000 characters; validation runs before
/// any store access.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(article_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let content = payload.content.trim();
    let len = content.chars().count();
    if len == 0 || len > MAX_COMMENT_CHARS {
        return Err(ApiError::Validation(format!(
            "comment content must be 1-{} characters",
            MAX_COMMENT_CHARS
        )));
    }

    if articles::get_article_by_id(&state.db, article_id).await.is_none() {
        return Err(ApiError::NotFound(format!("article {}", article_id)));
    }

    let id = comments::create_comment(&state.db, article_id, user.0.id, content).await?;
    Ok(Json(CreatedResponse { id }))
}

/// DELETE /api/comments/:id
///
/// Only the comment's own author may delete it; a mismatch reports Forbidden
/// instead of silently deleting nothing. Admins get no override here.
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let Some(comment) = comments::get_comment(&state.db, id).await else {
        return Err(ApiError::NotFound(format!("comment {}", id)));
    };

    if !policy::can_delete_comment(Some(&user.0), &comment) {
        return Err(ApiError::Forbidden(
            "you can only delete your own comments".to_string(),
        ));
    }

    comments::delete_comment(&state.db, id, user.0.id).await?;
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles/:id/comments", get(list).post(create))
        .route("/api/comments/:id", delete_route(delete))
}
