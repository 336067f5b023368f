//! Like endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use inkpost_common::db::{articles, likes};

use crate::api::auth::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub liked: bool,
}

/// POST /api/articles/:id/like — flip membership, return the new state
pub async fn toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(article_id): Path<i64>,
) -> ApiResult<Json<ToggleResponse>> {
    if articles::get_article_by_id(&state.db, article_id).await.is_none() {
        return Err(ApiError::NotFound(format!("article {}", article_id)));
    }

    let liked = likes::toggle_like(&state.db, article_id, user.0.id).await?;
    Ok(Json(ToggleResponse { liked }))
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// GET /api/articles/:id/likes
pub async fn count(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> Json<CountResponse> {
    Json(CountResponse {
        count: likes::like_count(&state.db, article_id).await,
    })
}

/// GET /api/likes/mine — ids of the articles the actor has liked
pub async fn mine(State(state): State<AppState>, user: CurrentUser) -> Json<Vec<i64>> {
    Json(likes::liked_article_ids(&state.db, user.0.id).await)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles/:id/like", post(toggle))
        .route("/api/articles/:id/likes", get(count))
        .route("/api/likes/mine", get(mine))
}
