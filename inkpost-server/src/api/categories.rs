//! Category endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use inkpost_common::db::categories;
use inkpost_common::models::Category;

use crate::api::auth::CurrentUser;
use crate::{policy, ApiError, ApiResult, AppState};

/// GET /api/categories — every category, ordered by name
pub async fn list(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(categories::list_categories(&state.db).await)
}

/// GET /api/categories/:slug
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Json<Option<Category>> {
    Json(categories::get_category_by_slug(&state.db, &slug).await)
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// POST /api/categories — admin only
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    if !policy::can_create_category(Some(&user.0)) {
        return Err(ApiError::Forbidden(
            "only admins can create categories".to_string(),
        ));
    }

    let name_len = payload.name.chars().count();
    if name_len == 0 || name_len > 100 {
        return Err(ApiError::Validation(
            "category name must be 1-100 characters".to_string(),
        ));
    }
    let slug_len = payload.slug.chars().count();
    if slug_len == 0 || slug_len > 100 {
        return Err(ApiError::Validation(
            "category slug must be 1-100 characters".to_string(),
        ));
    }

    let id = categories::create_category(
        &state.db,
        &categories::NewCategory {
            name: payload.name,
            slug: payload.slug,
            description: payload.description,
        },
    )
    .await?;

    Ok(Json(CreatedResponse { id }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route("/api/categories/:slug", get(get_by_slug))
}
