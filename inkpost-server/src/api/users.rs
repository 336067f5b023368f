//! User profile endpoints

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use inkpost_common::db::users;
use inkpost_common::models::UserProfile;

use crate::api::auth::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/users/:id — public profile subset, or null
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Option<UserProfile>> {
    let user = users::get_user_by_id(&state.db, id).await;
    Json(user.as_ref().map(UserProfile::from))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// PATCH /api/users/me — update the actor's own profile
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Value>> {
    if let Some(name) = &payload.name {
        let len = name.chars().count();
        if len == 0 || len > 255 {
            return Err(ApiError::Validation("name must be 1-255 characters".to_string()));
        }
    }
    if let Some(bio) = &payload.bio {
        if bio.chars().count() > 1000 {
            return Err(ApiError::Validation("bio must be at most 1000 characters".to_string()));
        }
    }

    let patch = users::ProfilePatch {
        name: payload.name,
        bio: payload.bio,
        avatar_url: payload.avatar_url,
    };
    if patch.is_empty() {
        return Err(ApiError::Validation("no profile fields to update".to_string()));
    }

    users::update_profile(&state.db, user.0.id, &patch).await?;
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/me", patch(update_me))
        .route("/api/users/:id", get(get_by_id))
}
