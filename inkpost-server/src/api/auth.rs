//! Actor identification and session endpoints
//!
//! Every request passes through the `identify` middleware, which resolves a
//! bearer token (or `session` cookie) to a user and stashes it as a request
//! extension. Handlers pick the actor up through the [`CurrentUser`] /
//! [`MaybeUser`] extractors; protected handlers fail Unauthorized when no
//! actor is present.
//!
//! Login accepts the identity assertion relayed by the platform's identity
//! gateway; inkpost itself performs no credential verification.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use inkpost_common::db::{sessions, users};
use inkpost_common::models::User;

use crate::{ApiError, ApiResult, AppState};

/// The authenticated actor for this request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The actor when present; `None` on anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts.extensions.get::<CurrentUser>().map(|u| u.0.clone()),
        ))
    }
}

/// Pull the session token out of `Authorization: Bearer` or the `session`
/// cookie
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "session").then(|| value.to_string())
    })
}

/// Middleware: resolve the session token to a user and attach it to the
/// request. Anonymous requests pass through untouched.
pub async fn identify(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = session_token(request.headers()) {
        if let Some(user) = sessions::session_user(&state.db, &token).await {
            request.extensions_mut().insert(CurrentUser(user));
        }
    }

    next.run(request).await
}

/// Identity assertion from the gateway
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/login
///
/// Upserts the user record for the asserted identity (the configured owner
/// token is granted the admin role), creates a session, and returns the
/// bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if payload.open_id.trim().is_empty() {
        return Err(ApiError::Validation("open_id is required".to_string()));
    }

    let identity = users::UserIdentity {
        open_id: payload.open_id,
        name: payload.name,
        email: payload.email,
        avatar_url: payload.avatar_url,
    };

    let user = users::upsert_user(
        &state.db,
        &identity,
        state.config.owner_open_id.as_deref(),
    )
    .await?;

    let token = sessions::create_session(&state.db, user.id).await?;

    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/auth/me — the current actor, or null
pub async fn me(MaybeUser(user): MaybeUser) -> Json<Option<User>> {
    Json(user)
}

/// POST /api/auth/logout — drop the session behind the presented token
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    if let Some(token) = session_token(&headers) {
        sessions::delete_session(&state.db, &token).await?;
    }

    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
}
