//! Session persistence
//!
//! A session row maps a bearer token to a user until its expiry. The token is
//! issued at login and deleted at logout; expired rows are simply ignored on
//! lookup.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::User;
use crate::Result;

use super::init::setting_i64;
use super::read_or_empty;
use super::users::map_user;

const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 2_592_000; // 30 days

/// Create a session for the user and return the bearer token.
///
/// The lifetime comes from the `session_timeout_seconds` setting.
pub async fn create_session(pool: &SqlitePool, user_id: i64) -> Result<String> {
    let timeout_secs =
        setting_i64(pool, "session_timeout_seconds", DEFAULT_SESSION_TIMEOUT_SECS).await?;

    let token = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(timeout_secs);

    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve a bearer token to its user, ignoring expired sessions
pub async fn session_user(pool: &SqlitePool, token: &str) -> Option<User> {
    read_or_empty("session lookup", try_session_user(pool, token).await)
}

async fn try_session_user(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT u.*
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_user).transpose()
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}
