//! User table operations
//!
//! Users are created and refreshed by upsert-on-login keyed by the external
//! identity token (`open_id`); they are never hard-deleted.

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;

use crate::models::{Role, User};
use crate::{Error, Result};

use super::read_or_empty;

/// Identity assertion relayed by the platform's identity gateway at login
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Partial profile update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }
}

pub(crate) fn map_user(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        open_id: row.try_get("open_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        bio: row.try_get("bio")?,
        avatar_url: row.try_get("avatar_url")?,
        role: Role::from_str(&role)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_signed_in: row.try_get("last_signed_in")?,
    })
}

/// Insert or refresh a user record keyed by `open_id`.
///
/// Identity fields update only when the gateway supplied them; absent fields
/// keep their stored values. `last_signed_in` is stamped on every call.
///
/// The owner token is an explicit policy input: when `owner_open_id` matches
/// the identity, the role is forced to admin on both insert and update.
/// Otherwise an insert defaults to the user role and an update keeps the
/// stored role.
pub async fn upsert_user(
    pool: &SqlitePool,
    identity: &UserIdentity,
    owner_open_id: Option<&str>,
) -> Result<User> {
    if identity.open_id.trim().is_empty() {
        return Err(Error::Validation("open_id is required".to_string()));
    }

    let is_owner = owner_open_id == Some(identity.open_id.as_str());
    let insert_role = if is_owner { Role::Admin } else { Role::User };
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (open_id, name, email, avatar_url, role, created_at, updated_at, last_signed_in)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(open_id) DO UPDATE SET
            name = COALESCE(excluded.name, users.name),
            email = COALESCE(excluded.email, users.email),
            avatar_url = COALESCE(excluded.avatar_url, users.avatar_url),
            role = CASE WHEN ? THEN 'admin' ELSE users.role END,
            updated_at = excluded.updated_at,
            last_signed_in = excluded.last_signed_in
        "#,
    )
    .bind(&identity.open_id)
    .bind(&identity.name)
    .bind(&identity.email)
    .bind(&identity.avatar_url)
    .bind(insert_role.as_str())
    .bind(now)
    .bind(now)
    .bind(now)
    .bind(is_owner)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM users WHERE open_id = ?")
        .bind(&identity.open_id)
        .fetch_one(pool)
        .await?;

    map_user(&row)
}

pub async fn get_user_by_open_id(pool: &SqlitePool, open_id: &str) -> Option<User> {
    read_or_empty("user lookup", try_get_by_open_id(pool, open_id).await)
}

async fn try_get_by_open_id(pool: &SqlitePool, open_id: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE open_id = ?")
        .bind(open_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_user).transpose()
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Option<User> {
    read_or_empty("user lookup", try_get_by_id(pool, id).await)
}

async fn try_get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Apply a partial profile update. Callers reject empty patches up front.
pub async fn update_profile(pool: &SqlitePool, user_id: i64, patch: &ProfilePatch) -> Result<()> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET updated_at = ");
    builder.push_bind(Utc::now());

    if let Some(name) = &patch.name {
        builder.push(", name = ").push_bind(name);
    }
    if let Some(bio) = &patch.bio {
        builder.push(", bio = ").push_bind(bio);
    }
    if let Some(avatar_url) = &patch.avatar_url {
        builder.push(", avatar_url = ").push_bind(avatar_url);
    }

    builder.push(" WHERE id = ").push_bind(user_id);
    builder.build().execute(pool).await?;

    Ok(())
}
