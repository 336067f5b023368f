//! Like table operations
//!
//! A like is a pure join row on (user, article); row existence means
//! "liked". The toggle runs its existence check and the matching delete or
//! insert inside one transaction.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::Result;

use super::read_or_empty;

/// Flip the like membership for (user, article), returning the new state
pub async fn toggle_like(pool: &SqlitePool, article_id: i64, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let existing: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE article_id = ? AND user_id = ?)",
    )
    .bind(article_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let liked = if existing {
        sqlx::query("DELETE FROM likes WHERE article_id = ? AND user_id = ?")
            .bind(article_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        false
    } else {
        sqlx::query("INSERT INTO likes (user_id, article_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(article_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        true
    };

    tx.commit().await?;
    Ok(liked)
}

/// Total likes for an article
pub async fn like_count(pool: &SqlitePool, article_id: i64) -> i64 {
    read_or_empty("like count", try_like_count(pool, article_id).await)
}

async fn try_like_count(pool: &SqlitePool, article_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE article_id = ?")
        .bind(article_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Ids of the articles a user has liked
pub async fn liked_article_ids(pool: &SqlitePool, user_id: i64) -> Vec<i64> {
    read_or_empty("liked-article listing", try_liked_article_ids(pool, user_id).await)
}

async fn try_liked_article_ids(pool: &SqlitePool, user_id: i64) -> Result<Vec<i64>> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT article_id FROM likes WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(ids)
}
