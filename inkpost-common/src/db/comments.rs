//! Comment table operations

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::str::FromStr;

use crate::models::{Comment, CommentDetail, Role, UserProfile};
use crate::Result;

use super::read_or_empty;

fn map_comment(row: &SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        article_id: row.try_get("article_id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a comment, returning the generated id
pub async fn create_comment(
    pool: &SqlitePool,
    article_id: i64,
    author_id: i64,
    content: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO comments (article_id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(article_id)
    .bind(author_id)
    .bind(content)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Comments on an article, newest first, each with its author attached
pub async fn list_for_article(pool: &SqlitePool, article_id: i64) -> Vec<CommentDetail> {
    read_or_empty("comment listing", try_list_for_article(pool, article_id).await)
}

async fn try_list_for_article(pool: &SqlitePool, article_id: i64) -> Result<Vec<CommentDetail>> {
    let rows = sqlx::query(
        r#"
        SELECT co.id, co.article_id, co.author_id, co.content, co.created_at,
               u.id AS author_uid, u.name AS author_name, u.bio AS author_bio,
               u.avatar_url AS author_avatar_url, u.role AS author_role
        FROM comments co
        LEFT JOIN users u ON u.id = co.author_id
        WHERE co.article_id = ?
        ORDER BY co.created_at DESC
        "#,
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let comment = map_comment(row)?;
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
            Ok(CommentDetail { comment, author })
        })
        .collect()
}

pub async fn get_comment(pool: &SqlitePool, id: i64) -> Option<Comment> {
    read_or_empty("comment lookup", try_get_comment(pool, id).await)
}

async fn try_get_comment(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_comment).transpose()
}

/// Delete a comment. The row must match both the id and the author; callers
/// resolve existence and ownership beforehand so a mismatch can be reported
/// rather than silently affecting zero rows.
pub async fn delete_comment(pool: &SqlitePool, id: i64, author_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ? AND author_id = ?")
        .bind(id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(())
}
