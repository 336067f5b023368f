//! Category table operations
//!
//! Categories are created by admins and immutable afterwards; no update or
//! delete accessor exists at this layer.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::models::Category;
use crate::{Error, Result};

use super::read_or_empty;

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

fn map_category(row: &SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
    })
}

pub async fn list_categories(pool: &SqlitePool) -> Vec<Category> {
    read_or_empty("category listing", try_list(pool).await)
}

async fn try_list(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT * FROM categories ORDER BY name ASC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_category).collect()
}

pub async fn get_category_by_slug(pool: &SqlitePool, slug: &str) -> Option<Category> {
    read_or_empty("category lookup", try_get_by_slug(pool, slug).await)
}

async fn try_get_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT * FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_category).transpose()
}

pub async fn get_category_by_id(pool: &SqlitePool, id: i64) -> Option<Category> {
    read_or_empty("category lookup", try_get_by_id(pool, id).await)
}

async fn try_get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_category).transpose()
}

/// Insert a category, returning the generated id.
/// A duplicate slug surfaces as a validation error.
pub async fn create_category(pool: &SqlitePool, category: &NewCategory) -> Result<i64> {
    let result = sqlx::query("INSERT INTO categories (name, slug, description) VALUES (?, ?, ?)")
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .execute(pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation()) {
                Error::Validation(format!("category slug already in use: {}", category.slug))
            } else {
                Error::Database(e)
            }
        })?;

    Ok(result.last_insert_rowid())
}
