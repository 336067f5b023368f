//! Domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(Error::Internal(format!("unknown role: {}", other))),
        }
    }
}

/// Article lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "draft" => Ok(ArticleStatus::Draft),
            "published" => Ok(ArticleStatus::Published),
            other => Err(Error::Internal(format!("unknown article status: {}", other))),
        }
    }
}

/// Full user record. Returned only to the user themselves; other callers see
/// the [`UserProfile`] subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: Option<DateTime<Utc>>,
}

/// Public-facing subset of a user record, attached to articles and comments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub status: ArticleStatus,
    pub view_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article with its related author and category attached.
///
/// The attachments are optional: an uncategorized article carries no
/// category, and a missing author row (never deleted in practice, but the
/// join is LEFT) yields no author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub author: Option<UserProfile>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment with its author attached (nullable if the author row is missing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDetail {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::Admin.as_str(), "admin");
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(ArticleStatus::from_str("draft").unwrap(), ArticleStatus::Draft);
        assert_eq!(ArticleStatus::from_str("published").unwrap(), ArticleStatus::Published);
        assert!(ArticleStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_article_detail_serializes_flat() {
        let article = Article {
            id: 1,
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            excerpt: None,
            content: "Body".to_string(),
            cover_image_url: None,
            author_id: 7,
            category_id: None,
            status: ArticleStatus::Published,
            view_count: 0,
            published_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let detail = ArticleDetail {
            article,
            author: None,
            category: None,
        };

        let value = serde_json::to_value(&detail).unwrap();
        // Article fields sit at the top level next to the attachments
        assert_eq!(value["title"], "Hello");
        assert_eq!(value["status"], "published");
        assert!(value["author"].is_null());
    }
}
