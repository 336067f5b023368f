//! Authorization policy
//!
//! Pure decision functions over the acting user and the target entity.
//! No side effects; callers turn a `false` into a Forbidden response.

use inkpost_common::models::{Article, ArticleStatus, Comment, Role, User};

/// Only admins create categories
pub fn can_create_category(actor: Option<&User>) -> bool {
    matches!(actor, Some(user) if user.role == Role::Admin)
}

/// The author or an admin may edit or delete an article
pub fn can_mutate_article(actor: Option<&User>, article: &Article) -> bool {
    match actor {
        Some(user) => user.id == article.author_id || user.role == Role::Admin,
        None => false,
    }
}

/// Only the comment's own author may delete it. Admins get no override here,
/// unlike article mutation.
pub fn can_delete_comment(actor: Option<&User>, comment: &Comment) -> bool {
    matches!(actor, Some(user) if user.id == comment.author_id)
}

/// Published articles are visible to everyone; drafts only to their author
/// or an admin
pub fn can_view_draft(actor: Option<&User>, article: &Article) -> bool {
    if article.status == ArticleStatus::Published {
        return true;
    }
    match actor {
        Some(user) => user.id == article.author_id || user.role == Role::Admin,
        None => false,
    }
}
