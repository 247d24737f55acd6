//! Domain entities mirrored from persistent storage and their cached projections.

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Product row; also the display projection stored in catalog pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub image_path: String,
    pub price: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub created_at: PrimitiveDateTime,
}

/// A comment joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredComment {
    pub comment: CommentRecord,
    pub user_name: String,
}

/// A purchase joined with the purchased product's display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPurchase {
    pub user_id: i64,
    pub history_id: i64,
    pub product: PurchasedProduct,
}

/// Entry of `product_{id}_comments`.
///
/// Entries rebuilt from storage carry `id`, `user_id` and `created_at`; entries prepended by the
/// comment write path only carry `content` and `user_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedComment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub content: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<PrimitiveDateTime>,
}

impl CachedComment {
    pub fn submitted(content: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: None,
            content: content.into(),
            user_name: user_name.into(),
            created_at: None,
        }
    }
}

impl From<AuthoredComment> for CachedComment {
    fn from(value: AuthoredComment) -> Self {
        Self {
            id: Some(value.comment.id),
            user_id: Some(value.comment.user_id),
            content: value.comment.content,
            user_name: value.user_name,
            created_at: Some(value.comment.created_at),
        }
    }
}

/// Entry of `user_{id}_buy_histories` and row of the live history join.
///
/// `id` is the product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_path: String,
    pub price: i32,
    pub created_at: PrimitiveDateTime,
}
