//! JSON view documents returned by the storefront pages.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{CachedComment, ProductRecord, PurchasedProduct, UserRecord};

pub const LOGIN_PATH: &str = "/login";

/// Body of the login page and of 401/403 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPromptView {
    pub message: String,
    pub login_path: String,
}

impl LoginPromptView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            login_path: LOGIN_PATH.to_string(),
        }
    }
}

/// Public projection of a user; the password never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProductView {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub comments_count: usize,
    /// Newest comments first.
    pub comments: Vec<CachedComment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogView {
    pub page: u32,
    pub viewer: Option<UserView>,
    pub products: Vec<CatalogProductView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetailView {
    pub viewer: Option<UserView>,
    pub product: ProductRecord,
    pub comments: Vec<CachedComment>,
    pub already_bought: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPageView {
    pub viewer: Option<UserView>,
    pub user: UserView,
    pub products: Vec<PurchasedProduct>,
    pub total_pay: i64,
}
