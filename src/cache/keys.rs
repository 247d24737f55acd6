//! Cache key definitions.
//!
//! Every cached view lives under one string key; `CacheKey` is the typed form.

use std::fmt;

/// Identifies a cached view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `top_products_page_{n}`: one catalog page of product display fields.
    CatalogPage(u32),
    /// `product_{id}_comments`: comments of a product, newest first.
    ProductComments(i64),
    /// `user_{id}`: user snapshot.
    User(i64),
    /// `product_{id}`: product snapshot.
    Product(i64),
    /// `user_{id}_buy_histories`: purchases of a user, newest first.
    UserBuyHistories(i64),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::CatalogPage(page) => write!(f, "top_products_page_{page}"),
            CacheKey::ProductComments(id) => write!(f, "product_{id}_comments"),
            CacheKey::User(id) => write!(f, "user_{id}"),
            CacheKey::Product(id) => write!(f, "product_{id}"),
            CacheKey::UserBuyHistories(id) => write!(f, "user_{id}_buy_histories"),
        }
    }
}
