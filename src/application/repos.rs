//! Repository traits describing the backing store adapters.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::domain::catalog::CatalogPage;
use crate::domain::entities::{
    AuthoredComment, ProductRecord, PurchasedProduct, UserPurchase, UserRecord,
};
use crate::domain::reset::{ResetBaseline, ResetSummary};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub product_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct RecordPurchaseParams {
    pub product_id: i64,
    pub user_id: i64,
    pub created_at: PrimitiveDateTime,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, RepoError>;

    /// Products whose ids fall inside the page bounds, highest id first.
    async fn list_catalog_page(&self, page: CatalogPage) -> Result<Vec<ProductRecord>, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Every comment with its author name, ordered by product id ascending then comment id
    /// descending.
    async fn list_authored_comments(&self) -> Result<Vec<AuthoredComment>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait HistoriesRepo: Send + Sync {
    /// Every purchase with its product, ordered by user id ascending then history id descending.
    async fn list_user_purchases(&self) -> Result<Vec<UserPurchase>, RepoError>;

    /// Purchases of one user, newest first.
    async fn list_purchases_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<PurchasedProduct>, RepoError>;

    async fn has_purchased(&self, product_id: i64, user_id: i64) -> Result<bool, RepoError>;

    async fn record_purchase(&self, params: RecordPurchaseParams) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait MaintenanceRepo: Send + Sync {
    /// Delete every row above the baseline ids.
    async fn reset_to_baseline(&self, baseline: ResetBaseline) -> Result<ResetSummary, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}

/// Every repository the services need, as shared trait objects.
#[derive(Clone)]
pub struct RepositorySet {
    pub users: Arc<dyn UsersRepo>,
    pub products: Arc<dyn ProductsRepo>,
    pub comments: Arc<dyn CommentsRepo>,
    pub histories: Arc<dyn HistoriesRepo>,
    pub maintenance: Arc<dyn MaintenanceRepo>,
}

impl RepositorySet {
    /// Use one adapter that implements every repository.
    pub fn from_shared<R>(repo: Arc<R>) -> Self
    where
        R: UsersRepo + ProductsRepo + CommentsRepo + HistoriesRepo + MaintenanceRepo + 'static,
    {
        Self {
            users: repo.clone(),
            products: repo.clone(),
            comments: repo.clone(),
            histories: repo.clone(),
            maintenance: repo,
        }
    }
}
