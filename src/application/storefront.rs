//! Read path: every page is assembled from cache lookups, except the purchase history which
//! joins live against the backing store.

use std::sync::Arc;

use tracing::instrument;

use crate::{
    application::{error::AppError, repos::HistoriesRepo},
    cache::{CacheClient, CacheKey},
    domain::{
        entities::{CachedComment, ProductRecord, UserRecord},
        error::DomainError,
    },
    presentation::views::{
        CatalogProductView, CatalogView, ProductDetailView, UserPageView, UserView,
    },
};

/// Comments shown under each product on a catalog page.
pub const COMMENT_PREVIEW_LEN: usize = 5;

#[derive(Clone)]
pub struct StorefrontService {
    cache: CacheClient,
    histories: Arc<dyn HistoriesRepo>,
}

impl StorefrontService {
    pub fn new(cache: CacheClient, histories: Arc<dyn HistoriesRepo>) -> Self {
        Self { cache, histories }
    }

    /// Catalog page `page`; a page that was never populated renders empty.
    #[instrument(skip(self, viewer))]
    pub async fn catalog_page(
        &self,
        page: u32,
        viewer: Option<&UserRecord>,
    ) -> Result<CatalogView, AppError> {
        let products: Vec<ProductRecord> = self
            .cache
            .get_or_default(&CacheKey::CatalogPage(page))
            .await?;

        let mut entries = Vec::with_capacity(products.len());
        for product in products {
            let mut comments: Vec<CachedComment> = self
                .cache
                .get_or_default(&CacheKey::ProductComments(product.id))
                .await?;
            let comments_count = comments.len();
            comments.truncate(COMMENT_PREVIEW_LEN);
            entries.push(CatalogProductView {
                product,
                comments_count,
                comments,
            });
        }

        Ok(CatalogView {
            page,
            viewer: viewer.map(UserView::from),
            products: entries,
        })
    }

    #[instrument(skip(self, viewer))]
    pub async fn product_detail(
        &self,
        product_id: i64,
        viewer: Option<&UserRecord>,
    ) -> Result<ProductDetailView, AppError> {
        let product: ProductRecord = self
            .cache
            .get(&CacheKey::Product(product_id))
            .await?
            .ok_or_else(|| DomainError::not_found("product"))?;
        let comments: Vec<CachedComment> = self
            .cache
            .get_or_default(&CacheKey::ProductComments(product_id))
            .await?;

        let already_bought = match viewer {
            Some(user) => self.histories.has_purchased(product_id, user.id).await?,
            None => false,
        };

        Ok(ProductDetailView {
            viewer: viewer.map(UserView::from),
            product,
            comments,
            already_bought,
        })
    }

    /// Purchase history of `user_id`, read live so new purchases show immediately.
    #[instrument(skip(self, viewer))]
    pub async fn user_page(
        &self,
        user_id: i64,
        viewer: Option<&UserRecord>,
    ) -> Result<UserPageView, AppError> {
        let user: UserRecord = self
            .cache
            .get(&CacheKey::User(user_id))
            .await?
            .ok_or_else(|| DomainError::not_found("user"))?;
        let products = self.histories.list_purchases_for_user(user_id).await?;
        let total_pay = products.iter().map(|product| i64::from(product.price)).sum();

        Ok(UserPageView {
            viewer: viewer.map(UserView::from),
            user: UserView::from(&user),
            products,
            total_pay,
        })
    }
}
