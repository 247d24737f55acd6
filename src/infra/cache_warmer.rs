use std::{collections::BTreeMap, sync::Arc, time::Instant};

use metrics::histogram;
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    application::repos::{
        CommentsRepo, HistoriesRepo, ProductsRepo, RepoError, RepositorySet, UsersRepo,
    },
    cache::{CacheClient, CacheError, CacheKey},
    domain::{
        catalog::catalog_pages,
        entities::{CachedComment, PurchasedProduct},
    },
};

pub const METRIC_CACHE_POPULATE_MS: &str = "storefront_cache_populate_ms";

#[derive(Debug, Error)]
pub enum CacheWarmError {
    #[error("failed to load {step} from the backing store: {source}")]
    Load {
        step: &'static str,
        #[source]
        source: RepoError,
    },
    #[error("failed to write {step} into the cache: {source}")]
    Cache {
        step: &'static str,
        #[source]
        source: CacheError,
    },
}

/// One step of the population job, each guarded by a sentinel key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarmStep {
    CatalogPages,
    ProductComments,
    Users,
    Products,
    UserBuyHistories,
}

impl WarmStep {
    pub const ALL: [WarmStep; 5] = [
        WarmStep::CatalogPages,
        WarmStep::ProductComments,
        WarmStep::Users,
        WarmStep::Products,
        WarmStep::UserBuyHistories,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WarmStep::CatalogPages => "catalog pages",
            WarmStep::ProductComments => "product comments",
            WarmStep::Users => "users",
            WarmStep::Products => "products",
            WarmStep::UserBuyHistories => "user buy histories",
        }
    }

    /// A present guard key means the step already ran.
    pub fn guard(self) -> CacheKey {
        match self {
            WarmStep::CatalogPages => CacheKey::CatalogPage(0),
            WarmStep::ProductComments => CacheKey::ProductComments(1),
            WarmStep::Users => CacheKey::User(1),
            WarmStep::Products => CacheKey::Product(1),
            WarmStep::UserBuyHistories => CacheKey::UserBuyHistories(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Skipped,
    Written(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub steps: Vec<(WarmStep, StepOutcome)>,
}

impl WarmReport {
    pub fn outcome(&self, step: WarmStep) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|(candidate, _)| *candidate == step)
            .map(|(_, outcome)| *outcome)
    }

    pub fn entries_written(&self) -> usize {
        self.steps
            .iter()
            .map(|(_, outcome)| match outcome {
                StepOutcome::Written(count) => *count,
                StepOutcome::Skipped => 0,
            })
            .sum()
    }
}

/// Rebuilds every cached view from the backing store.
pub struct CacheWarmer {
    users: Arc<dyn UsersRepo>,
    products: Arc<dyn ProductsRepo>,
    comments: Arc<dyn CommentsRepo>,
    histories: Arc<dyn HistoriesRepo>,
    cache: CacheClient,
}

impl CacheWarmer {
    pub fn new(repos: &RepositorySet, cache: CacheClient) -> Self {
        Self {
            users: repos.users.clone(),
            products: repos.products.clone(),
            comments: repos.comments.clone(),
            histories: repos.histories.clone(),
            cache,
        }
    }

    /// Run every step whose guard key is absent.
    ///
    /// The first failing step aborts the job; entries written by earlier steps stay in place.
    #[instrument(skip(self))]
    pub async fn populate(&self) -> Result<WarmReport, CacheWarmError> {
        info!(target = "storefront::cache_warmer", "populating cache");
        let started_at = Instant::now();

        let mut report = WarmReport::default();
        for step in WarmStep::ALL {
            let outcome = self.run_step(step).await?;
            report.steps.push((step, outcome));
        }

        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        histogram!(METRIC_CACHE_POPULATE_MS).record(elapsed_ms);
        info!(
            target = "storefront::cache_warmer",
            entries = report.entries_written(),
            elapsed_ms,
            "cache populated"
        );

        Ok(report)
    }

    async fn run_step(&self, step: WarmStep) -> Result<StepOutcome, CacheWarmError> {
        let guarded = self
            .cache
            .contains(&step.guard())
            .await
            .map_err(cache_error(step))?;
        if guarded {
            info!(
                target = "storefront::cache_warmer",
                step = step.name(),
                guard = %step.guard(),
                "step skipped, guard key present"
            );
            return Ok(StepOutcome::Skipped);
        }

        info!(
            target = "storefront::cache_warmer",
            step = step.name(),
            "step started"
        );
        let written = match step {
            WarmStep::CatalogPages => self.warm_catalog_pages().await?,
            WarmStep::ProductComments => self.warm_product_comments().await?,
            WarmStep::Users => self.warm_users().await?,
            WarmStep::Products => self.warm_products().await?,
            WarmStep::UserBuyHistories => self.warm_user_buy_histories().await?,
        };
        info!(
            target = "storefront::cache_warmer",
            step = step.name(),
            entries = written,
            "step finished"
        );

        Ok(StepOutcome::Written(written))
    }

    async fn warm_catalog_pages(&self) -> Result<usize, CacheWarmError> {
        let step = WarmStep::CatalogPages;
        let mut written = 0;
        for page in catalog_pages() {
            let products = self
                .products
                .list_catalog_page(page)
                .await
                .map_err(load_error(step))?;
            self.cache
                .set(&CacheKey::CatalogPage(page.index), &products)
                .await
                .map_err(cache_error(step))?;
            written += 1;
        }
        Ok(written)
    }

    async fn warm_product_comments(&self) -> Result<usize, CacheWarmError> {
        let step = WarmStep::ProductComments;
        let comments = self
            .comments
            .list_authored_comments()
            .await
            .map_err(load_error(step))?;

        // Rows arrive newest first within a product, so pushing keeps that order.
        let mut grouped: BTreeMap<i64, Vec<CachedComment>> = BTreeMap::new();
        for authored in comments {
            grouped
                .entry(authored.comment.product_id)
                .or_default()
                .push(CachedComment::from(authored));
        }

        for (product_id, comments) in &grouped {
            self.cache
                .set(&CacheKey::ProductComments(*product_id), comments)
                .await
                .map_err(cache_error(step))?;
        }
        Ok(grouped.len())
    }

    async fn warm_users(&self) -> Result<usize, CacheWarmError> {
        let step = WarmStep::Users;
        let users = self.users.list_users().await.map_err(load_error(step))?;
        for user in &users {
            self.cache
                .set(&CacheKey::User(user.id), user)
                .await
                .map_err(cache_error(step))?;
        }
        Ok(users.len())
    }

    async fn warm_products(&self) -> Result<usize, CacheWarmError> {
        let step = WarmStep::Products;
        let products = self
            .products
            .list_products()
            .await
            .map_err(load_error(step))?;
        for product in &products {
            self.cache
                .set(&CacheKey::Product(product.id), product)
                .await
                .map_err(cache_error(step))?;
        }
        Ok(products.len())
    }

    async fn warm_user_buy_histories(&self) -> Result<usize, CacheWarmError> {
        let step = WarmStep::UserBuyHistories;
        let purchases = self
            .histories
            .list_user_purchases()
            .await
            .map_err(load_error(step))?;

        let mut grouped: BTreeMap<i64, Vec<PurchasedProduct>> = BTreeMap::new();
        for purchase in purchases {
            grouped
                .entry(purchase.user_id)
                .or_default()
                .push(purchase.product);
        }

        for (user_id, products) in &grouped {
            self.cache
                .set(&CacheKey::UserBuyHistories(*user_id), products)
                .await
                .map_err(cache_error(step))?;
        }
        Ok(grouped.len())
    }
}

fn load_error(step: WarmStep) -> impl FnOnce(RepoError) -> CacheWarmError {
    move |source| CacheWarmError::Load {
        step: step.name(),
        source,
    }
}

fn cache_error(step: WarmStep) -> impl FnOnce(CacheError) -> CacheWarmError {
    move |source| CacheWarmError::Cache {
        step: step.name(),
        source,
    }
}
