//! Administrative reset: trim the backing store back to its seeded baseline, then repopulate
//! the cache.

use std::sync::Arc;

use tracing::info;

use crate::{
    application::{error::AppError, repos::MaintenanceRepo},
    domain::reset::{ResetBaseline, ResetSummary},
    infra::cache_warmer::{CacheWarmer, WarmReport},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeReport {
    pub reset: ResetSummary,
    pub warm: WarmReport,
}

#[derive(Clone)]
pub struct MaintenanceService {
    repo: Arc<dyn MaintenanceRepo>,
    warmer: Arc<CacheWarmer>,
    baseline: ResetBaseline,
}

impl MaintenanceService {
    pub fn new(repo: Arc<dyn MaintenanceRepo>, warmer: Arc<CacheWarmer>) -> Self {
        Self {
            repo,
            warmer,
            baseline: ResetBaseline::default(),
        }
    }

    pub fn with_baseline(mut self, baseline: ResetBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Reset the backing store, then repopulate the cache.
    pub async fn initialize(&self) -> Result<InitializeReport, AppError> {
        let reset = self.reset().await?;
        let warm = self.warmer.populate().await?;
        Ok(InitializeReport { reset, warm })
    }

    /// Delete rows above the baseline without touching the cache.
    pub async fn reset(&self) -> Result<ResetSummary, AppError> {
        let reset = self.repo.reset_to_baseline(self.baseline).await?;
        info!(
            target = "storefront::maintenance",
            users = reset.users,
            products = reset.products,
            comments = reset.comments,
            histories = reset.histories,
            "backing store reset to baseline"
        );
        Ok(reset)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repo.health_check().await?;
        Ok(())
    }
}
