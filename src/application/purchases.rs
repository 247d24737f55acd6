//! Purchase write path.
//!
//! A purchase only inserts a history row. The cached `user_{id}_buy_histories` list is left
//! alone until the next reset; the user page reads purchases live and shows them immediately.

use std::sync::Arc;

use tracing::info;

use crate::{
    application::{
        error::AppError,
        repos::{HistoriesRepo, RecordPurchaseParams},
    },
    domain::{clock::store_now, entities::UserRecord},
};

#[derive(Clone)]
pub struct PurchaseService {
    histories: Arc<dyn HistoriesRepo>,
}

impl PurchaseService {
    pub fn new(histories: Arc<dyn HistoriesRepo>) -> Self {
        Self { histories }
    }

    /// Record that `buyer` bought `product_id`; returns the new history id.
    pub async fn buy(&self, product_id: i64, buyer: &UserRecord) -> Result<i64, AppError> {
        let history_id = self
            .histories
            .record_purchase(RecordPurchaseParams {
                product_id,
                user_id: buyer.id,
                created_at: store_now(),
            })
            .await?;

        info!(
            target = "storefront::purchases",
            product_id,
            user_id = buyer.id,
            history_id,
            "purchase recorded"
        );

        Ok(history_id)
    }
}
