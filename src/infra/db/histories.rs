use async_trait::async_trait;
use time::PrimitiveDateTime;

use crate::{
    application::repos::{HistoriesRepo, RecordPurchaseParams, RepoError},
    domain::entities::{PurchasedProduct, UserPurchase},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    user_id: i64,
    history_id: i64,
    product_id: i64,
    name: String,
    description: String,
    image_path: String,
    price: i32,
    created_at: PrimitiveDateTime,
}

impl From<PurchaseRow> for UserPurchase {
    fn from(row: PurchaseRow) -> Self {
        Self {
            user_id: row.user_id,
            history_id: row.history_id,
            product: PurchasedProduct {
                id: row.product_id,
                name: row.name,
                description: row.description,
                image_path: row.image_path,
                price: row.price,
                created_at: row.created_at,
            },
        }
    }
}

const PURCHASE_COLUMNS: &str = "h.user_id, h.id AS history_id, p.id AS product_id, p.name, \
    p.description, p.image_path, p.price, h.created_at";

#[async_trait]
impl HistoriesRepo for PostgresRepositories {
    async fn list_user_purchases(&self) -> Result<Vec<UserPurchase>, RepoError> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} \
             FROM histories h \
             INNER JOIN products p ON p.id = h.product_id \
             ORDER BY h.user_id ASC, h.id DESC"
        );
        let rows = sqlx::query_as::<_, PurchaseRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserPurchase::from).collect())
    }

    async fn list_purchases_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<PurchasedProduct>, RepoError> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} \
             FROM histories h \
             INNER JOIN products p ON p.id = h.product_id \
             WHERE h.user_id = $1 \
             ORDER BY h.id DESC"
        );
        let rows = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| UserPurchase::from(row).product)
            .collect())
    }

    async fn has_purchased(&self, product_id: i64, user_id: i64) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM histories WHERE product_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(exists)
    }

    async fn record_purchase(&self, params: RecordPurchaseParams) -> Result<i64, RepoError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO histories (product_id, user_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(params.product_id)
        .bind(params.user_id)
        .bind(params.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(id)
    }
}
