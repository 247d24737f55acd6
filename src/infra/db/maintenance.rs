use async_trait::async_trait;

use crate::{
    application::repos::{MaintenanceRepo, RepoError},
    domain::reset::{ResetBaseline, ResetSummary},
};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl MaintenanceRepo for PostgresRepositories {
    async fn reset_to_baseline(&self, baseline: ResetBaseline) -> Result<ResetSummary, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let users = sqlx::query("DELETE FROM users WHERE id > $1")
            .bind(baseline.max_user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();
        let products = sqlx::query("DELETE FROM products WHERE id > $1")
            .bind(baseline.max_product_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();
        let comments = sqlx::query("DELETE FROM comments WHERE id > $1")
            .bind(baseline.max_comment_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();
        let histories = sqlx::query("DELETE FROM histories WHERE id > $1")
            .bind(baseline.max_history_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(ResetSummary {
            users,
            products,
            comments,
            histories,
        })
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await.map_err(map_sqlx_error)
    }
}
