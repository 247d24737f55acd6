use async_trait::async_trait;

use crate::{
    application::repos::{ProductsRepo, RepoError},
    domain::{catalog::CatalogPage, entities::ProductRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    image_path: String,
    price: i32,
    description: String,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_path: row.image_path,
            price: row.price,
            description: row.description,
        }
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, image_path, price, description
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn list_catalog_page(&self, page: CatalogPage) -> Result<Vec<ProductRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, image_path, price, description
            FROM products
            WHERE id BETWEEN $1 AND $2
            ORDER BY id DESC
            "#,
        )
        .bind(page.from)
        .bind(page.to)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }
}
