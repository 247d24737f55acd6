use async_trait::async_trait;
use time::PrimitiveDateTime;

use crate::{
    application::repos::{CommentsRepo, CreateCommentParams, RepoError},
    domain::entities::{AuthoredComment, CommentRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct AuthoredCommentRow {
    id: i64,
    product_id: i64,
    user_id: i64,
    content: String,
    created_at: PrimitiveDateTime,
    user_name: String,
}

impl From<AuthoredCommentRow> for AuthoredComment {
    fn from(row: AuthoredCommentRow) -> Self {
        Self {
            comment: CommentRecord {
                id: row.id,
                product_id: row.product_id,
                user_id: row.user_id,
                content: row.content,
                created_at: row.created_at,
            },
            user_name: row.user_name,
        }
    }
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn list_authored_comments(&self) -> Result<Vec<AuthoredComment>, RepoError> {
        let rows = sqlx::query_as::<_, AuthoredCommentRow>(
            r#"
            SELECT c.id, c.product_id, c.user_id, c.content, c.created_at, u.name AS user_name
            FROM comments c
            INNER JOIN products p ON p.id = c.product_id
            INNER JOIN users u ON u.id = c.user_id
            ORDER BY c.product_id ASC, c.id DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(AuthoredComment::from).collect())
    }

    async fn create_comment(&self, params: CreateCommentParams) -> Result<i64, RepoError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO comments (product_id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(params.product_id)
        .bind(params.user_id)
        .bind(params.content)
        .bind(params.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(id)
    }
}
