use std::sync::Arc;

use crate::database::BlogDatabase;
use crate::error::AppResult;
use crate::models::Like;
use crate::repository::STORE_NOW;

#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<BlogDatabase>,
}

impl LikeRepository {
    pub fn new(db: Arc<BlogDatabase>) -> Self {
        Self { db }
    }

    /// Record a like. Likes carry no actor, so every call adds a row.
    pub async fn add(&self, post_id: i64) -> AppResult<i64> {
        let sql = format!("INSERT INTO likes (post_id, created_at) VALUES (?, {})", STORE_NOW);
        let result = self
            .db
            .run_write(
                "likes.add",
                sqlx::query(&sql).bind(post_id).execute(&self.db.pool),
            )
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Like>> {
        self.db
            .with_deadline(
                "likes.get_by_id",
                sqlx::query_as::<_, Like>("SELECT id, post_id, created_at FROM likes WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.db.pool),
            )
            .await
    }

    pub async fn count_by_post(&self, post_id: i64) -> AppResult<i64> {
        self.db
            .with_deadline(
                "likes.count_by_post",
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE post_id = ?")
                    .bind(post_id)
                    .fetch_one(&self.db.pool),
            )
            .await
    }
}
