use std::sync::Arc;

use crate::database::BlogDatabase;
use crate::error::AppResult;
use crate::models::Category;
use crate::repository::STORE_NOW;

#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<BlogDatabase>,
}

impl CategoryRepository {
    pub fn new(db: Arc<BlogDatabase>) -> Self {
        Self { db }
    }

    /// All categories ordered by name.
    pub async fn list_all(&self) -> AppResult<Vec<Category>> {
        self.db
            .with_deadline(
                "categories.list_all",
                sqlx::query_as::<_, Category>(
                    "SELECT id, name, slug, created_at FROM categories ORDER BY name ASC",
                )
                .fetch_all(&self.db.pool),
            )
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Category>> {
        self.db
            .with_deadline(
                "categories.get_by_id",
                sqlx::query_as::<_, Category>(
                    "SELECT id, name, slug, created_at FROM categories WHERE id = ?",
                )
                .bind(id)
                .fetch_optional(&self.db.pool),
            )
            .await
    }

    /// Insert a category. Duplicate name or slug surfaces as a constraint violation.
    pub async fn create(&self, name: &str, slug: &str) -> AppResult<i64> {
        let sql = format!(
            "INSERT INTO categories (name, slug, created_at) VALUES (?, ?, {})",
            STORE_NOW
        );
        let result = self
            .db
            .run_write(
                "categories.create",
                sqlx::query(&sql).bind(name).bind(slug).execute(&self.db.pool),
            )
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Delete an unreferenced category. The posts foreign key has no ON DELETE
    /// action, so a category still used by a post is refused by the store.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = self
            .db
            .run_write(
                "categories.delete",
                sqlx::query("DELETE FROM categories WHERE id = ?")
                    .bind(id)
                    .execute(&self.db.pool),
            )
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
