use std::sync::Arc;

use crate::database::BlogDatabase;
use crate::error::AppResult;
use crate::models::Comment;
use crate::repository::STORE_NOW;

#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<BlogDatabase>,
}

impl CommentRepository {
    pub fn new(db: Arc<BlogDatabase>) -> Self {
        Self { db }
    }

    /// Comments on a post, oldest first.
    pub async fn list_by_post(&self, post_id: i64) -> AppResult<Vec<Comment>> {
        self.db
            .with_deadline(
                "comments.list_by_post",
                sqlx::query_as::<_, Comment>(
                    "SELECT id, post_id, author, content, created_at FROM comments \
                     WHERE post_id = ? ORDER BY created_at ASC, id ASC",
                )
                .bind(post_id)
                .fetch_all(&self.db.pool),
            )
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Comment>> {
        self.db
            .with_deadline(
                "comments.get_by_id",
                sqlx::query_as::<_, Comment>(
                    "SELECT id, post_id, author, content, created_at FROM comments WHERE id = ?",
                )
                .bind(id)
                .fetch_optional(&self.db.pool),
            )
            .await
    }

    pub async fn create(&self, post_id: i64, author: &str, content: &str) -> AppResult<i64> {
        let sql = format!(
            "INSERT INTO comments (post_id, author, content, created_at) VALUES (?, ?, ?, {})",
            STORE_NOW
        );
        let result = self
            .db
            .run_write(
                "comments.create",
                sqlx::query(&sql)
                    .bind(post_id)
                    .bind(author)
                    .bind(content)
                    .execute(&self.db.pool),
            )
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn count_by_post(&self, post_id: i64) -> AppResult<i64> {
        self.db
            .with_deadline(
                "comments.count_by_post",
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = ?")
                    .bind(post_id)
                    .fetch_one(&self.db.pool),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{count_rows, fresh_database};
    use crate::error::AppError;
    use crate::repository::{CategoryRepository, PostRepository};

    async fn post_fixture(db: &Arc<BlogDatabase>) -> i64 {
        let category_id = CategoryRepository::new(db.clone())
            .create("Tech", "tech")
            .await
            .unwrap();
        PostRepository::new(db.clone())
            .create("Hi", "World", category_id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_by_post_oldest_first() {
        let (_dir, db) = fresh_database().await;
        let post_id = post_fixture(&db).await;
        let comments = CommentRepository::new(db);

        let first = comments.create(post_id, "Bob", "first").await.unwrap();
        let second = comments.create(post_id, "Ann", "second").await.unwrap();
        let third = comments.create(post_id, "Eve", "third").await.unwrap();

        let listed = comments.list_by_post(post_id).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first, second, third]);
        assert!(listed.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert_eq!(comments.count_by_post(post_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_get_by_id_returns_stored_row() {
        let (_dir, db) = fresh_database().await;
        let post_id = post_fixture(&db).await;
        let comments = CommentRepository::new(db);

        let id = comments.create(post_id, "Bob", "Nice!").await.unwrap();
        let comment = comments.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(comment.post_id, post_id);
        assert_eq!(comment.author, "Bob");
        assert_eq!(comment.content, "Nice!");
        assert!(comments.get_by_id(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_rejected() {
        let (_dir, db) = fresh_database().await;
        let comments = CommentRepository::new(db.clone());

        let err = comments.create(777, "Bob", "orphan").await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)), "got {:?}", err);
        assert_eq!(count_rows(&db, "comments").await, 0);
    }

    #[tokio::test]
    async fn test_list_for_post_without_comments_is_empty() {
        let (_dir, db) = fresh_database().await;
        let post_id = post_fixture(&db).await;
        let comments = CommentRepository::new(db);
        assert!(comments.list_by_post(post_id).await.unwrap().is_empty());
        assert_eq!(comments.count_by_post(post_id).await.unwrap(), 0);
    }
}
