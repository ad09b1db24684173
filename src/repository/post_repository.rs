use sqlx::{QueryBuilder, Sqlite};
use std::sync::Arc;

use crate::database::BlogDatabase;
use crate::error::AppResult;
use crate::models::Post;
use crate::repository::STORE_NOW;

// LEFT JOINs keep posts with no comments/likes; COUNT over a NULL column yields 0.
// DISTINCT undoes the comments x likes fan-out of the double join.
const POST_AGGREGATE_SELECT: &str = "
SELECT p.id, p.title, p.content, p.category_id, p.created_at, p.updated_at,
       COUNT(DISTINCT c.id) AS comment_count,
       COUNT(DISTINCT l.id) AS like_count
FROM posts p
LEFT JOIN comments c ON p.id = c.post_id
LEFT JOIN likes l ON p.id = l.post_id";

#[derive(Debug, Clone, Copy)]
enum PostFilter {
    All,
    Id(i64),
    Category(i64),
}

fn aggregate_query<'a>(filter: PostFilter) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::<Sqlite>::new(POST_AGGREGATE_SELECT);
    match filter {
        PostFilter::All => {}
        PostFilter::Id(id) => {
            qb.push(" WHERE p.id = ");
            qb.push_bind(id);
        }
        PostFilter::Category(category_id) => {
            qb.push(" WHERE p.category_id = ");
            qb.push_bind(category_id);
        }
    }
    qb.push(" GROUP BY p.id ORDER BY p.created_at DESC, p.id DESC");
    qb
}

#[derive(Clone)]
pub struct PostRepository {
    db: Arc<BlogDatabase>,
}

impl PostRepository {
    pub fn new(db: Arc<BlogDatabase>) -> Self {
        Self { db }
    }

    /// All posts, newest first, with comment and like counts.
    pub async fn list_all(&self) -> AppResult<Vec<Post>> {
        let mut qb = aggregate_query(PostFilter::All);
        self.db
            .with_deadline("posts.list_all", qb.build_query_as::<Post>().fetch_all(&self.db.pool))
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Post>> {
        let mut qb = aggregate_query(PostFilter::Id(id));
        self.db
            .with_deadline(
                "posts.get_by_id",
                qb.build_query_as::<Post>().fetch_optional(&self.db.pool),
            )
            .await
    }

    pub async fn list_by_category(&self, category_id: i64) -> AppResult<Vec<Post>> {
        let mut qb = aggregate_query(PostFilter::Category(category_id));
        self.db
            .with_deadline(
                "posts.list_by_category",
                qb.build_query_as::<Post>().fetch_all(&self.db.pool),
            )
            .await
    }

    /// Insert a post and return its id. A category id with no matching row
    /// is rejected by the store as a constraint violation.
    pub async fn create(&self, title: &str, content: &str, category_id: i64) -> AppResult<i64> {
        let sql = format!(
            "INSERT INTO posts (title, content, category_id, created_at, updated_at) \
             VALUES (?, ?, ?, {now}, {now})",
            now = STORE_NOW
        );
        let result = self
            .db
            .run_write(
                "posts.create",
                sqlx::query(&sql)
                    .bind(title)
                    .bind(content)
                    .bind(category_id)
                    .execute(&self.db.pool),
            )
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Delete a post; its comments and likes go with it through ON DELETE CASCADE.
    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = self
            .db
            .run_write(
                "posts.delete",
                sqlx::query("DELETE FROM posts WHERE id = ?")
                    .bind(id)
                    .execute(&self.db.pool),
            )
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
