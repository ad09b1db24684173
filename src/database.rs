// Store handle and schema management for the blog relations
// One pooled SQLite handle per process, shared by every repository

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Categories inserted into an empty store, in id order
pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("General", "general"),
    ("Technology", "technology"),
    ("Travel", "travel"),
    ("Cooking", "cooking"),
];

const CREATE_POSTS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    category_id INTEGER NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (category_id) REFERENCES categories(id)
)";

const CREATE_CATEGORIES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    slug TEXT NOT NULL UNIQUE,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_COMMENTS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL,
    author TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
)";

const CREATE_LIKES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS likes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
)";

const SCHEMA: [(&str, &str); 7] = [
    ("posts", CREATE_POSTS_TABLE),
    ("categories", CREATE_CATEGORIES_TABLE),
    ("comments", CREATE_COMMENTS_TABLE),
    ("likes", CREATE_LIKES_TABLE),
    ("idx_posts_category", "CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category_id)"),
    ("idx_comments_post", "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)"),
    ("idx_likes_post", "CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id)"),
];

pub struct BlogDatabase {
    pub pool: SqlitePool,
    query_timeout: Duration,
}

impl BlogDatabase {
    /// Open the pool with WAL journaling and foreign-key enforcement.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::ConfigurationError(format!("Invalid database url {}: {}", config.url, e))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.lock_wait());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.busy_timeout())
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::StoreUnavailable(format!("Failed to open {}: {}", config.url, e))
            })?;

        info!("Connected to {}", config.url);
        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }

    /// Bound a read by the configured query timeout.
    ///
    /// This only bounds how long the caller waits for a result. A statement
    /// already handed to SQLite keeps running after expiry, so writes must go
    /// through `run_write` instead.
    pub async fn with_deadline<T, F>(&self, operation: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                debug!("{} failed: {}", operation, e);
                AppError::from(e)
            }),
            Err(_) => {
                warn!("{} exceeded {:?}", operation, self.query_timeout);
                Err(AppError::TimeoutError(format!(
                    "{} exceeded {} ms",
                    operation,
                    self.query_timeout.as_millis()
                )))
            }
        }
    }

    /// Run a write without a timer. Lock waits are bounded inside SQLite by the
    /// busy timeout (never longer than the query timeout), so a write that
    /// cannot get the lock fails with a busy error and is never applied.
    pub async fn run_write<T, F>(&self, operation: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        fut.await.map_err(|e| {
            debug!("{} failed: {}", operation, e);
            AppError::from(e)
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Store handle closed");
    }

    /// Create all relations and indexes if absent. Safe to call on every start.
    pub async fn init_schema(&self) -> AppResult<()> {
        for (step, (name, ddl)) in SCHEMA.iter().enumerate() {
            sqlx::query(*ddl).execute(&self.pool).await.map_err(|e| {
                AppError::DatabaseError(format!("Failed to create {}: {}", name, e))
            })?;
            debug!("Schema step {} ({}) applied", step + 1, name);
        }
        info!("Schema ready");
        Ok(())
    }

    /// Insert the default categories when none exist. Returns how many were inserted.
    pub async fn seed_default_categories(&self) -> AppResult<usize> {
        let mut tx = self.pool.begin().await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            info!("Categories already seeded ({} present)", existing);
            return Ok(0);
        }

        for (name, slug) in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
                .bind(name)
                .bind(slug)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());
        Ok(DEFAULT_CATEGORIES.len())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{count_rows, database_with_query_timeout, fresh_database};
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let (_dir, db) = fresh_database().await;
        db.init_schema().await.unwrap();
        db.init_schema().await.unwrap();

        for table in ["posts", "categories", "comments", "likes"] {
            assert_eq!(count_rows(&db, table).await, 0);
        }
    }

    #[tokio::test]
    async fn test_foreign_key_declarations() {
        let (_dir, db) = fresh_database().await;

        for (table, parent, on_delete) in [
            ("posts", "categories", "NO ACTION"),
            ("comments", "posts", "CASCADE"),
            ("likes", "posts", "CASCADE"),
        ] {
            let rows = sqlx::query(&format!("PRAGMA foreign_key_list({})", table))
                .fetch_all(&db.pool)
                .await
                .unwrap();
            assert_eq!(rows.len(), 1, "{} should declare one foreign key", table);
            assert_eq!(rows[0].get::<String, _>("table"), parent);
            assert_eq!(rows[0].get::<String, _>("on_delete"), on_delete);
        }
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let (_dir, db) = fresh_database().await;
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_seed_twice_keeps_fixed_set() {
        let (_dir, db) = fresh_database().await;

        assert_eq!(db.seed_default_categories().await.unwrap(), DEFAULT_CATEGORIES.len());
        assert_eq!(db.seed_default_categories().await.unwrap(), 0);

        let slugs: Vec<String> = sqlx::query_scalar("SELECT slug FROM categories ORDER BY id")
            .fetch_all(&db.pool)
            .await
            .unwrap();
        let expected: Vec<String> = DEFAULT_CATEGORIES.iter().map(|(_, s)| s.to_string()).collect();
        assert_eq!(slugs, expected);
    }

    #[tokio::test]
    async fn test_seed_skips_when_categories_exist() {
        let (_dir, db) = fresh_database().await;
        sqlx::query("INSERT INTO categories (name, slug) VALUES ('Tech', 'tech')")
            .execute(&db.pool)
            .await
            .unwrap();

        assert_eq!(db.seed_default_categories().await.unwrap(), 0);
        assert_eq!(count_rows(&db, "categories").await, 1);
    }

    #[tokio::test]
    async fn test_deadline_expiry_reports_timeout() {
        let (_dir, db) = database_with_query_timeout(20).await;

        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, sqlx::Error>(())
        };
        let err = db.with_deadline("slow_op", slow).await.unwrap_err();
        assert!(matches!(err, AppError::TimeoutError(_)));
    }

    #[test]
    fn test_lock_wait_never_exceeds_query_timeout() {
        let mut config = DatabaseConfig::new("sqlite:blog.db");
        config.busy_timeout_ms = 5_000;
        config.query_timeout_ms = 100;
        assert_eq!(config.lock_wait(), Duration::from_millis(100));

        config.busy_timeout_ms = 50;
        assert_eq!(config.lock_wait(), Duration::from_millis(50));
    }
}
