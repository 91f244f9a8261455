//! Database test fixtures
//!
//! In-memory SQLite stores with the real schema applied, one per test.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Create a migrated in-memory test pool
///
/// Capped at one connection: every `sqlite::memory:` connection is its own
/// database, so a larger pool would scatter the data.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test database fixture
pub struct TestDatabase {
    pool: SqlitePool,
}

impl TestDatabase {
    /// Create a new migrated in-memory database
    pub async fn new() -> Self {
        Self {
            pool: create_test_pool().await,
        }
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
