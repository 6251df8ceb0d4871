use sqlx::SqlitePool;

/// Create an in-memory SQLite database for testing
///
/// Creates a fresh in-memory database with migrations applied.
/// Each call creates a completely isolated database instance.
pub async fn setup_test_db() -> SqlitePool {
    reflecto::adapters::sqlite::create_migrated_test_pool()
        .await
        .expect("failed to create test database")
}

/// Teardown test database
///
/// Closes the connection pool and cleans up resources.
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}
