/**
 * Server Configuration
 *
 * Configuration comes from environment variables with local-development
 * defaults. The conversation store is not optional: a failed database
 * connection aborts startup, it never degrades to a storeless mode.
 */

use sqlx::SqlitePool;

/// Runtime configuration for the chat server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// SQLite connection string for the conversation store
    pub database_url: String,
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// - `PORT` (default 3000)
    /// - `DATABASE_URL` (default `sqlite://tienda.db?mode=rwc`)
    ///
    /// The JWT secret is read separately by the auth module (`JWT_SECRET`).
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(3000);

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://tienda.db?mode=rwc".to_string());

        Self { port, database_url }
    }
}

/// Connect the conversation store and bring its schema up to date
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to conversation store...");
    let pool = SqlitePool::connect(database_url).await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;

    tracing::info!("Conversation store ready");
    Ok(pool)
}
