//! Database module providing connection management and queries.

pub mod attachments;
pub mod cases;
pub mod labels;
pub mod plans;
pub mod projects;
pub mod recovery;
pub mod results;
pub mod statistics;
pub mod suites;
pub mod test_records;
pub mod tree_store;
pub mod versions;

use sea_orm::{Database, DatabaseConnection};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Database connection pool wrapper around SeaORM's `DatabaseConnection`.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL using the configured URL.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let conn = Database::connect(&config.database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Wrap an existing connection (used by tests).
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        DbPool { conn }
    }

    /// Get access to the underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
