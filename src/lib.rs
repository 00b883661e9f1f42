// Dial - espresso dial-in log
// Module declarations

pub mod commands;
pub mod dial;
pub mod state;

pub use state::{DbConnection, DbError, DbResult};

/// Open the shared database, creating and upgrading it as needed.
///
/// Call once at startup; later calls return the same connection.
pub async fn init() -> DbResult<DbConnection> {
    let db = DbConnection::shared().await.map_err(|e| {
        log::error!("Failed to initialize database: {}", e);
        e
    })?;

    log::info!("Dial initialized successfully");
    Ok(db)
}
