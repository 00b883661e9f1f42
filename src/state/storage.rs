// File system locations for the Dial database
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Identifier used for the per-user data directory.
pub const APP_IDENTIFIER: &str = "com.dial.app";

/// File name of the SQLite database inside the app data directory.
pub const DB_FILE_NAME: &str = "dial.db";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to get app data directory")]
    NoAppDataDir,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Get the app data directory for Dial
pub fn get_app_data_dir() -> StorageResult<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(StorageError::NoAppDataDir)?;
    let dial_dir = data_dir.join(APP_IDENTIFIER);
    fs::create_dir_all(&dial_dir)?;
    Ok(dial_dir)
}

/// Default location of the database file
pub fn default_db_path() -> StorageResult<PathBuf> {
    Ok(get_app_data_dir()?.join(DB_FILE_NAME))
}

/// Make sure the directory holding `db_path` exists
pub fn ensure_parent_dir(db_path: &Path) -> StorageResult<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
