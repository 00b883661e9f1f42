// SQLite database setup and migrations
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::OnceCell;

use super::storage::{default_db_path, ensure_parent_dir, StorageError};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Migration adding {table}.{column} failed: {source}")]
    Migration {
        table: &'static str,
        column: &'static str,
        source: rusqlite::Error,
    },
}

pub type DbResult<T> = Result<T, DbError>;

static SHARED: OnceCell<DbConnection> = OnceCell::const_new();

// Thread-safe database connection wrapper
pub struct DbConnection {
    conn: Arc<Mutex<Connection>>,
}

impl DbConnection {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves the connection itself usable.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The process-wide connection at the default location.
    ///
    /// The first caller opens and initializes the database; every later caller
    /// gets a handle to the same connection.
    pub async fn shared() -> DbResult<DbConnection> {
        let db = SHARED
            .get_or_try_init(|| async {
                tokio::task::spawn_blocking(init_db).await?
            })
            .await?;
        Ok(db.clone())
    }
}

impl Clone for DbConnection {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Initialize the database at the app data directory
pub fn init_db() -> DbResult<DbConnection> {
    let db_path = default_db_path()?;
    open_db(&db_path)
}

/// Open (creating if needed) and initialize the database at `db_path`
pub fn open_db(db_path: &Path) -> DbResult<DbConnection> {
    ensure_parent_dir(db_path)?;

    let conn = Connection::open(db_path)?;

    let journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    log::debug!("Opened {} (journal_mode={})", db_path.display(), journal_mode);

    initialize(&conn)?;

    Ok(DbConnection::new(conn))
}

/// Open and initialize a private in-memory database
pub fn open_in_memory() -> DbResult<DbConnection> {
    let conn = Connection::open_in_memory()?;
    initialize(&conn)?;
    Ok(DbConnection::new(conn))
}

/// Make the schema present and current. Safe to call on every start.
pub fn initialize(conn: &Connection) -> DbResult<()> {
    // Enable foreign keys
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    create_schema(conn)?;
    run_migrations(conn)?;

    Ok(())
}

fn create_schema(conn: &Connection) -> DbResult<()> {
    // Beans table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS beans (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            roaster TEXT NOT NULL,
            roastDate TEXT,
            notes TEXT,
            isActive INTEGER NOT NULL DEFAULT 0,
            createdAt TEXT NOT NULL
        )",
        [],
    )?;

    // Shots table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS shots (
            id TEXT PRIMARY KEY NOT NULL,
            beanId TEXT NOT NULL,
            grindSetting INTEGER NOT NULL,
            doseGrams REAL NOT NULL,
            yieldGrams REAL NOT NULL,
            timeSeconds INTEGER NOT NULL,
            tasteTags TEXT NOT NULL DEFAULT '[]',
            shotCharacteristics TEXT NOT NULL DEFAULT '[]',
            isDialed INTEGER NOT NULL DEFAULT 0,
            drinkType TEXT,
            brewMethod TEXT DEFAULT 'espresso',
            notes TEXT,
            createdAt TEXT NOT NULL,
            FOREIGN KEY (beanId) REFERENCES beans(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_shots_beanId ON shots(beanId)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_shots_createdAt ON shots(createdAt)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_beans_isActive ON beans(isActive)",
        [],
    )?;

    Ok(())
}

/// A column added after the first schema shipped.
struct ColumnMigration {
    table: &'static str,
    column: &'static str,
    decl: &'static str,
}

// Additive only: never drop, reorder or retype a column.
const COLUMN_MIGRATIONS: &[ColumnMigration] = &[
    ColumnMigration {
        table: "shots",
        column: "brewMethod",
        decl: "TEXT DEFAULT 'espresso'",
    },
    ColumnMigration {
        table: "shots",
        column: "shotCharacteristics",
        decl: "TEXT NOT NULL DEFAULT '[]'",
    },
];

fn run_migrations(conn: &Connection) -> DbResult<()> {
    for migration in COLUMN_MIGRATIONS {
        if column_exists(conn, migration.table, migration.column)? {
            continue;
        }

        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            migration.table, migration.column, migration.decl
        );
        conn.execute(&sql, [])
            .map_err(|source| DbError::Migration {
                table: migration.table,
                column: migration.column,
                source,
            })?;

        log::info!(
            "Added column {}.{} to existing database",
            migration.table,
            migration.column
        );
    }

    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(names.iter().any(|name| name == column))
}
