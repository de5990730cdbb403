pub mod messages;
pub mod migrations;
pub mod timestamp;
pub mod users;

pub use messages::MessageRepository;
pub use users::UserRepository;

use rusqlite::{Connection, ErrorCode, OpenFlags, ffi};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::info;

use parley_crypto::CryptoError;

const READER_POOL_SIZE: usize = 4;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("already exists: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// SQLite store: one writer connection plus a small round-robin set of
/// read-only connections. In-memory databases run on the writer alone.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let writer = Connection::open(path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        Ok(Self {
            writer: Mutex::new(conn),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        if self.readers.is_empty() {
            return self.with_conn_mut(f);
        }

        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|_| DbError::Poisoned("reader"))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.writer.lock().map_err(|_| DbError::Poisoned("writer"))?;
        f(&conn)
    }
}

/// Translate constraint violations into the domain taxonomy.
/// `subject` names what the statement was about, for the error message.
pub(crate) fn constraint_error(err: rusqlite::Error, subject: &str) -> DbError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return DbError::Conflict(subject.to_string());
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return DbError::NotFound(subject.to_string());
                }
                ffi::SQLITE_CONSTRAINT_CHECK => {
                    return DbError::InvalidMessage(subject.to_string());
                }
                _ => {}
            }
        }
    }
    DbError::Sqlite(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_database_reads_its_own_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("parley.db")).unwrap();

        db.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash, first_name, last_name, phone, join_at, last_login_at)
                 VALUES ('alice', 'x', 'Alice', 'A', '555', '2026-01-01T00:00:00.000000Z', '2026-01-01T00:00:00.000000Z')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        for _ in 0..READER_POOL_SIZE + 1 {
            let count: i64 = db
                .with_conn(|conn| {
                    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
                })
                .unwrap();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn readers_refuse_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("parley.db")).unwrap();

        let result = db.with_conn(|conn| {
            conn.execute("DELETE FROM users", [])?;
            Ok(())
        });
        assert!(matches!(result, Err(DbError::Sqlite(_))));
    }
}
