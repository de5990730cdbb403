use std::sync::Arc;

use rusqlite::{OptionalExtension, Row};
use tracing::info;

use parley_crypto::CredentialStore;
use parley_types::api::RegisterRequest;
use parley_types::models::{RegisteredUser, User, UserSummary};

use crate::{Database, DbError, Result, constraint_error, timestamp};

const USER_COLUMNS: &str = "username, first_name, last_name, phone, join_at, last_login_at";

/// Owns the `users` table. Every read and write of a user goes through here.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<Database>,
    credentials: CredentialStore,
}

impl UserRepository {
    pub fn new(db: Arc<Database>, credentials: CredentialStore) -> Self {
        Self { db, credentials }
    }

    /// Hash the password and insert the user with `join_at = last_login_at = now`.
    pub fn register(&self, req: &RegisterRequest) -> Result<RegisteredUser> {
        let password_hash = self.credentials.hash(&req.password)?;
        let now = timestamp::now();

        let user = self.db.with_conn_mut(|conn| {
            conn.query_row(
                "INSERT INTO users (username, password_hash, first_name, last_name, phone, join_at, last_login_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 RETURNING username, password_hash, first_name, last_name, phone",
                rusqlite::params![
                    req.username,
                    password_hash,
                    req.first_name,
                    req.last_name,
                    req.phone,
                    now
                ],
                |row| {
                    Ok(RegisteredUser {
                        username: row.get(0)?,
                        password_hash: row.get(1)?,
                        first_name: row.get(2)?,
                        last_name: row.get(3)?,
                        phone: row.get(4)?,
                    })
                },
            )
            .map_err(|e| constraint_error(e, &format!("user {}", req.username)))
        })?;

        info!("Registered user {}", user.username);
        Ok(user)
    }

    /// Is this username/password pair valid?
    ///
    /// An unknown user and a wrong password both come back as `Ok(false)`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let hash: Option<String> = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT password_hash FROM users WHERE username = ?1",
                    [username],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        Ok(self.credentials.verify(password, hash.as_deref()))
    }

    /// Stamp a successful login. `last_login_at` never moves backwards.
    pub fn update_login_timestamp(&self, username: &str) -> Result<User> {
        let now = timestamp::now();

        self.db
            .with_conn_mut(|conn| {
                Ok(conn
                    .query_row(
                        &format!(
                            "UPDATE users SET last_login_at = MAX(last_login_at, ?2)
                             WHERE username = ?1
                             RETURNING {USER_COLUMNS}"
                        ),
                        [username, now.as_str()],
                        user_from_row,
                    )
                    .optional()?)
            })?
            .ok_or_else(|| DbError::NotFound(format!("user {}", username)))
    }

    /// Every user, ordered by username.
    pub fn all(&self) -> Result<Vec<UserSummary>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, first_name, last_name FROM users ORDER BY username ASC",
            )?;

            let users = stmt
                .query_map([], |row| {
                    Ok(UserSummary {
                        username: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(users)
        })
    }

    pub fn get(&self, username: &str) -> Result<User> {
        self.db
            .with_conn(|conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                        [username],
                        user_from_row,
                    )
                    .optional()?)
            })?
            .ok_or_else(|| DbError::NotFound(format!("user {}", username)))
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        username: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone: row.get(3)?,
        join_at: timestamp::column(row, 4)?,
        last_login_at: timestamp::column(row, 5)?,
    })
}
