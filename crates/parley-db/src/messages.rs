use std::sync::Arc;

use rusqlite::{OptionalExtension, Row};
use tracing::debug;

use parley_types::models::{
    Counterparty, Message, MessageDetail, ReadReceipt, ReceivedMessage, SentMessage,
};

use crate::{Database, DbError, Result, constraint_error, timestamp};

/// Owns the `messages` table. Reads join the other party's current profile
/// from `users`, so renamed or re-numbered users show up as they are now.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<Database>,
}

impl MessageRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message> {
        if from_username == to_username {
            return Err(DbError::InvalidMessage(format!(
                "{} cannot message themselves",
                from_username
            )));
        }

        let sent_at = timestamp::now();
        let message = self.db.with_conn_mut(|conn| {
            conn.query_row(
                "INSERT INTO messages (from_username, to_username, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, from_username, to_username, body, sent_at",
                [from_username, to_username, body, sent_at.as_str()],
                |row| {
                    Ok(Message {
                        id: row.get(0)?,
                        from_username: row.get(1)?,
                        to_username: row.get(2)?,
                        body: row.get(3)?,
                        sent_at: timestamp::column(row, 4)?,
                    })
                },
            )
            .map_err(|e| {
                constraint_error(e, &format!("message {} -> {}", from_username, to_username))
            })
        })?;

        debug!("Stored message {} ({} -> {})", message.id, from_username, to_username);
        Ok(message)
    }

    /// One message with both parties expanded.
    pub fn get(&self, id: i64) -> Result<MessageDetail> {
        self.db
            .with_conn(|conn| {
                Ok(conn
                    .query_row(
                        "SELECT m.id,
                                f.username, f.first_name, f.last_name, f.phone,
                                t.username, t.first_name, t.last_name, t.phone,
                                m.body, m.sent_at, m.read_at
                         FROM messages m
                         JOIN users f ON f.username = m.from_username
                         JOIN users t ON t.username = m.to_username
                         WHERE m.id = ?1",
                        [id],
                        |row| {
                            Ok(MessageDetail {
                                id: row.get(0)?,
                                from_user: counterparty(row, 1)?,
                                to_user: counterparty(row, 5)?,
                                body: row.get(9)?,
                                sent_at: timestamp::column(row, 10)?,
                                read_at: timestamp::optional_column(row, 11)?,
                            })
                        },
                    )
                    .optional()?)
            })?
            .ok_or_else(|| DbError::NotFound(format!("message {}", id)))
    }

    /// Set `read_at` the first time; later calls report the original time.
    pub fn mark_read(&self, id: i64) -> Result<ReadReceipt> {
        let now = timestamp::now();

        self.db
            .with_conn_mut(|conn| {
                Ok(conn
                    .query_row(
                        "UPDATE messages SET read_at = COALESCE(read_at, ?2)
                         WHERE id = ?1
                         RETURNING id, read_at",
                        rusqlite::params![id, now],
                        |row| {
                            Ok(ReadReceipt {
                                id: row.get(0)?,
                                read_at: timestamp::column(row, 1)?,
                            })
                        },
                    )
                    .optional()?)
            })?
            .ok_or_else(|| DbError::NotFound(format!("message {}", id)))
    }

    /// Messages sent by `username`, oldest first, each with its recipient.
    pub fn messages_from(&self, username: &str) -> Result<Vec<SentMessage>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, t.username, t.first_name, t.last_name, t.phone,
                        m.body, m.sent_at, m.read_at
                 FROM messages m
                 JOIN users t ON t.username = m.to_username
                 WHERE m.from_username = ?1
                 ORDER BY m.id ASC",
            )?;

            let rows = stmt
                .query_map([username], |row| {
                    Ok(SentMessage {
                        id: row.get(0)?,
                        to_user: counterparty(row, 1)?,
                        body: row.get(5)?,
                        sent_at: timestamp::column(row, 6)?,
                        read_at: timestamp::optional_column(row, 7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Messages received by `username`, oldest first, each with its sender.
    pub fn messages_to(&self, username: &str) -> Result<Vec<ReceivedMessage>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, f.username, f.first_name, f.last_name, f.phone,
                        m.body, m.sent_at, m.read_at
                 FROM messages m
                 JOIN users f ON f.username = m.from_username
                 WHERE m.to_username = ?1
                 ORDER BY m.id ASC",
            )?;

            let rows = stmt
                .query_map([username], |row| {
                    Ok(ReceivedMessage {
                        id: row.get(0)?,
                        from_user: counterparty(row, 1)?,
                        body: row.get(5)?,
                        sent_at: timestamp::column(row, 6)?,
                        read_at: timestamp::optional_column(row, 7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

/// Four consecutive columns starting at `start`: username, first, last, phone.
fn counterparty(row: &Row<'_>, start: usize) -> rusqlite::Result<Counterparty> {
    Ok(Counterparty {
        username: row.get(start)?,
        first_name: row.get(start + 1)?,
        last_name: row.get(start + 2)?,
        phone: row.get(start + 3)?,
    })
}
