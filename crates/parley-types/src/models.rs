use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row projection returned right after registration.
/// Carries the stored hash, so it is never serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Full profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub join_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

/// Directory entry, as listed by `all()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// The other party of a message, joined in at query time from their
/// current profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// A freshly stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// A message seen from its sender's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: i64,
    pub to_user: Counterparty,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A message seen from its recipient's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub id: i64,
    pub from_user: Counterparty,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A single message with both parties expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDetail {
    pub id: i64,
    pub from_user: Counterparty,
    pub to_user: Counterparty,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl MessageDetail {
    /// True when `username` is the sender or the recipient.
    pub fn involves(&self, username: &str) -> bool {
        self.from_user.username == username || self.to_user.username == username
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub id: i64,
    pub read_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(username: &str) -> Counterparty {
        Counterparty {
            username: username.into(),
            first_name: "F".into(),
            last_name: "L".into(),
            phone: "555".into(),
        }
    }

    #[test]
    fn sent_message_nests_recipient() {
        let msg = SentMessage {
            id: 7,
            to_user: party("bob"),
            body: "hi".into(),
            sent_at: DateTime::default(),
            read_at: None,
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["to_user"]["username"], "bob");
        assert_eq!(json["body"], "hi");
        assert!(json["read_at"].is_null());
        assert!(json.get("from_user").is_none());
    }

    #[test]
    fn detail_involves_only_its_parties() {
        let detail = MessageDetail {
            id: 1,
            from_user: party("alice"),
            to_user: party("bob"),
            body: "hi".into(),
            sent_at: DateTime::default(),
            read_at: None,
        };

        assert!(detail.involves("alice"));
        assert!(detail.involves("bob"));
        assert!(!detail.involves("carol"));
    }
}
