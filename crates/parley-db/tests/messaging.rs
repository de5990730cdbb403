use std::sync::Arc;

use tempfile::TempDir;

use parley_crypto::CredentialStore;
use parley_db::{Database, MessageRepository, UserRepository};
use parley_types::api::RegisterRequest;

fn register(users: &UserRepository, username: &str, password: &str, first: &str, last: &str, phone: &str) {
    users
        .register(&RegisterRequest {
            username: username.into(),
            password: password.into(),
            first_name: first.into(),
            last_name: last.into(),
            phone: phone.into(),
        })
        .expect("register");
}

fn open(dir: &TempDir) -> (UserRepository, MessageRepository) {
    let db = Arc::new(Database::open(&dir.path().join("parley.db")).expect("open db"));
    let users = UserRepository::new(db.clone(), CredentialStore::new(3).expect("credentials"));
    (users, MessageRepository::new(db))
}

// Two users, one message, seen from both ends.
#[test]
fn alice_messages_bob() {
    let dir = TempDir::new().unwrap();
    let (users, messages) = open(&dir);

    register(&users, "alice", "secret1", "Alice", "A", "555-0001");
    register(&users, "bob", "secret2", "Bob", "B", "555-0002");

    let sent = messages.create("alice", "bob", "hi").unwrap();

    let from = messages.messages_from("alice").unwrap();
    assert_eq!(from.len(), 1);
    assert_eq!(from[0].id, sent.id);
    assert_eq!(from[0].to_user.username, "bob");
    assert_eq!(from[0].to_user.first_name, "Bob");
    assert_eq!(from[0].to_user.last_name, "B");
    assert_eq!(from[0].to_user.phone, "555-0002");
    assert_eq!(from[0].body, "hi");
    assert!(from[0].read_at.is_none());

    let to = messages.messages_to("bob").unwrap();
    assert_eq!(to.len(), 1);
    assert_eq!(to[0].id, sent.id);
    assert_eq!(to[0].from_user.username, "alice");
    assert_eq!(to[0].from_user.phone, "555-0001");
    assert_eq!(to[0].body, "hi");
    assert!(to[0].read_at.is_none());

    assert!(users.authenticate("alice", "secret1").unwrap());
    assert!(!users.authenticate("alice", "wrong").unwrap());
    assert!(!users.authenticate("mallory", "secret1").unwrap());
}

// Every message lands in exactly one outbox and exactly one inbox.
#[test]
fn messages_partition_by_sender_and_recipient() {
    let dir = TempDir::new().unwrap();
    let (users, messages) = open(&dir);

    let names = ["alice", "bob", "carol", "dave"];
    for name in names {
        register(&users, name, "pw", name, "X", "555");
    }

    let mut sent = Vec::new();
    for (i, from) in names.iter().enumerate() {
        for (j, to) in names.iter().enumerate() {
            if i != j && (i + j) % 2 == 1 {
                let m = messages.create(from, to, &format!("{from}->{to}")).unwrap();
                sent.push((m.id, *from, *to));
            }
        }
    }

    for &(id, from, to) in &sent {
        for name in names {
            let outbox = messages.messages_from(name).unwrap();
            let inbox = messages.messages_to(name).unwrap();

            let out_hits = outbox.iter().filter(|m| m.id == id).count();
            let in_hits = inbox.iter().filter(|m| m.id == id).count();

            assert_eq!(out_hits, usize::from(name == from), "message {id} in outbox of {name}");
            assert_eq!(in_hits, usize::from(name == to), "message {id} in inbox of {name}");
        }
    }

    let total_out: usize = names.iter().map(|n| messages.messages_from(n).unwrap().len()).sum();
    let total_in: usize = names.iter().map(|n| messages.messages_to(n).unwrap().len()).sum();
    assert_eq!(total_out, sent.len());
    assert_eq!(total_in, sent.len());
}

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let (users, messages) = open(&dir);
        register(&users, "alice", "secret1", "Alice", "A", "555-0001");
        register(&users, "bob", "secret2", "Bob", "B", "555-0002");
        messages.create("bob", "alice", "still here?").unwrap();
    }

    let (users, messages) = open(&dir);
    assert_eq!(users.all().unwrap().len(), 2);
    assert!(users.authenticate("bob", "secret2").unwrap());
    assert_eq!(messages.messages_to("alice").unwrap()[0].body, "still here?");
}
