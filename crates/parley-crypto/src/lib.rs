//! Parley Crypto Library
//!
//! Password hashing (Argon2id, per-record salt, tunable memory cost) and
//! HS256 bearer tokens. Both are built once from startup configuration and
//! shared read-only afterwards.

pub mod password;
pub mod token;

pub use password::CredentialStore;
pub use token::TokenIssuer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("invalid work factor {0}: expected a value in 3..=22")]
    WorkFactor(u32),

    #[error("token signing secret is empty")]
    EmptySecret,

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
