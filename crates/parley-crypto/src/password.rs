use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::debug;

use crate::CryptoError;

pub const MIN_WORK_FACTOR: u32 = 3;
pub const MAX_WORK_FACTOR: u32 = 22;
pub const DEFAULT_WORK_FACTOR: u32 = 14;

/// Argon2 passes over memory. Cost is tuned through memory, not passes.
const TIME_COST: u32 = 2;

/// Hashes and verifies passwords with Argon2id.
///
/// The work factor is the base-2 log of the memory cost in KiB, so each
/// step doubles the work per hash. Stored hashes embed their own salt and
/// parameters, which means raising the factor later does not invalidate
/// existing hashes.
#[derive(Clone)]
pub struct CredentialStore {
    argon2: Argon2<'static>,
    /// Verified against when there is no real hash, so a missing user
    /// costs the same as a wrong password.
    decoy: String,
}

impl CredentialStore {
    pub fn new(work_factor: u32) -> Result<Self, CryptoError> {
        if !(MIN_WORK_FACTOR..=MAX_WORK_FACTOR).contains(&work_factor) {
            return Err(CryptoError::WorkFactor(work_factor));
        }

        let params = Params::new(1 << work_factor, TIME_COST, 1, None)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut store = Self {
            argon2,
            decoy: String::new(),
        };
        store.decoy = store.hash("parley-decoy-credential")?;

        debug!("Credential store ready (work factor {})", work_factor);
        Ok(store)
    }

    /// Produce a self-salted PHC string for `plaintext`.
    pub fn hash(&self, plaintext: &str) -> Result<String, CryptoError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// Never fails: an absent or malformed hash is just `false`.
    pub fn verify(&self, plaintext: &str, hash: Option<&str>) -> bool {
        match hash.and_then(|h| PasswordHash::new(h).ok()) {
            Some(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            None => {
                if let Ok(decoy) = PasswordHash::new(&self.decoy) {
                    let _ = self.argon2.verify_password(plaintext.as_bytes(), &decoy);
                }
                false
            }
        }
    }
}
