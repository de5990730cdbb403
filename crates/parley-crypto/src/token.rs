use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use parley_types::api::Claims;

use crate::CryptoError;

/// Signs and checks HS256 bearer tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Result<Self, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::EmptySecret);
        }

        // Tokens carry no expiry, so `exp` is neither required nor checked.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, CryptoError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Issue a token naming `username`, stamped with the current time.
    pub fn issue_for(&self, username: &str) -> Result<String, CryptoError> {
        self.issue(&Claims {
            username: username.to_string(),
            iat: chrono::Utc::now().timestamp(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, CryptoError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
