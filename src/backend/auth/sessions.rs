/**
 * Session Tokens
 *
 * HS256 bearer token verification. The auth service writes the user id into
 * `sub` as a JSON number; older tokens carry it as a string, so both are
 * accepted.
 */

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::shared::chat::UserId;

/// Subject claim, numeric or string encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Id(UserId),
    Text(String),
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Subject,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,
}

impl Claims {
    /// The user id carried by the token
    pub fn user_id(&self) -> Result<UserId, BackendError> {
        match &self.sub {
            Subject::Id(id) => Ok(*id),
            Subject::Text(text) => text
                .parse()
                .map_err(|_| BackendError::unauthorized("invalid subject in token")),
        }
    }
}

/// Verify and decode a JWT token
///
/// # Arguments
/// * `secret` - HMAC secret shared with the auth service
/// * `token` - JWT token string
///
/// # Returns
/// Decoded claims or error
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}
