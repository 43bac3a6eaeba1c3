use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtKeyConfig;
use crate::database::UserId;

/// Identity payload carried by an issuer-signed bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "userId", alias = "UserId")]
    pub user_id: UserId,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("invalid verification key: {0}")]
    InvalidKey(String),

    #[error("user id {0} is outside the storable range")]
    UserIdOutOfRange(UserId),
}

/// Largest user id the store can hold (BIGINT).
const MAX_USER_ID: UserId = i64::MAX as UserId;

/// Resolves a bearer credential into the caller's claims.
pub trait IdentityVerifier: Send + Sync + 'static {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// [`IdentityVerifier`] backed by `jsonwebtoken`. Tokens are only issued
/// elsewhere; this side holds verification material only.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn from_config(config: &JwtKeyConfig) -> Result<Self, AuthError> {
        match config {
            JwtKeyConfig::PublicKey { pem, algorithm } => Self::from_public_key_pem(pem, *algorithm),
            JwtKeyConfig::Secret(secret) => Ok(Self::from_secret(secret.as_bytes())),
        }
    }

    /// Verify with the issuer's PEM public key. Literal `\n` sequences, as
    /// found in single-line environment values, are turned into newlines.
    pub fn from_public_key_pem(pem: &str, algorithm: Algorithm) -> Result<Self, AuthError> {
        let pem = pem.replace("\\n", "\n");
        let bytes = pem.as_bytes();

        let key = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(bytes),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes),
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                return Err(AuthError::InvalidKey(format!(
                    "{:?} is a shared-secret algorithm; use JWT_SECRET",
                    algorithm
                )))
            }
        }
        .map_err(|e| AuthError::InvalidKey(e.to_string()))?;

        Ok(Self {
            key,
            validation: Validation::new(algorithm),
        })
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation)?;
        if token_data.claims.user_id > MAX_USER_ID {
            return Err(AuthError::UserIdOutOfRange(token_data.claims.user_id));
        }
        Ok(token_data.claims)
    }
}
