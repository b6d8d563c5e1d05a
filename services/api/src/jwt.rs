//! JWT service for session credential issuance and validation
//!
//! Credentials are HS256 tokens carrying the user's email and an expiry.
//! They are stateless: logging out only clears the client's cookie, there is
//! no server-side revocation list.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default credential validity: 10 hours
pub const DEFAULT_TOKEN_EXPIRY_SECS: u64 = 10 * 60 * 60;

/// Token service errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// Missing, malformed, expired, or wrongly signed credential
    #[error("Invalid credential")]
    InvalidCredential,

    /// The credential could not be signed
    #[error("Failed to sign credential: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The service is misconfigured
    #[error("JWT configuration error: {0}")]
    Configuration(String),
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Token validity in seconds (default: 10 hours)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Secret used to sign tokens (required)
    /// - `JWT_EXPIRY`: Token validity in seconds (default: 36000)
    pub fn from_env() -> Result<Self, TokenError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| {
            TokenError::Configuration("JWT_SECRET environment variable not set".to_string())
        })?;

        let token_expiry = std::env::var("JWT_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY_SECS);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// Identity a credential is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub email: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Issues and verifies session credentials
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: u64,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::Configuration(
                "JWT secret must not be empty".to_string(),
            ));
        }

        let expiry_fits = i64::try_from(config.token_expiry)
            .ok()
            .and_then(|expiry| Utc::now().timestamp().checked_add(expiry))
            .is_some();
        if !expiry_fits {
            return Err(TokenError::Configuration(format!(
                "token expiry of {} seconds is out of range",
                config.token_expiry
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(TokenService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            token_expiry: config.token_expiry,
        })
    }

    /// Issue a credential for an identity, valid from now
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a credential as if it had been issued at `issued_at`
    pub(crate) fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let overflow = || TokenError::Configuration("credential expiry overflows".to_string());
        let exp = i64::try_from(self.token_expiry)
            .ok()
            .and_then(|expiry| iat.checked_add(expiry))
            .ok_or_else(overflow)?;
        let claims = Claims {
            email: identity.email.clone(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify a credential and return the identity it is bound to
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        if token.is_empty() {
            return Err(TokenError::InvalidCredential);
        }

        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation);
        let token_data = decoded.map_err(|e| {
            tracing::debug!("Credential rejected: {}", e);
            TokenError::InvalidCredential
        })?;

        Ok(Identity {
            email: token_data.claims.email,
        })
    }

    /// Get the token expiry time in seconds
    pub fn token_expiry(&self) -> u64 {
        self.token_expiry
    }
}
