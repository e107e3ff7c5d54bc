//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mohali_db::UserRole;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
///
/// Every field is required; a token missing any of them, or carrying a role
/// outside [`UserRole`], fails to decode and is rejected as a whole.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Contact email address
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager with an expiry expressed in hours
    pub fn new(secret: &str, token_expiry_hours: i64) -> Result<Self, AuthError> {
        let token_ttl =
            Duration::try_hours(token_expiry_hours).ok_or(AuthError::InvalidTokenLifetime)?;
        Self::with_ttl(secret, token_ttl)
    }

    /// Create a new JWT manager with an arbitrary token lifetime
    ///
    /// A lifetime whose expiry cannot be represented is refused here rather
    /// than at issue time.
    pub fn with_ttl(secret: &str, token_ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        if Utc::now().checked_add_signed(token_ttl).is_none() {
            return Err(AuthError::InvalidTokenLifetime);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is invalid the second after `exp`
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
        })
    }

    /// Lifetime of issued tokens in seconds
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl.num_seconds()
    }

    /// Generate a JWT token for a user
    pub fn generate_token(
        &self,
        user_id: &str,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        if user_id.is_empty() {
            return Err(AuthError::InvalidClaims("subject id is empty".to_string()));
        }
        if email.is_empty() {
            return Err(AuthError::InvalidClaims("email is empty".to_string()));
        }

        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.token_ttl)
            .ok_or(AuthError::InvalidTokenLifetime)?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Generating token for user: {}", email);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Jwt)
    }

    /// Validate a JWT token and return claims
    ///
    /// Any malformed, tampered or foreign token yields `InvalidToken`; a
    /// correctly signed token past its expiry yields `TokenExpired`.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("Token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;
        let claims = token_data.claims;

        // Check expiration
        let now = Utc::now().timestamp();
        if claims.exp < now {
            return Err(AuthError::TokenExpired);
        }

        if claims.sub.is_empty() || claims.email.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
