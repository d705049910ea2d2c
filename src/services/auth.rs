//! Identity tokens: issuing and validating the HS256 ID tokens that carry a
//! principal from the identity provider to the dashboard.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::principal::Principal;

/// Issuer claim expected on every ID token.
pub const TOKEN_ISSUER: &str = "rmdn-identity";

/// Default lifetime of an issued ID token (30 days, one Ramadan).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid identity token")]
    InvalidToken,

    #[error("No identity token available")]
    MissingToken,

    #[error("Token generation failed: {0}")]
    Encoding(String),
}

/// JWT claims embedded in an ID token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            uid: claims.sub,
            display_name: claims.name,
            email: claims.email,
        }
    }
}

/// Sign an ID token for `principal`.
pub fn issue_id_token(
    principal: &Principal,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: principal.uid.clone(),
        iss: TOKEN_ISSUER.to_string(),
        name: principal.display_name.clone(),
        email: principal.email.clone(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encoding(e.to_string()))
}

/// Validate an ID token and return its claims.
pub fn validate_id_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Identity token rejected");
            AuthError::InvalidToken
        })
}
