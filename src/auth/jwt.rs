use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use super::jwks::JwksCache;

/// Supabase JWT claims.
///
/// The `sub` field is the user's UUID in `auth.users`; that id is what
/// `owner_id` and `client_id` on a contract refer to.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The Supabase auth user UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// Supabase role (e.g. "authenticated").
    pub role: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Ok(Uuid::parse_str(&self.sub)?)
    }
}

/// Validate an ES256/ES384 token against the project's JWKS.
pub async fn validate_token(token: &str, jwks_cache: &JwksCache) -> Result<Claims, AuthError> {
    jwks_cache.validate_token(token).await.map(|td| td.claims)
}

/// Validate an HS256 token signed with the project's shared JWT secret.
pub fn validate_with_secret(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
