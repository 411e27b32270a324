pub mod authorization;
pub mod jwks;
pub mod jwt;
pub mod middleware;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::sync::Arc;

use crate::config::AuthConfig;
use jwks::JwksCache;
use jwt::Claims;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must be: Bearer <token>")]
    MalformedHeader,

    #[error("Failed to fetch JWKS: {0}")]
    Jwks(String),

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid UUID in sub claim: {0}")]
    InvalidSubject(#[from] uuid::Error),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(serde_json::json!({
            "error": self.to_string(),
            "code": "UNAUTHORIZED",
        }))
    }
}

/// Verifies bearer tokens; stored in actix app data for the extractor.
#[derive(Clone)]
pub enum TokenVerifier {
    /// Supabase ES256 keys fetched from the project's JWKS endpoint.
    Jwks(Arc<JwksCache>),
    /// HS256 with a shared secret.
    SharedSecret(Arc<str>),
}

impl TokenVerifier {
    pub fn from_config(auth: &AuthConfig) -> Self {
        match auth {
            AuthConfig::Supabase {
                project_ref,
                anon_key,
            } => TokenVerifier::Jwks(Arc::new(JwksCache::new(project_ref, anon_key))),
            AuthConfig::SharedSecret(secret) => {
                TokenVerifier::SharedSecret(Arc::from(secret.as_str()))
            }
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        match self {
            TokenVerifier::Jwks(cache) => jwt::validate_token(token, cache).await,
            TokenVerifier::SharedSecret(secret) => jwt::validate_with_secret(token, secret),
        }
    }
}
