///! Integration test for JWT auth validation.
///!
///! This test mints a JWT locally using the same HS256 secret that the server
///! would use, then validates it through `validate_with_secret` and the
///! `TokenVerifier`. No running server or database is needed.
///!
///! Run with: `cargo test --test auth_test`
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use contract_lifecycle::auth::jwt::{Claims, validate_with_secret};
use contract_lifecycle::auth::{AuthError, TokenVerifier};

/// A fake secret for testing — never use the real one in tests committed to git.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn claims_for(sub: &str, email: Option<&str>, exp_offset: i64) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: sub.to_string(),
        exp: (now + exp_offset) as usize,
        iat: Some(now as usize),
        iss: Some("https://example.supabase.co/auth/v1".to_string()),
        email: email.map(str::to_string),
        role: Some("authenticated".to_string()),
    }
}

/// Helper: mint a JWT signed with HS256 using the test secret.
fn mint(claims: &Claims) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

fn token_error_kind(err: &AuthError) -> Option<&ErrorKind> {
    match err {
        AuthError::InvalidToken(e) => Some(e.kind()),
        _ => None,
    }
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = mint(&claims_for(&user_id.to_string(), Some("alice@example.com"), 3600));

    let claims = validate_with_secret(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
    assert_eq!(claims.user_id().unwrap(), user_id);
}

#[test]
fn test_expired_token_is_rejected() {
    // Expired 5 minutes ago, well past the 60s default leeway.
    let token = mint(&claims_for(&Uuid::new_v4().to_string(), None, -300));

    let err = validate_with_secret(&token, TEST_SECRET).unwrap_err();
    assert!(matches!(token_error_kind(&err), Some(ErrorKind::ExpiredSignature)));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = mint(&claims_for(&Uuid::new_v4().to_string(), None, 3600));

    let err =
        validate_with_secret(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx").unwrap_err();
    assert!(matches!(token_error_kind(&err), Some(ErrorKind::InvalidSignature)));
}

#[test]
fn test_garbage_token_is_rejected() {
    let result = validate_with_secret("not.a.valid.jwt", TEST_SECRET);
    assert!(matches!(result, Err(AuthError::InvalidToken(_))));
}

#[test]
fn test_non_uuid_subject_is_rejected() {
    let token = mint(&claims_for("service-account", None, 3600));

    let claims = validate_with_secret(&token, TEST_SECRET).expect("signature is fine");
    assert!(matches!(claims.user_id(), Err(AuthError::InvalidSubject(_))));
}

#[tokio::test]
async fn test_shared_secret_verifier() {
    let verifier = TokenVerifier::SharedSecret(Arc::from(TEST_SECRET));
    let user_id = Uuid::new_v4();
    let token = mint(&claims_for(&user_id.to_string(), None, 3600));

    let claims = verifier.verify(&token).await.expect("Token should be valid");
    assert_eq!(claims.user_id().unwrap(), user_id);

    assert!(verifier.verify("garbage").await.is_err());
}
