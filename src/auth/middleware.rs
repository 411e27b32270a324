use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::auth::{AuthError, TokenVerifier};

/// Who is calling, as established by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
}

pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or(AuthError::MissingHeader)?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(AuthError::MalformedHeader)?;

            // 2. Get the verifier from app data.
            let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Token verifier not configured")
            })?;

            // 3. Validate and read the subject.
            let claims = verifier.verify(token).await?;
            let id = claims.user_id()?;

            Ok(AuthenticatedUser(Identity {
                id,
                email: claims.email,
            }))
        })
    }
}
