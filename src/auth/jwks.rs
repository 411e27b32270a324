use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation, decode, decode_header};
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

use super::AuthError;
use super::jwt::Claims;

const JWKS_URL_TEMPLATE: &str = "https://{}.supabase.co/auth/v1/.well-known/jwks.json";

#[derive(Clone)]
struct JwksKeyData {
    x: String,
    y: String,
    algorithm: Algorithm,
}

/// EC public keys by `kid`, refetched at most once an hour.
#[derive(Clone)]
pub struct JwksCache {
    cache: Arc<Cache<String, JwksKeyData>>,
    jwks_url: String,
    client: reqwest::Client,
    anon_key: String,
}

impl JwksCache {
    pub fn new(project_ref: &str, anon_key: &str) -> Self {
        let client = reqwest::Client::new();
        let cache = Arc::new(
            Cache::builder()
                .time_to_live(std::time::Duration::from_secs(3600))
                .max_capacity(10)
                .build(),
        );

        let jwks_url = JWKS_URL_TEMPLATE.replace("{}", project_ref);

        Self {
            cache,
            jwks_url,
            client,
            anon_key: anon_key.to_string(),
        }
    }

    async fn fetch_jwks(&self) -> Result<serde_json::Value, AuthError> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AuthError::Jwks(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Jwks(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Jwks(format!("Failed to parse JWKS JSON: {e}")))
    }

    async fn get_key_data(&self, kid: &str) -> Result<JwksKeyData, AuthError> {
        if let Some(cached) = self.cache.get(kid).await {
            return Ok(cached);
        }

        let jwks = self.fetch_jwks().await?;
        let keys = jwks["keys"]
            .as_array()
            .ok_or_else(|| AuthError::Jwks("No keys in JWKS".to_string()))?;

        let key_data = keys
            .iter()
            .find(|k| k["kid"].as_str() == Some(kid))
            .ok_or_else(|| AuthError::Jwks(format!("Key with kid={kid} not found in JWKS")))?;

        let component = |name: &str| {
            key_data[name]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| AuthError::Jwks(format!("Missing '{name}' in JWK")))
        };
        let x = component("x")?;
        let y = component("y")?;

        let algorithm = match key_data["alg"].as_str() {
            Some("ES384") => Algorithm::ES384,
            _ => Algorithm::ES256,
        };

        let key_data = JwksKeyData { x, y, algorithm };

        self.cache.insert(kid.to_string(), key_data.clone()).await;
        Ok(key_data)
    }

    pub async fn validate_token(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::Jwks("No 'kid' in token header".to_string()))?;

        let key_data = self.get_key_data(&kid).await?;
        let decoding_key = DecodingKey::from_ec_components(&key_data.x, &key_data.y)?;

        let mut validation = Validation::new(key_data.algorithm);
        validation.validate_aud = false;

        Ok(decode::<Claims>(token, &decoding_key, &validation)?)
    }
}
