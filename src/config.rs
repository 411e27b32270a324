use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// How bearer tokens are verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// ES256 tokens checked against the project's JWKS endpoint.
    Supabase { project_ref: String, anon_key: String },
    /// HS256 tokens signed with a shared secret.
    SharedSecret(String),
}

/// Knobs for the read-validate-write cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Extra attempts after an optimistic write loses to a concurrent edit.
    pub max_conflict_retries: u32,
    /// Deadline for one service call, store round-trips included.
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
            request_timeout: Duration::from_millis(5000),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Everything the server needs at boot, read once and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub redis_url: Option<String>,
    pub auth: AuthConfig,
    pub port: u16,
    pub lifecycle: LifecycleSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key-value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth = match get("SUPABASE_URL") {
            Some(url) => AuthConfig::Supabase {
                project_ref: parse_project_ref(&url)?,
                anon_key: get("SUPABASE_ANON_KEY")
                    .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            },
            None => AuthConfig::SharedSecret(
                get("JWT_SECRET").ok_or(ConfigError::Missing("SUPABASE_URL or JWT_SECRET"))?,
            ),
        };

        let defaults = LifecycleSettings::default();
        let lifecycle = LifecycleSettings {
            max_conflict_retries: parse_or(
                "CONTRACT_MAX_RETRIES",
                get("CONTRACT_MAX_RETRIES"),
                defaults.max_conflict_retries,
            )?,
            request_timeout: Duration::from_millis(parse_or(
                "REQUEST_TIMEOUT_MS",
                get("REQUEST_TIMEOUT_MS"),
                defaults.request_timeout.as_millis() as u64,
            )?),
            cache_ttl: Duration::from_secs(parse_or(
                "CACHE_TTL_CONTRACT",
                get("CACHE_TTL_CONTRACT"),
                defaults.cache_ttl.as_secs(),
            )?),
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            run_migrations: parse_or("RUN_MIGRATIONS", get("RUN_MIGRATIONS"), false)?,
            redis_url: get("REDIS_URL"),
            auth,
            port: parse_or("PORT", get("PORT"), 8080)?,
            lifecycle,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// `https://PROJECT.supabase.co` → `PROJECT`.
fn parse_project_ref(url: &str) -> Result<String, ConfigError> {
    url.trim_end_matches('/')
        .strip_prefix("https://")
        .and_then(|s| s.strip_suffix(".supabase.co"))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Invalid {
            var: "SUPABASE_URL",
            reason: "expected https://PROJECT.supabase.co".to_string(),
        })
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_with_only_a_secret() {
        let cfg = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.auth, AuthConfig::SharedSecret("s3cret".to_string()));
        assert_eq!(cfg.port, 8080);
        assert!(cfg.database_url.is_none());
        assert!(!cfg.run_migrations);
        assert_eq!(cfg.lifecycle, LifecycleSettings::default());
    }

    #[test]
    fn supabase_url_selects_jwks_auth() {
        let cfg = config(&[
            ("SUPABASE_URL", "https://abcd.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("PORT", "9000"),
            ("CONTRACT_MAX_RETRIES", "5"),
        ])
        .unwrap();
        assert_eq!(
            cfg.auth,
            AuthConfig::Supabase {
                project_ref: "abcd".to_string(),
                anon_key: "anon".to_string(),
            }
        );
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.lifecycle.max_conflict_retries, 5);
    }

    #[test]
    fn missing_auth_is_an_error() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            config(&[("JWT_SECRET", "s"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("SUPABASE_URL", "http://example.com"), ("SUPABASE_ANON_KEY", "k")]),
            Err(ConfigError::Invalid { var: "SUPABASE_URL", .. })
        ));
    }
}
