use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, bail};
use axum::http::HeaderMap;
use axum_extra::headers::{
    Authorization, HeaderMapExt,
    authorization::{Basic, Bearer},
};
use jsonwebtoken::DecodingKey;
use tracing::{debug, info};

use crate::config::{AuthConfig, AuthMode};
use crate::error::AppError;
use crate::utils::{hash, jwt};

/// Resolves the caller's email from request headers.
///
/// One strategy is chosen at startup; requests using the other scheme are
/// rejected.
#[derive(Clone)]
pub enum Authenticator {
    /// HTTP Basic against an `email -> argon2 PHC` table.
    Basic { users: HashMap<String, String> },
    /// HS256 bearer tokens carrying an `email` claim.
    Jwt { key: DecodingKey },
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        match config.mode {
            AuthMode::Basic => {
                let path = config
                    .htpasswd
                    .as_deref()
                    .context("auth.htpasswd is required in basic mode")?;
                let users = load_htpasswd(path)?;
                info!(path = %path.display(), users = users.len(), "Loaded basic auth users");
                Ok(Self::Basic { users })
            }
            AuthMode::Jwt => {
                let secret = config
                    .jwt_secret
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .context("auth.jwt_secret is required in jwt mode")?;
                Ok(Self::jwt(secret.as_bytes()))
            }
        }
    }

    pub fn basic(users: HashMap<String, String>) -> Self {
        Self::Basic { users }
    }

    pub fn jwt(secret: &[u8]) -> Self {
        Self::Jwt {
            key: DecodingKey::from_secret(secret),
        }
    }

    /// Return the authenticated email, or `Unauthorized`.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<String, AppError> {
        match self {
            Self::Basic { users } => {
                let credentials = headers
                    .typed_get::<Authorization<Basic>>()
                    .ok_or(AppError::Unauthorized)?;
                let email = credentials.username().to_string();
                let known = users.contains_key(&email);
                let phc = users
                    .get(&email)
                    .map_or(hash::UNKNOWN_USER_PHC, String::as_str)
                    .to_string();

                let password = credentials.password().to_string();
                let verified =
                    tokio::task::spawn_blocking(move || hash::verify_password(&password, &phc))
                        .await
                        .map_err(|e| {
                            AppError::Internal(format!("Password verification task failed: {e}"))
                        })?;
                if !known {
                    debug!(email, "Unknown basic auth user");
                    return Err(AppError::Unauthorized);
                }
                if !verified {
                    debug!(email, "Rejected basic credentials");
                    return Err(AppError::Unauthorized);
                }
                Ok(email)
            }
            Self::Jwt { key } => {
                let bearer = headers
                    .typed_get::<Authorization<Bearer>>()
                    .ok_or(AppError::Unauthorized)?;
                let claims = jwt::verify(bearer.token(), key).map_err(|e| {
                    debug!(error = %e, "Rejected bearer token");
                    AppError::Unauthorized
                })?;
                Ok(claims.email)
            }
        }
    }
}

fn load_htpasswd(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read htpasswd file {}", path.display()))?;
    parse_htpasswd(&contents)
}

/// Parse `email:<argon2 PHC>` lines. Blank lines and `#` comments are skipped.
pub fn parse_htpasswd(contents: &str) -> anyhow::Result<HashMap<String, String>> {
    let mut users = HashMap::new();
    for (n, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((email, phc)) = line.split_once(':') else {
            bail!("htpasswd line {} has no ':' separator", n + 1);
        };
        if email.is_empty() || !phc.starts_with("$argon2") {
            bail!("htpasswd line {} is not an argon2 entry", n + 1);
        }
        users.insert(email.to_string(), phc.to_string());
    }
    Ok(users)
}
