use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error,
};
use serde::{Deserialize, Serialize};

/// JWT claims. Only `email` identifies the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: usize, // Expiration timestamp
}

/// Sign an HS256 token for `email`, valid for `ttl`.
pub fn sign(email: &str, secret: &[u8], ttl: Duration) -> Result<String, Error> {
    let claims = Claims {
        email: email.to_owned(),
        exp: (Utc::now() + ttl).timestamp().max(0) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Verify and decode an HS256 token.
pub fn verify(token: &str, key: &DecodingKey) -> Result<Claims, Error> {
    let token_data = decode::<Claims>(token, key, &Validation::new(Algorithm::HS256))?;
    Ok(token_data.claims)
}
