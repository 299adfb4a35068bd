use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Self-contained bearer credential: minted at login and at password-reset
/// request, never persisted server-side.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub exp: usize,
}

pub fn create_token(
    user_id: i32,
    username: &str,
    role: &str,
    ttl_secs: i64,
    secret: &str,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(ttl_secs))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Check signature and expiration. Callers that care about the reason
/// (expired vs. malformed) inspect the error kind.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    const SECRET: &str = "test-secret";

    #[test]
    fn roundtrip_preserves_identity() {
        let token = create_token(42, "ayse", "supplier", 7200, SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "ayse");
        assert_eq!(claims.role, "supplier");
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s validation leeway.
        let token = create_token(1, "u", "customer", -3600, SECRET).unwrap();
        let err = decode_token(&token, SECRET).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(1, "u", "customer", 7200, SECRET).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }
}
