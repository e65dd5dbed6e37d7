use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MAX_ACCESS_TOKEN_MINUTES;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub adm: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, is_admin: bool, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            adm: is_admin,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ttl_minutes.clamp(1, MAX_ACCESS_TOKEN_MINUTES)))
                .timestamp(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_keeps_identity() {
        let id = Uuid::now_v7();
        let token = encode_token(&Claims::new(id, true, 30), "secret").unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.adm);
        assert!(claims.expires_at() > Utc::now());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token(&Claims::new(Uuid::now_v7(), false, 30), "secret").unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(Uuid::now_v7(), false, 30);
        claims.exp = (Utc::now() - Duration::minutes(5)).timestamp();
        let token = encode_token(&claims, "secret").unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn oversized_lifetime_is_capped() {
        let claims = Claims::new(Uuid::now_v7(), false, i64::MAX);
        let cap = Utc::now() + Duration::minutes(MAX_ACCESS_TOKEN_MINUTES);
        assert!(claims.expires_at() <= cap);
    }
}
