use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use uuid::Uuid;

use crate::{error::AuthError, models::Claims};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_access_token(
    company_id: &str,
    company_name: &str,
    secret: &str,
    ttl: usize,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = now();
    let claims = Claims {
        sub: company_id.to_string(),
        company_name: company_name.to_string(),
        exp: issued_at + ttl,
        iat: issued_at,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_claims() {
        let token = generate_access_token("demo-company", "デモ会社", SECRET, 3600).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "demo-company");
        assert_eq!(claims.company_name, "デモ会社");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let claims = Claims {
            sub: "demo-company".into(),
            company_name: "デモ会社".into(),
            exp: now() - 3600,
            iat: now() - 7200,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verify_token(&token, SECRET).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn wrong_secret_or_garbage_is_malformed() {
        let token = generate_access_token("demo-company", "デモ会社", SECRET, 3600).unwrap();
        assert_eq!(
            verify_token(&token, "other-secret").unwrap_err(),
            AuthError::Malformed
        );
        assert_eq!(
            verify_token("not.a.jwt", SECRET).unwrap_err(),
            AuthError::Malformed
        );
    }
}
