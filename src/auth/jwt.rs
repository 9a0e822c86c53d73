use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;

/// Validity window of every issued session token.
pub const TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// HS256 signing and verification keys derived from the process secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + TimeDuration::seconds(TOKEN_TTL.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn sign_and_verify() {
        let keys = JwtKeys::from_secret("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        assert!(!token.is_empty());
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn expiry_is_seven_days_out() {
        let keys = JwtKeys::from_secret("dev-secret");
        let token = keys.sign(Uuid::new_v4()).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        let remaining = claims.exp as i64 - now();
        let week = 7 * 24 * 60 * 60;
        assert!(remaining <= week && remaining > week - 60, "remaining = {remaining}");
    }

    #[test]
    fn payload_has_only_subject_and_expiry() {
        let keys = JwtKeys::from_secret("dev-secret");
        let token = keys.sign(Uuid::new_v4()).expect("sign");
        let data = decode::<serde_json::Map<String, serde_json::Value>>(
            &token,
            &DecodingKey::from_secret(b"dev-secret"),
            &Validation::default(),
        )
        .expect("decode as map");
        let mut keys: Vec<_> = data.claims.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["exp".to_string(), "sub".to_string()]);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = JwtKeys::from_secret("one").sign(Uuid::new_v4()).unwrap();
        assert!(JwtKeys::from_secret("two").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: (now() - 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert!(JwtKeys::from_secret("dev-secret").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(JwtKeys::from_secret("dev-secret").verify("not.a.jwt").is_err());
    }
}
