use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::JwtConfig;

/// Signs and verifies bearer tokens whose payload is supplied by the caller.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: i64,
}

/// Decoded token: the caller's payload plus the timestamps we add.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// Identity asserted by the token, taken from the payload's `email`.
    pub fn subject(&self) -> Option<&str> {
        self.payload.get("email").and_then(Value::as_str)
    }
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.is_empty() {
            return Err(anyhow::anyhow!("JWT secret must not be empty"));
        }
        if config.expiry_seconds <= 0 {
            return Err(anyhow::anyhow!(
                "JWT expiry must be positive, got {} seconds",
                config.expiry_seconds
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            expiry_seconds: config.expiry_seconds,
        })
    }

    /// Sign `payload` (which must be a JSON object) with the standard expiry.
    pub fn issue(&self, payload: Value) -> Result<String, anyhow::Error> {
        self.issue_with_expiry(payload, Duration::seconds(self.expiry_seconds))
    }

    fn issue_with_expiry(&self, payload: Value, ttl: Duration) -> Result<String, anyhow::Error> {
        let Value::Object(mut payload) = payload else {
            return Err(anyhow::anyhow!("Token payload must be a JSON object"));
        };
        // Ours to set; a caller-supplied exp would otherwise serialize twice.
        payload.remove("iat");
        payload.remove("exp");

        let now = Utc::now();
        let claims = TokenClaims {
            payload,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
    }

    /// Check signature and expiry and return the decoded claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: secret.to_string(),
            expiry_seconds: 3600,
        })
        .unwrap()
    }

    #[test]
    fn issue_then_verify_returns_payload() {
        let tokens = service("top-secret");
        let token = tokens
            .issue(json!({ "email": "u@e.com", "name": "Nolan" }))
            .unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.subject(), Some("u@e.com"));
        assert_eq!(claims.payload["name"], "Nolan");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = service("secret-a").issue(json!({ "email": "u@e.com" })).unwrap();
        assert!(service("secret-b").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let tokens = service("top-secret");
        let token = tokens
            .issue_with_expiry(json!({ "email": "u@e.com" }), Duration::seconds(-120))
            .unwrap();

        let err = tokens.verify(&token).unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(service("top-secret").verify("not.a.token").is_err());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(service("top-secret").issue(json!(["u@e.com"])).is_err());
    }

    #[test]
    fn caller_cannot_extend_expiry() {
        let tokens = service("top-secret");
        let token = tokens
            .issue(json!({ "email": "u@e.com", "exp": 9_999_999_999i64 }))
            .unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.payload.contains_key("exp"));
    }

    #[test]
    fn subject_absent_without_email() {
        let tokens = service("top-secret");
        let token = tokens.issue(json!({ "name": "Nolan" })).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().subject(), None);
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(TokenService::new(&JwtConfig {
            secret: String::new(),
            expiry_seconds: 3600,
        })
        .is_err());
    }

    #[test]
    fn non_positive_expiry_is_rejected() {
        for expiry_seconds in [0, -60] {
            assert!(TokenService::new(&JwtConfig {
                secret: "top-secret".to_string(),
                expiry_seconds,
            })
            .is_err());
        }
    }
}
