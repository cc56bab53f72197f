use crate::errors::{ServiceError, ServiceResult};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the identity provider's ID token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
}

impl IdentityClaims {
    pub fn uid(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.sub.as_deref())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

/// Reads the claims of an ID token without checking its signature.
///
/// The token comes straight from the provider over TLS and is only used to
/// learn when the session expires; the provider remains the verifier.
pub fn decode_claims(token: &str) -> ServiceResult<IdentityClaims> {
    let header = decode_header(token)
        .map_err(|e| ServiceError::Authentication(format!("Malformed identity token: {}", e)))?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<IdentityClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ServiceError::Authentication(format!("Unreadable identity token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_decode_claims_without_key() {
        let claims = IdentityClaims {
            sub: Some("uid-123".to_string()),
            email: Some("ana@farmup.com".to_string()),
            exp: Some(1_900_000_000),
            ..Default::default()
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"provider-secret"),
        )
        .unwrap();

        let decoded = decode_claims(&token).unwrap();
        assert_eq!(decoded.uid(), Some("uid-123"));
        assert_eq!(decoded.email.as_deref(), Some("ana@farmup.com"));
        assert_eq!(decoded.expires_at().unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_user_id_takes_precedence() {
        let claims = IdentityClaims {
            sub: Some("sub".to_string()),
            user_id: Some("user".to_string()),
            ..Default::default()
        };
        assert_eq!(claims.uid(), Some("user"));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            decode_claims("not-a-token"),
            Err(ServiceError::Authentication(_))
        ));
    }
}
