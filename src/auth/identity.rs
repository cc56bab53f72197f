use crate::auth::token;
use crate::errors::{DomainError, ServiceError, ServiceResult, ValidationError};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A signed-in identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentitySession {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl IdentitySession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |exp| exp <= now)
    }
}

/// Account created by the provider on behalf of an administrator.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityAccount {
    pub uid: String,
    pub email: String,
}

/// Managed identity service consumed by the console.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<IdentitySession>;

    async fn sign_out(&self, session: &IdentitySession) -> ServiceResult<()>;

    /// Creates an account with the given password without signing in as it.
    async fn create_account(&self, email: &str, password: &str) -> ServiceResult<IdentityAccount>;

    /// Sends the provider's password-reset email.
    async fn send_password_reset(&self, email: &str) -> ServiceResult<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps the provider's error codes onto the console's error taxonomy.
fn map_provider_error(code: &str) -> ServiceError {
    // codes may carry a suffix such as "WEAK_PASSWORD : Password should be..."
    let code = code.split(" : ").next().unwrap_or(code).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            ServiceError::Authentication("Invalid email or password".to_string())
        }
        "USER_DISABLED" => ServiceError::Authentication("Account is disabled".to_string()),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            ServiceError::Authentication("Too many attempts, try again later".to_string())
        }
        "EMAIL_EXISTS" => ServiceError::Domain(DomainError::Validation(
            ValidationError::invalid_value("email", "is already in use"),
        )),
        "INVALID_EMAIL" => ServiceError::Domain(DomainError::Validation(ValidationError::format(
            "email",
            "must be a valid email address",
        ))),
        "WEAK_PASSWORD" => ServiceError::Configuration(
            "Temporary password rejected by the identity provider".to_string(),
        ),
        other => ServiceError::ExternalService(format!("Identity provider error: {}", other)),
    }
}

/// REST client for the managed identity service.
pub struct RestIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestIdentityProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.base_url,
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> ServiceResult<R>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        debug!("Calling identity provider method {}", method);
        let response = self
            .client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Identity provider request {} failed: {}", method, e);
                ServiceError::ExternalService(format!("Identity provider unreachable: {}", e))
            })?;

        if response.status().is_success() {
            response.json::<R>().await.map_err(|e| {
                ServiceError::ExternalService(format!("Failed to parse identity response: {}", e))
            })
        } else {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to get error details".to_string());
            match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => Err(map_provider_error(&envelope.error.message)),
                Err(_) => Err(ServiceError::ExternalService(format!(
                    "Identity provider returned {}: {}",
                    status, text
                ))),
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<IdentitySession> {
        let response: SignInResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        // prefer the token's own expiry, fall back to expiresIn
        let expires_at = token::decode_claims(&response.id_token)
            .ok()
            .and_then(|claims| claims.expires_at())
            .or_else(|| {
                response
                    .expires_in
                    .as_deref()
                    .and_then(|s| s.parse::<i64>().ok())
                    .map(|secs| Utc::now() + ChronoDuration::seconds(secs))
            });

        Ok(IdentitySession {
            uid: response.local_id,
            email: response.email.or_else(|| Some(email.to_string())),
            display_name: response.display_name.filter(|n| !n.trim().is_empty()),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at,
        })
    }

    async fn sign_out(&self, session: &IdentitySession) -> ServiceResult<()> {
        // tokens are stateless; dropping them locally ends the session
        debug!("Signing out identity {}", session.uid);
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str) -> ServiceResult<IdentityAccount> {
        let response: SignUpResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: false,
                },
            )
            .await?;

        Ok(IdentityAccount {
            uid: response.local_id,
            email: response.email.unwrap_or_else(|| email.to_string()),
        })
    }

    async fn send_password_reset(&self, email: &str) -> ServiceResult<()> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_mapping() {
        assert!(matches!(
            map_provider_error("INVALID_LOGIN_CREDENTIALS"),
            ServiceError::Authentication(_)
        ));
        assert!(map_provider_error("EMAIL_EXISTS").is_validation());
        assert!(matches!(
            map_provider_error("WEAK_PASSWORD : Password should be at least 6 characters"),
            ServiceError::Configuration(_)
        ));
        assert!(matches!(
            map_provider_error("QUOTA_EXCEEDED"),
            ServiceError::ExternalService(_)
        ));
    }

    #[test]
    fn test_endpoint_encodes_key() {
        let provider = RestIdentityProvider::new("https://identity.example/v1/", "a key");
        assert_eq!(
            provider.endpoint("signUp"),
            "https://identity.example/v1/accounts:signUp?key=a%20key"
        );
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let mut session = IdentitySession {
            uid: "u1".to_string(),
            email: None,
            display_name: None,
            id_token: String::new(),
            refresh_token: None,
            expires_at: None,
        };
        assert!(!session.is_expired(now));
        session.expires_at = Some(now - ChronoDuration::seconds(1));
        assert!(session.is_expired(now));
    }
}
