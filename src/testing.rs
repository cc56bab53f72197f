//! Test doubles shared by the service tests.

use crate::auth::identity::{IdentityAccount, IdentityProvider, IdentitySession};
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct FakeState {
    accounts: HashMap<String, (String, String)>,
    reset_requests: Vec<String>,
    sign_ins: usize,
    sign_outs: usize,
    fail_create_account: bool,
    fail_password_reset: bool,
    fail_sign_out: bool,
}

/// In-memory identity provider with switchable failures.
#[derive(Default)]
pub struct FakeIdentityProvider {
    state: Mutex<FakeState>,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account directly and returns its uid.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let uid = format!("auth-{}", Uuid::new_v4().simple());
        self.state
            .lock()
            .await
            .accounts
            .insert(email.to_string(), (uid.clone(), password.to_string()));
        uid
    }

    pub async fn has_account(&self, email: &str) -> bool {
        self.state.lock().await.accounts.contains_key(email)
    }

    pub async fn password_of(&self, email: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .accounts
            .get(email)
            .map(|(_, password)| password.clone())
    }

    pub async fn reset_requests(&self) -> Vec<String> {
        self.state.lock().await.reset_requests.clone()
    }

    pub async fn sign_in_count(&self) -> usize {
        self.state.lock().await.sign_ins
    }

    pub async fn sign_out_count(&self) -> usize {
        self.state.lock().await.sign_outs
    }

    pub async fn fail_create_account(&self, fail: bool) {
        self.state.lock().await.fail_create_account = fail;
    }

    pub async fn fail_password_reset(&self, fail: bool) {
        self.state.lock().await.fail_password_reset = fail;
    }

    pub async fn fail_sign_out(&self, fail: bool) {
        self.state.lock().await.fail_sign_out = fail;
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<IdentitySession> {
        let mut state = self.state.lock().await;
        state.sign_ins += 1;
        match state.accounts.get(email) {
            Some((uid, expected)) if expected == password => Ok(IdentitySession {
                uid: uid.clone(),
                email: Some(email.to_string()),
                display_name: None,
                id_token: format!("token-{}", uid),
                refresh_token: None,
                expires_at: Some(Utc::now() + Duration::hours(1)),
            }),
            _ => Err(ServiceError::Authentication(
                "Invalid email or password".to_string(),
            )),
        }
    }

    async fn sign_out(&self, _session: &IdentitySession) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        if state.fail_sign_out {
            return Err(ServiceError::ExternalService("identity provider offline".to_string()));
        }
        state.sign_outs += 1;
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str) -> ServiceResult<IdentityAccount> {
        let mut state = self.state.lock().await;
        if state.fail_create_account {
            return Err(ServiceError::ExternalService("identity provider offline".to_string()));
        }
        if state.accounts.contains_key(email) {
            return Err(ServiceError::Domain(crate::errors::DomainError::Validation(
                crate::errors::ValidationError::invalid_value("email", "is already in use"),
            )));
        }
        let uid = format!("auth-{}", Uuid::new_v4().simple());
        state
            .accounts
            .insert(email.to_string(), (uid.clone(), password.to_string()));
        Ok(IdentityAccount {
            uid,
            email: email.to_string(),
        })
    }

    async fn send_password_reset(&self, email: &str) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        if state.fail_password_reset {
            return Err(ServiceError::ExternalService("mail dispatch failed".to_string()));
        }
        state.reset_requests.push(email.to_string());
        Ok(())
    }
}
