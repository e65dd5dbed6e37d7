//! Password reset token lifecycle.
//!
//! A token goes `issued -> consumed` exactly once. Consumption is either a
//! successful password commit or the validator noticing the token expired.
//! Issuing a new token for an account drops the previous one.

pub mod store;
pub mod token;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::auth::{password, policy};
use crate::config::{MAX_RESET_TOKEN_MINUTES, ResetConfig};
use crate::models::PasswordResetToken;
use store::{Committed, Replaced, ResetAccount, ResetTokenStore};
use token::{TokenFormat, hash_token};

#[derive(Debug)]
pub enum ResetError {
    AccountNotFound,
    TokenNotFound,
    TokenExpired,
    PasswordMismatch,
    InvalidPasswordPolicy(String),
    Store(sqlx::Error),
    Internal(String),
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::AccountNotFound => write!(f, "Account not found"),
            ResetError::TokenNotFound => write!(f, "Invalid reset code"),
            ResetError::TokenExpired => write!(f, "Reset code has expired"),
            ResetError::PasswordMismatch => write!(f, "New passwords do not match"),
            ResetError::InvalidPasswordPolicy(msg) => write!(f, "{msg}"),
            ResetError::Store(err) => write!(f, "Reset store error: {err}"),
            ResetError::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<sqlx::Error> for ResetError {
    fn from(err: sqlx::Error) -> Self {
        ResetError::Store(err)
    }
}

#[derive(Debug, Clone)]
pub struct ResetSettings {
    pub ttl: Duration,
    pub format: TokenFormat,
    /// Fresh values tried when a generated token collides with a live one.
    pub max_attempts: u32,
}

impl From<&ResetConfig> for ResetSettings {
    fn from(config: &ResetConfig) -> Self {
        Self {
            ttl: Duration::minutes(config.ttl_minutes.clamp(1, MAX_RESET_TOKEN_MINUTES)),
            format: config.format,
            max_attempts: 5,
        }
    }
}

/// A freshly stored token. `token` is the plaintext for out-of-band delivery.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub account: ResetAccount,
    pub expires_at: DateTime<Utc>,
}

type TokenSource = Arc<dyn Fn() -> String + Send + Sync>;

pub struct PasswordReset {
    store: Arc<dyn ResetTokenStore>,
    settings: ResetSettings,
    source: TokenSource,
}

impl PasswordReset {
    pub fn new(store: Arc<dyn ResetTokenStore>, settings: ResetSettings) -> Self {
        let format = settings.format;
        Self {
            store,
            settings,
            source: Arc::new(move || format.generate()),
        }
    }

    /// Replaces the random generator, mainly for deterministic tests.
    pub fn with_token_source(mut self, source: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    pub fn settings(&self) -> &ResetSettings {
        &self.settings
    }

    pub async fn request_reset(&self, email: &str) -> Result<IssuedToken, ResetError> {
        self.issue_at(email, Utc::now()).await
    }

    pub async fn confirm_reset(
        &self,
        token: &str,
        new_password: &str,
        confirm_new_password: &str,
    ) -> Result<ResetAccount, ResetError> {
        self.confirm_at(token, new_password, confirm_new_password, Utc::now())
            .await
    }

    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<IssuedToken, ResetError> {
        let account = self
            .store
            .find_account(email)
            .await?
            .ok_or(ResetError::AccountNotFound)?;

        let expires_at = now + self.settings.ttl;

        for attempt in 1..=self.settings.max_attempts {
            let token = (self.source)();
            let record = PasswordResetToken {
                token_hash: hash_token(&token),
                account_email: account.email.clone(),
                account_id: account.id,
                issued_at: now,
                expires_at,
            };

            match self.store.replace(&record).await? {
                Replaced::Stored => {
                    tracing::info!(account_id = %account.id, %expires_at, "Password reset token issued");
                    return Ok(IssuedToken {
                        token,
                        account,
                        expires_at,
                    });
                }
                Replaced::Collision => {
                    tracing::warn!(account_id = %account.id, attempt, "Reset token collided with a live token or a concurrent issue, regenerating");
                }
            }
        }

        Err(ResetError::Internal(
            "Could not generate a unique reset token".to_string(),
        ))
    }

    /// Looks the token up and consumes it if it has expired.
    pub async fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordResetToken, ResetError> {
        let token_hash = hash_token(token);
        let record = self
            .store
            .find(&token_hash)
            .await?
            .ok_or(ResetError::TokenNotFound)?;

        if record.is_expired_at(now) {
            self.store.delete(&token_hash).await?;
            tracing::warn!(account_id = %record.account_id, expires_at = %record.expires_at, "Expired reset token presented");
            return Err(ResetError::TokenExpired);
        }

        Ok(record)
    }

    /// Stores the new credential and consumes the token in one step.
    pub async fn commit(
        &self,
        record: &PasswordResetToken,
        new_password: &str,
    ) -> Result<ResetAccount, ResetError> {
        let password_hash = password::hash(new_password).map_err(ResetError::Internal)?;

        match self.store.commit_password(record, &password_hash).await? {
            Committed::Done => {
                tracing::info!(account_id = %record.account_id, "Password reset completed");
                Ok(ResetAccount {
                    id: record.account_id,
                    email: record.account_email.clone(),
                })
            }
            Committed::TokenGone => Err(ResetError::TokenNotFound),
            Committed::AccountGone => Err(ResetError::AccountNotFound),
        }
    }

    pub async fn confirm_at(
        &self,
        token: &str,
        new_password: &str,
        confirm_new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<ResetAccount, ResetError> {
        if new_password != confirm_new_password {
            return Err(ResetError::PasswordMismatch);
        }
        policy::check_password(new_password).map_err(ResetError::InvalidPasswordPolicy)?;

        let record = self.validate_at(token, now).await?;
        self.commit(&record, new_password).await
    }
}
