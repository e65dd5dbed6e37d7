use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A live reset token. `token_hash` is the digest of the value the user received.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct PasswordResetToken {
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub account_email: String,
    pub account_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
