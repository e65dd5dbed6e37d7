use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::PasswordResetToken;

/// The account a reset token is issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetAccount {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    Stored,
    /// Another live token already has this value, or a concurrent issue for
    /// the same account committed first. Nothing was written.
    Collision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Committed {
    Done,
    /// The token row was already gone; the credential was not touched.
    TokenGone,
    /// The account row was gone; nothing was written.
    AccountGone,
}

/// Persistence for reset tokens and the credential they unlock.
///
/// Every method is one transaction on the backing store.
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn find_account(&self, email: &str) -> Result<Option<ResetAccount>, sqlx::Error>;

    /// Drops every token held by `token.account_id` and stores `token`.
    async fn replace(&self, token: &PasswordResetToken) -> Result<Replaced, sqlx::Error>;

    async fn find(&self, token_hash: &str) -> Result<Option<PasswordResetToken>, sqlx::Error>;

    async fn delete(&self, token_hash: &str) -> Result<bool, sqlx::Error>;

    /// Deletes the token and writes the new password hash, both or neither.
    async fn commit_password(
        &self,
        token: &PasswordResetToken,
        password_hash: &str,
    ) -> Result<Committed, sqlx::Error>;
}

pub struct PgResetTokenStore {
    pool: PgPool,
}

impl PgResetTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenStore {
    async fn find_account(&self, email: &str) -> Result<Option<ResetAccount>, sqlx::Error> {
        let user = db::users::find_by_email(&self.pool, email).await?;
        Ok(user.map(|u| ResetAccount {
            id: u.id,
            email: u.email,
        }))
    }

    async fn replace(&self, token: &PasswordResetToken) -> Result<Replaced, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let dropped =
            db::password_reset_tokens::delete_all_for_account(&mut *tx, token.account_id).await?;
        if dropped > 0 {
            tracing::debug!(account_id = %token.account_id, dropped, "Replacing previous reset token");
        }

        match db::password_reset_tokens::create(&mut *tx, token).await {
            Ok(()) => {}
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                // tx rolls back on drop, so the old token survives too.
                // Either token_hash or account_id clashed; both are retried.
                return Ok(Replaced::Collision);
            }
            Err(e) => return Err(e),
        }

        tx.commit().await?;
        Ok(Replaced::Stored)
    }

    async fn find(&self, token_hash: &str) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        db::password_reset_tokens::find_by_hash(&self.pool, token_hash).await
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, sqlx::Error> {
        db::password_reset_tokens::delete_by_hash(&self.pool, token_hash).await
    }

    async fn commit_password(
        &self,
        token: &PasswordResetToken,
        password_hash: &str,
    ) -> Result<Committed, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let consumed = db::password_reset_tokens::delete_for_account_by_hash(
            &mut *tx,
            &token.token_hash,
            token.account_id,
        )
        .await?;
        if !consumed {
            return Ok(Committed::TokenGone);
        }

        let updated =
            db::users::update_password(&mut *tx, token.account_id, password_hash).await?;
        if !updated {
            return Ok(Committed::AccountGone);
        }

        tx.commit().await?;
        Ok(Committed::Done)
    }
}
