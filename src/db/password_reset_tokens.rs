use uuid::Uuid;

use crate::models::PasswordResetToken;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token: &PasswordResetToken,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO password_reset_tokens (token_hash, account_email, account_id, issued_at, expires_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&token.token_hash)
    .bind(&token.account_email)
    .bind(token.account_id)
    .bind(token.issued_at)
    .bind(token.expires_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_hash<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token_hash: &str,
) -> Result<Option<PasswordResetToken>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetToken>(
        "SELECT token_hash, account_email, account_id, issued_at, expires_at
         FROM password_reset_tokens WHERE token_hash = $1",
    )
    .bind(token_hash)
    .fetch_optional(executor)
    .await
}

/// Live tokens for an account, newest first. Used by tests to inspect store state.
pub async fn list_for_account<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    account_id: Uuid,
) -> Result<Vec<PasswordResetToken>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetToken>(
        "SELECT token_hash, account_email, account_id, issued_at, expires_at
         FROM password_reset_tokens WHERE account_id = $1 ORDER BY issued_at DESC",
    )
    .bind(account_id)
    .fetch_all(executor)
    .await
}

/// Returns whether a row was removed.
pub async fn delete_by_hash<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = $1")
        .bind(token_hash)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes the token only if it still belongs to the given account.
pub async fn delete_for_account_by_hash<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token_hash: &str,
    account_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM password_reset_tokens WHERE token_hash = $1 AND account_id = $2",
    )
    .bind(token_hash)
    .bind(account_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all_for_account<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    account_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM password_reset_tokens WHERE account_id = $1")
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
