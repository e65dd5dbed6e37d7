use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{Claims, encode_token};
use crate::auth::{password, policy};
use crate::config::RegistrationMode;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::reset::ResetError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub(crate) fn validate_name(name: Option<&str>) -> Result<(), AppError> {
    if let Some(name) = name {
        let len = name.chars().count();
        if len == 0 || len > 50 {
            return Err(AppError::BadRequest(
                "Name must be between 1 and 50 characters".to_string(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn email_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A user with this email already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    if state.config.registration == RegistrationMode::Closed {
        return Err(AppError::Forbidden(
            "Registration is disabled. Contact your system administrator.".to_string(),
        ));
    }

    let email = policy::normalize_email(&req.email).map_err(AppError::BadRequest)?;
    if req.password != req.password_confirm {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }
    policy::check_password(&req.password).map_err(AppError::BadRequest)?;
    validate_name(req.name.as_deref())?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let user = db::users::create(&state.pool, &email, &pw_hash, req.name.as_deref(), false)
        .await
        .map_err(email_conflict)?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    if let Err(retry_after) = state.login_limiter.check(&email) {
        tracing::warn!(%email, retry_after, "Login throttled");
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record_failure(&email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    if !user.is_active {
        return Err(AppError::Forbidden("Inactive user".to_string()));
    }

    state.login_limiter.clear(&email);

    let claims = Claims::new(user.id, user.is_admin, state.config.access_token_minutes);
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

pub async fn logout(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    db::revoked_tokens::revoke(&state.pool, &auth.token_hash, auth.token_expires_at).await?;
    tracing::info!(user_id = %auth.id(), "Access token revoked");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    let issued = state.reset.request_reset(&email).await?;

    let mailer = state.system_mailer.clone();
    let ttl_minutes = state.reset.settings().ttl.num_minutes();

    // Delivery happens off the request path
    tokio::spawn(async move {
        if let Some(mailer) = mailer {
            if let Err(e) = mailer
                .send_password_reset(&issued.account.email, &issued.token, ttl_minutes)
                .await
            {
                tracing::error!("Failed to send password reset email: {e}");
            }
        } else {
            tracing::warn!(
                "System SMTP not configured. Password reset code for {}: {}",
                issued.account.email,
                issued.token
            );
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "A reset code has been sent to your email.".to_string(),
        }),
    ))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let client = addr.ip().to_string();

    if let Err(retry_after) = state.reset_limiter.check(&client) {
        tracing::warn!(%client, retry_after, "Reset code attempts throttled");
        return Err(AppError::RateLimited(
            "Too many invalid reset codes. Please try again later.".to_string(),
        ));
    }

    let result = state
        .reset
        .confirm_reset(
            req.token.trim(),
            &req.new_password,
            &req.confirm_new_password,
        )
        .await;

    // Only unknown codes count; success does not reset the counter
    if let Err(ResetError::TokenNotFound) = result {
        state.reset_limiter.record_failure(&client);
    }
    result?;

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}
