use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use super::auth::{MessageResponse, email_conflict, validate_name};
use crate::auth::extractor::AuthUser;
use crate::auth::{password, policy};
use crate::db;
use crate::error::AppError;
use crate::models::{User, UserWithProjects};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct UpdateMe {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

async fn with_projects(state: &SharedState, user: User) -> Result<UserWithProjects, AppError> {
    let projects = db::projects::list_by_owner(&state.pool, user.id).await?;
    Ok(UserWithProjects { user, projects })
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<UserWithProjects>, AppError> {
    Ok(Json(with_projects(&state, auth.user).await?))
}

pub async fn update_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UpdateMe>,
) -> Result<Json<User>, AppError> {
    validate_name(req.name.as_deref())?;

    let email = req
        .email
        .as_deref()
        .map(policy::normalize_email)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let pw_hash = match req.password.as_deref() {
        Some(pw) => {
            policy::check_password(pw).map_err(AppError::BadRequest)?;
            Some(password::hash(pw).map_err(AppError::Internal)?)
        }
        None => None,
    };

    let user = db::users::update_profile(
        &state.pool,
        auth.id(),
        req.name.as_deref(),
        email.as_deref(),
        pw_hash.as_deref(),
    )
    .await
    .map_err(email_conflict)?;

    Ok(Json(user))
}

pub async fn change_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let valid = password::verify(&req.old_password, &auth.user.password_hash)
        .map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::BadRequest("Incorrect old password".to_string()));
    }

    if req.new_password != req.confirm_new_password {
        return Err(AppError::BadRequest("New passwords do not match".to_string()));
    }
    policy::check_password(&req.new_password).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, auth.id(), &pw_hash).await?;

    tracing::info!(user_id = %auth.id(), "Password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

pub async fn get_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserWithProjects>, AppError> {
    auth.require_admin()?;

    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(with_projects(&state, user).await?))
}

pub async fn all_with_projects(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<UserWithProjects>>, AppError> {
    auth.require_admin()?;

    let users = db::users::list_all(&state.pool).await?;
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        out.push(with_projects(&state, user).await?);
    }
    Ok(Json(out))
}

pub async fn delete_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    auth.require_admin()?;

    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    db::users::delete(&state.pool, id).await?;
    tracing::info!(user_id = %id, deleted_by = %auth.id(), "User deleted");

    Ok(Json(user))
}
