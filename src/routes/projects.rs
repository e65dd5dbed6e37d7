use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::auth::MessageResponse;
use crate::auth::extractor::AuthUser;
use crate::auth::{password, policy};
use crate::db;
use crate::db::projects::ProjectFilter;
use crate::error::AppError;
use crate::models::{Membership, Project, ProjectDetail, User};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub category_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct AddParticipant {
    pub email: String,
}

fn validate_title(title: &str) -> Result<(), AppError> {
    let len = title.trim().chars().count();
    if len == 0 || len > 100 {
        return Err(AppError::BadRequest(
            "Title must be between 1 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_category(state: &SharedState, category_id: Uuid) -> Result<(), AppError> {
    db::categories::find_by_id(&state.pool, category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    Ok(())
}

pub(crate) async fn load_project(state: &SharedState, id: Uuid) -> Result<Project, AppError> {
    db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let owner_id = if auth.is_admin() { q.owner_id } else { Some(auth.id()) };

    let filter = ProjectFilter {
        owner_id,
        category_id: q.category_id,
        title: q.title,
        description: q.description,
        created_from: q.created_from,
        created_to: q.created_to,
    };
    Ok(Json(db::projects::list(&state.pool, &filter).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    validate_title(&req.title)?;
    ensure_category(&state, req.category_id).await?;

    let project = db::projects::create(
        &state.pool,
        auth.id(),
        req.category_id,
        req.title.trim(),
        req.description.as_deref(),
    )
    .await?;

    tracing::info!(project_id = %project.id, owner_id = %auth.id(), "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, AppError> {
    let project = load_project(&state, id).await?;

    if !auth.is_admin()
        && project.owner_id != auth.id()
        && !db::projects::is_participant(&state.pool, id, auth.id()).await?
    {
        return Err(AppError::Forbidden(
            "You do not have access to this project".to_string(),
        ));
    }

    let tasks = db::tasks::list_by_project(&state.pool, id).await?;
    let participants = db::projects::list_participants(&state.pool, id).await?;

    Ok(Json(ProjectDetail {
        project,
        tasks,
        participants,
    }))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> Result<Json<Project>, AppError> {
    let project = load_project(&state, id).await?;
    auth.require_owner_or_admin(project.owner_id)?;

    if let Some(title) = req.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(category_id) = req.category_id {
        ensure_category(&state, category_id).await?;
    }

    let project = db::projects::update(
        &state.pool,
        id,
        req.title.as_deref().map(str::trim),
        req.description.as_deref(),
        req.category_id,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Project not found".to_string()),
        _ => AppError::Database(e),
    })?;

    Ok(Json(project))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let project = load_project(&state, id).await?;
    auth.require_owner_or_admin(project.owner_id)?;

    db::projects::delete(&state.pool, id).await?;
    tracing::info!(project_id = %id, deleted_by = %auth.id(), "Project deleted");

    Ok(Json(MessageResponse {
        message: "Project deleted".to_string(),
    }))
}

/// Adds the account behind `email` to the project, creating it when absent.
async fn resolve_membership(
    state: &SharedState,
    project_id: Uuid,
    email: &str,
) -> Result<Membership, AppError> {
    let mut tx = state.pool.begin().await?;

    let membership = match db::users::find_by_email(&mut *tx, email).await? {
        Some(user) => {
            if db::projects::add_participant(&mut *tx, project_id, user.id).await? {
                Membership::Found(user)
            } else {
                Membership::Conflict(user)
            }
        }
        None => {
            let pw_hash =
                password::hash(&password::random_password()).map_err(AppError::Internal)?;
            let user = db::users::create(&mut *tx, email, &pw_hash, None, false)
                .await
                .map_err(super::auth::email_conflict)?;
            db::projects::add_participant(&mut *tx, project_id, user.id).await?;
            Membership::Created(user)
        }
    };

    tx.commit().await?;
    Ok(membership)
}

pub async fn add_participant(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddParticipant>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let project = load_project(&state, id).await?;
    auth.require_owner_or_admin(project.owner_id)?;

    let email = policy::normalize_email(&req.email).map_err(AppError::BadRequest)?;

    match resolve_membership(&state, id, &email).await? {
        Membership::Found(user) => {
            tracing::info!(project_id = %id, user_id = %user.id, "Participant added");
            Ok((StatusCode::OK, Json(user)))
        }
        Membership::Conflict(_) => Err(AppError::Conflict(
            "User is already a participant of this project".to_string(),
        )),
        Membership::Created(user) => {
            tracing::info!(project_id = %id, user_id = %user.id, "Participant account created");
            invite(&state, &project, &user).await?;
            Ok((StatusCode::CREATED, Json(user)))
        }
    }
}

/// Issues a reset code so a freshly created participant can choose a password.
async fn invite(state: &SharedState, project: &Project, user: &User) -> Result<(), AppError> {
    let issued = state.reset.request_reset(&user.email).await?;

    let mailer = state.system_mailer.clone();
    let title = project.title.clone();
    let base_url = state.config.base_url.clone();

    tokio::spawn(async move {
        if let Some(mailer) = mailer {
            if let Err(e) = mailer
                .send_project_invite(&issued.account.email, &title, &issued.token, &base_url)
                .await
            {
                tracing::error!("Failed to send project invite email: {e}");
            }
        } else {
            tracing::warn!(
                "System SMTP not configured. Invite code for {}: {}",
                issued.account.email,
                issued.token
            );
        }
    });

    Ok(())
}
