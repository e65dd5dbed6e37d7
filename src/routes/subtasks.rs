use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::tasks::WorkInput;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::subtasks::SubtaskFilter;
use crate::error::AppError;
use crate::models::{Subtask, WorkStatus};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateSubtask {
    pub task_id: Uuid,
    #[serde(flatten)]
    pub fields: WorkInput,
}

#[derive(Deserialize)]
pub struct UpdateSubtask {
    pub task_id: Option<Uuid>,
    #[serde(flatten)]
    pub fields: WorkInput,
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub task_id: Option<Uuid>,
    pub title: Option<String>,
    pub status: Option<WorkStatus>,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

async fn load_subtask(state: &SharedState, id: Uuid) -> Result<Subtask, AppError> {
    db::subtasks::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subtask not found".to_string()))
}

/// Assignees may read and update, never delete.
fn check_access(auth: &AuthUser, subtask: &Subtask, allow_assignee: bool) -> Result<(), AppError> {
    let is_assignee = subtask.assignee_id == Some(auth.id());
    if auth.is_admin() || subtask.author_id == auth.id() || (allow_assignee && is_assignee) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have access to this subtask".to_string(),
        ))
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Subtask>>, AppError> {
    auth.require_admin()?;

    let filter = SubtaskFilter {
        task_id: q.task_id,
        title: q.title,
        status: q.status,
        assignee_id: q.assignee_id,
        priority: q.priority,
        created_from: q.created_from,
        created_to: q.created_to,
    };
    Ok(Json(db::subtasks::list(&state.pool, &filter).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateSubtask>,
) -> Result<(StatusCode, Json<Subtask>), AppError> {
    if req.fields.title.is_none() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    super::tasks::load_task(&state, req.task_id).await?;

    let fields = req.fields.resolve(&state).await?;
    let title = fields.title.clone().unwrap_or_default();

    let subtask =
        db::subtasks::create(&state.pool, req.task_id, auth.id(), &title, &fields).await?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Subtask>, AppError> {
    let subtask = load_subtask(&state, id).await?;
    check_access(&auth, &subtask, true)?;
    Ok(Json(subtask))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSubtask>,
) -> Result<Json<Subtask>, AppError> {
    let subtask = load_subtask(&state, id).await?;
    check_access(&auth, &subtask, true)?;

    if let Some(task_id) = req.task_id {
        super::tasks::load_task(&state, task_id).await?;
    }
    let fields = req.fields.resolve(&state).await?;

    let subtask = db::subtasks::update(&state.pool, id, req.task_id, &fields)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Subtask not found".to_string()),
            _ => AppError::Database(e),
        })?;
    Ok(Json(subtask))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let subtask = load_subtask(&state, id).await?;
    check_access(&auth, &subtask, false)?;

    db::subtasks::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
