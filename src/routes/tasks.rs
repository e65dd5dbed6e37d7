use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::tasks::{TaskFilter, WorkFields};
use crate::error::AppError;
use crate::models::{Subtask, Task, WorkStatus};
use crate::state::SharedState;

const DESCRIPTION_MAX: usize = 10_000;

/// Body shared by task and subtask create/update requests.
#[derive(Deserialize, Default)]
pub struct WorkInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<WorkStatus>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_email: Option<String>,
    pub assignee_id: Option<Uuid>,
}

impl WorkInput {
    /// Validates lengths and resolves the assignee to an account id.
    pub(crate) async fn resolve(self, state: &SharedState) -> Result<WorkFields, AppError> {
        if let Some(title) = self.title.as_deref() {
            let len = title.trim().chars().count();
            if len == 0 || len > 100 {
                return Err(AppError::BadRequest(
                    "Title must be between 1 and 100 characters".to_string(),
                ));
            }
        }
        if let Some(description) = self.description.as_deref() {
            if description.chars().count() > DESCRIPTION_MAX {
                return Err(AppError::BadRequest(format!(
                    "Description must be at most {DESCRIPTION_MAX} characters"
                )));
            }
        }

        let assignee_id = if let Some(email) = self.assignee_email.as_deref() {
            let email = email.trim().to_lowercase();
            let user = db::users::find_by_email(&state.pool, &email)
                .await?
                .ok_or_else(|| AppError::BadRequest("Assignee not found".to_string()))?;
            Some(user.id)
        } else if let Some(id) = self.assignee_id {
            let user = db::users::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Assignee not found".to_string()))?;
            Some(user.id)
        } else {
            None
        };

        Ok(WorkFields {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            assignee_id,
        })
    }
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    #[serde(flatten)]
    pub fields: WorkInput,
}

#[derive(Deserialize)]
pub struct UpdateTask {
    pub project_id: Option<Uuid>,
    #[serde(flatten)]
    pub fields: WorkInput,
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub project_id: Option<Uuid>,
    pub title: Option<String>,
    pub status: Option<WorkStatus>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

pub(crate) async fn load_task(state: &SharedState, id: Uuid) -> Result<Task, AppError> {
    db::tasks::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
}

fn require_author_or_admin(auth: &AuthUser, task: &Task) -> Result<(), AppError> {
    if auth.is_admin() || task.author_id == auth.id() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have access to this task".to_string(),
        ))
    }
}

async fn ensure_project(state: &SharedState, project_id: Uuid) -> Result<(), AppError> {
    super::projects::load_project(state, project_id).await?;
    Ok(())
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    let filter = TaskFilter {
        author_id: (!auth.is_admin()).then(|| auth.id()),
        project_id: q.project_id,
        title: q.title,
        status: q.status,
        created_from: q.created_from,
        created_to: q.created_to,
    };
    Ok(Json(db::tasks::list(&state.pool, &filter).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    if req.fields.title.is_none() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    ensure_project(&state, req.project_id).await?;

    let fields = req.fields.resolve(&state).await?;
    let title = fields.title.clone().unwrap_or_default();

    let task = db::tasks::create(&state.pool, req.project_id, auth.id(), &title, &fields).await?;
    tracing::info!(task_id = %task.id, project_id = %task.project_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    let task = load_task(&state, id).await?;
    require_author_or_admin(&auth, &task)?;
    Ok(Json(task))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTask>,
) -> Result<Json<Task>, AppError> {
    let task = load_task(&state, id).await?;
    require_author_or_admin(&auth, &task)?;

    if let Some(project_id) = req.project_id {
        ensure_project(&state, project_id).await?;
    }
    let fields = req.fields.resolve(&state).await?;

    let task = db::tasks::update(&state.pool, id, req.project_id, &fields)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Task not found".to_string()),
            _ => AppError::Database(e),
        })?;
    Ok(Json(task))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let task = load_task(&state, id).await?;
    require_author_or_admin(&auth, &task)?;

    db::tasks::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn subtasks(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Subtask>>, AppError> {
    let task = load_task(&state, id).await?;
    require_author_or_admin(&auth, &task)?;
    Ok(Json(db::subtasks::list_by_task(&state.pool, id).await?))
}
