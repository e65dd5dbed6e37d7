use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::MessageResponse;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::categories::CategoryFilter;
use crate::error::AppError;
use crate::models::Category;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub name: Option<String>,
    pub color: Option<String>,
    pub owner_id: Option<Uuid>,
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Category name is required".to_string()));
    }
    Ok(())
}

/// Loads the category and checks the caller may touch it.
async fn load_owned(state: &SharedState, auth: &AuthUser, id: Uuid) -> Result<Category, AppError> {
    let category = db::categories::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    auth.require_owner_or_admin(category.owner_id)?;
    Ok(category)
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    let owner_id = if auth.is_admin() { q.owner_id } else { Some(auth.id()) };

    let categories = db::categories::list(
        &state.pool,
        &CategoryFilter {
            owner_id,
            name: q.name,
            color: q.color,
        },
    )
    .await?;
    Ok(Json(categories))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    validate_name(&req.name)?;

    let category =
        db::categories::create(&state.pool, auth.id(), req.name.trim(), req.color.as_deref())
            .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(load_owned(&state, &auth, id).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategory>,
) -> Result<Json<Category>, AppError> {
    load_owned(&state, &auth, id).await?;
    if let Some(name) = req.name.as_deref() {
        validate_name(name)?;
    }

    let category = db::categories::update(
        &state.pool,
        id,
        req.name.as_deref().map(str::trim),
        req.color.as_deref(),
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Category not found".to_string()),
        _ => AppError::Database(e),
    })?;
    Ok(Json(category))
}

/// Removes the category along with its projects, tasks and subtasks.
pub async fn delete_cascade(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let category = load_owned(&state, &auth, id).await?;
    db::categories::delete(&state.pool, id).await?;
    tracing::info!(category_id = %category.id, deleted_by = %auth.id(), "Category deleted with its contents");

    Ok(Json(MessageResponse {
        message: "Category and all of its contents were deleted".to_string(),
    }))
}
