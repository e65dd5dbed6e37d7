use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Task, WorkStatus};

/// Optional columns shared by tasks and subtasks. `None` keeps the stored value on update.
#[derive(Debug, Default, Clone)]
pub struct WorkFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<WorkStatus>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub author_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub title: Option<String>,
    pub status: Option<WorkStatus>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks
         WHERE ($1::uuid IS NULL OR author_id = $1)
           AND ($2::uuid IS NULL OR project_id = $2)
           AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
           AND ($4::text IS NULL OR status = $4)
           AND ($5::timestamptz IS NULL OR created_at >= $5)
           AND ($6::timestamptz IS NULL OR created_at <= $6)
         ORDER BY created_at DESC",
    )
    .bind(filter.author_id)
    .bind(filter.project_id)
    .bind(filter.title.as_deref())
    .bind(filter.status)
    .bind(filter.created_from)
    .bind(filter.created_to)
    .fetch_all(pool)
    .await
}

pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE project_id = $1 ORDER BY created_at")
        .bind(project_id)
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    project_id: Uuid,
    author_id: Uuid,
    title: &str,
    fields: &WorkFields,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (project_id, author_id, title, description, status, priority, due_date, assignee_id)
         VALUES ($1, $2, $3, $4, COALESCE($5, 'todo'), $6, $7, $8)
         RETURNING *",
    )
    .bind(project_id)
    .bind(author_id)
    .bind(title)
    .bind(fields.description.as_deref())
    .bind(fields.status)
    .bind(fields.priority.as_deref())
    .bind(fields.due_date)
    .bind(fields.assignee_id)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    project_id: Option<Uuid>,
    fields: &WorkFields,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        "UPDATE tasks SET
            project_id = COALESCE($2, project_id),
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            status = COALESCE($5, status),
            priority = COALESCE($6, priority),
            due_date = COALESCE($7, due_date),
            assignee_id = COALESCE($8, assignee_id),
            updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(project_id)
    .bind(fields.title.as_deref())
    .bind(fields.description.as_deref())
    .bind(fields.status)
    .bind(fields.priority.as_deref())
    .bind(fields.due_date)
    .bind(fields.assignee_id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
