use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::tasks::WorkFields;
use crate::models::{Subtask, WorkStatus};

#[derive(Debug, Default, Clone)]
pub struct SubtaskFilter {
    pub task_id: Option<Uuid>,
    pub title: Option<String>,
    pub status: Option<WorkStatus>,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

pub async fn list(pool: &PgPool, filter: &SubtaskFilter) -> Result<Vec<Subtask>, sqlx::Error> {
    sqlx::query_as::<_, Subtask>(
        "SELECT * FROM subtasks
         WHERE ($1::uuid IS NULL OR task_id = $1)
           AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
           AND ($3::text IS NULL OR status = $3)
           AND ($4::uuid IS NULL OR assignee_id = $4)
           AND ($5::text IS NULL OR priority = $5)
           AND ($6::timestamptz IS NULL OR created_at >= $6)
           AND ($7::timestamptz IS NULL OR created_at <= $7)
         ORDER BY created_at DESC",
    )
    .bind(filter.task_id)
    .bind(filter.title.as_deref())
    .bind(filter.status)
    .bind(filter.assignee_id)
    .bind(filter.priority.as_deref())
    .bind(filter.created_from)
    .bind(filter.created_to)
    .fetch_all(pool)
    .await
}

pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Subtask>, sqlx::Error> {
    sqlx::query_as::<_, Subtask>("SELECT * FROM subtasks WHERE task_id = $1 ORDER BY created_at")
        .bind(task_id)
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    task_id: Uuid,
    author_id: Uuid,
    title: &str,
    fields: &WorkFields,
) -> Result<Subtask, sqlx::Error> {
    sqlx::query_as::<_, Subtask>(
        "INSERT INTO subtasks (task_id, author_id, title, description, status, priority, due_date, assignee_id)
         VALUES ($1, $2, $3, $4, COALESCE($5, 'todo'), $6, $7, $8)
         RETURNING *",
    )
    .bind(task_id)
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

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Subtask>, sqlx::Error> {
    sqlx::query_as::<_, Subtask>("SELECT * FROM subtasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    task_id: Option<Uuid>,
    fields: &WorkFields,
) -> Result<Subtask, sqlx::Error> {
    sqlx::query_as::<_, Subtask>(
        "UPDATE subtasks SET
            task_id = COALESCE($2, task_id),
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
    .bind(task_id)
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
    sqlx::query("DELETE FROM subtasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
