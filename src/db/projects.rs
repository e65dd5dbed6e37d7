use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Project, User};

#[derive(Debug, Default, Clone)]
pub struct ProjectFilter {
    pub owner_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT * FROM projects
         WHERE ($1::uuid IS NULL OR owner_id = $1)
           AND ($2::uuid IS NULL OR category_id = $2)
           AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
           AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
           AND ($5::timestamptz IS NULL OR created_at >= $5)
           AND ($6::timestamptz IS NULL OR created_at <= $6)
         ORDER BY created_at DESC",
    )
    .bind(filter.owner_id)
    .bind(filter.category_id)
    .bind(filter.title.as_deref())
    .bind(filter.description.as_deref())
    .bind(filter.created_from)
    .bind(filter.created_to)
    .fetch_all(pool)
    .await
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Project>, sqlx::Error> {
    list(
        pool,
        &ProjectFilter {
            owner_id: Some(owner_id),
            ..Default::default()
        },
    )
    .await
}

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    category_id: Uuid,
    title: &str,
    description: Option<&str>,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (owner_id, category_id, title, description)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(owner_id)
    .bind(category_id)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    category_id: Option<Uuid>,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            category_id = COALESCE($4, category_id),
            updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(category_id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_participants(pool: &PgPool, project_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         JOIN project_participants pp ON pp.user_id = u.id
         WHERE pp.project_id = $1
         ORDER BY pp.added_at",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn is_participant(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM project_participants WHERE project_id = $1 AND user_id = $2)",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Returns false when the user was already a participant.
pub async fn add_participant<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO project_participants (project_id, user_id) VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
    )
    .bind(project_id)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
