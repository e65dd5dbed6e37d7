use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Category;

#[derive(Debug, Default, Clone)]
pub struct CategoryFilter {
    pub owner_id: Option<Uuid>,
    pub name: Option<String>,
    pub color: Option<String>,
}

pub async fn list(pool: &PgPool, filter: &CategoryFilter) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT * FROM categories
         WHERE ($1::uuid IS NULL OR owner_id = $1)
           AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
           AND ($3::text IS NULL OR color = $3)
         ORDER BY created_at DESC",
    )
    .bind(filter.owner_id)
    .bind(filter.name.as_deref())
    .bind(filter.color.as_deref())
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    color: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (owner_id, name, color) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(owner_id)
    .bind(name)
    .bind(color)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = COALESCE($2, name), color = COALESCE($3, color)
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(color)
    .fetch_one(pool)
    .await
}

/// Projects, tasks and subtasks under the category go with it (FK cascade).
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
