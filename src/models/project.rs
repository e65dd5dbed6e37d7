use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Task, User};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<Task>,
    pub participants: Vec<User>,
}

/// Result of adding someone to a project by email.
#[derive(Debug, Clone)]
pub enum Membership {
    /// No account existed; one was created and added.
    Created(User),
    /// An existing account was added.
    Found(User),
    /// The account was already a participant.
    Conflict(User),
}
