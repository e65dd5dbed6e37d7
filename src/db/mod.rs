pub mod categories;
pub mod password_reset_tokens;
pub mod projects;
pub mod revoked_tokens;
pub mod subtasks;
pub mod tasks;
pub mod users;
