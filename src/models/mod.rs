mod category;
mod password_reset_token;
mod project;
mod subtask;
mod task;
mod user;

pub use category::Category;
pub use password_reset_token::PasswordResetToken;
pub use project::{Membership, Project, ProjectDetail};
pub use subtask::Subtask;
pub use task::{Task, WorkStatus};
pub use user::{User, UserWithProjects};
