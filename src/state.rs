use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::SystemMailer;
use crate::rate_limit::FailureLimiter;
use crate::reset::PasswordReset;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub system_mailer: Option<Arc<SystemMailer>>,
    pub login_limiter: FailureLimiter,
    /// Keyed by client IP.
    pub reset_limiter: FailureLimiter,
    pub reset: PasswordReset,
}
