pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod reset;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::password;
use crate::config::Config;
use crate::email::SystemMailer;
use crate::rate_limit::FailureLimiter;
use crate::reset::store::PgResetTokenStore;
use crate::reset::{PasswordReset, ResetSettings};
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let system_mailer = config.smtp.as_ref().and_then(|smtp| {
        match SystemMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Some(Arc::new(mailer))
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                None
            }
        }
    });

    let reset = PasswordReset::new(
        Arc::new(PgResetTokenStore::new(pool.clone())),
        ResetSettings::from(&config.reset),
    );

    let cors = cors_layer(&config.cors_origins);
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        system_mailer,
        login_limiter: FailureLimiter::login(),
        reset_limiter: FailureLimiter::reset_confirm(),
        reset,
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the configured bootstrap admin unless an account with that email exists.
pub async fn ensure_admin(pool: &PgPool, config: &Config) -> Result<(), String> {
    let Some(admin) = config.admin.as_ref() else {
        return Ok(());
    };

    let email = admin.email.trim().to_lowercase();
    let existing = db::users::find_by_email(pool, &email)
        .await
        .map_err(|e| format!("Failed to look up admin: {e}"))?;
    if existing.is_some() {
        return Ok(());
    }

    let pw_hash = password::hash(&admin.password)?;
    let user = db::users::create(pool, &email, &pw_hash, Some("Admin"), true)
        .await
        .map_err(|e| format!("Failed to create admin: {e}"))?;

    tracing::info!(user_id = %user.id, "Bootstrap admin created");
    Ok(())
}

/// Drops stale throttle entries and revoked tokens past their expiry.
pub async fn run_maintenance(state: &SharedState) {
    state.login_limiter.cleanup();
    state.reset_limiter.cleanup();

    match db::revoked_tokens::purge_expired(&state.pool).await {
        Ok(0) => {}
        Ok(purged) => tracing::debug!(purged, "Purged expired revoked tokens"),
        Err(e) => tracing::error!("Failed to purge revoked tokens: {e}"),
    }
}

async fn health() -> &'static str {
    "ok"
}
