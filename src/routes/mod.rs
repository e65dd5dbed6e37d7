pub mod auth;
pub mod categories;
pub mod projects;
pub mod subtasks;
pub mod tasks;
pub mod users;

use axum::Router;
use axum::routing::{delete, get, post};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        // Users
        .route("/api/v1/users/me", get(users::me).patch(users::update_me))
        .route(
            "/api/v1/users/me/change-password",
            post(users::change_password),
        )
        .route("/api/v1/users/all/projects", get(users::all_with_projects))
        .route(
            "/api/v1/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
        // Categories
        .route(
            "/api/v1/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/v1/categories/{id}",
            get(categories::get).put(categories::update),
        )
        .route(
            "/api/v1/categories/{id}/cascade",
            delete(categories::delete_cascade),
        )
        // Projects
        .route("/api/v1/projects", get(projects::list).post(projects::create))
        .route(
            "/api/v1/projects/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/api/v1/projects/{id}/participants",
            post(projects::add_participant),
        )
        // Tasks
        .route("/api/v1/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/api/v1/tasks/{id}",
            get(tasks::get).put(tasks::update).delete(tasks::delete),
        )
        .route("/api/v1/tasks/{id}/subtasks", get(tasks::subtasks))
        // Subtasks
        .route(
            "/api/v1/subtasks",
            get(subtasks::list).post(subtasks::create),
        )
        .route(
            "/api/v1/subtasks/{id}",
            get(subtasks::get)
                .put(subtasks::update)
                .delete(subtasks::delete),
        )
}
