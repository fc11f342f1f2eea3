pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::preview::handlers as preview;
use crate::projects::handlers as projects;
use crate::state::AppState;

/// Manual saves upload whole documents; generated sites with embedded assets
/// run well past axum's 2 MB default.
const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // User API
        .route("/api/user/credits", get(projects::handle_get_credits))
        .route(
            "/api/user/project",
            post(projects::handle_create_project).get(projects::handle_list_projects),
        )
        .route("/api/user/project/:id", get(projects::handle_get_project))
        .route(
            "/api/user/publish-toggle/:id",
            get(projects::handle_publish_toggle),
        )
        // Project API
        .route(
            "/api/project/revision/:id",
            post(projects::handle_revision),
        )
        .route("/api/project/save/:id", put(projects::handle_save))
        .route(
            "/api/project/rollback/:id/:version_id",
            get(projects::handle_rollback),
        )
        .route("/api/project/preview/:id", get(preview::handle_preview))
        .route(
            "/api/project/preview/:id/html",
            get(preview::handle_preview_html),
        )
        .route("/api/project/:id", delete(projects::handle_delete_project))
        // Published sites (no auth)
        .route(
            "/api/project/published",
            get(projects::handle_list_published),
        )
        .route(
            "/api/project/published/:id",
            get(projects::handle_get_published),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
