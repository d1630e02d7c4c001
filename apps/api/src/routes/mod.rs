pub mod health;
pub mod session;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", get(session::handle_get_session))
        // Field edits
        .route("/api/v1/resume", patch(session::handle_edit_resume))
        .route("/api/v1/resume/field", get(session::handle_get_field))
        .route("/api/v1/settings", patch(session::handle_edit_settings))
        // Entry lifecycle
        .route(
            "/api/v1/resume/experience",
            post(session::handle_add_experience),
        )
        .route(
            "/api/v1/resume/experience/:id",
            delete(session::handle_remove_experience),
        )
        .route(
            "/api/v1/resume/education",
            post(session::handle_add_education),
        )
        .route(
            "/api/v1/resume/education/:id",
            delete(session::handle_remove_education),
        )
        // Generation
        .route(
            "/api/v1/resume/experience/:id/generate",
            post(session::handle_generate),
        )
        .route(
            "/api/v1/resume/experience/:id/undo",
            post(session::handle_undo),
        )
        .route(
            "/api/v1/resume/generate-all",
            post(session::handle_generate_all),
        )
        // Import / export / reset
        .route("/api/v1/import", post(session::handle_import))
        .route("/api/v1/export", get(session::handle_export))
        .route("/api/v1/reset", post(session::handle_reset))
        .route("/api/v1/theme/toggle", post(session::handle_toggle_theme))
        .with_state(state)
}
