use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::{AppSettings, EducationEntry, ExperienceEntry, ResumeDocument, Theme};
use crate::session::{GenerateAllOutcome, GenerationOutcome, ImportOutcome, SessionView};
use crate::state::AppState;
use crate::transfer::export_file_name;

#[derive(Deserialize)]
pub struct ResumeEdit {
    pub path: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct SettingsEdit {
    pub field: String,
    pub value: Value,
}

#[derive(Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.view().await)
}

/// PATCH /api/v1/resume
pub async fn handle_edit_resume(
    State(state): State<AppState>,
    Json(req): Json<ResumeEdit>,
) -> Result<Json<ResumeDocument>, AppError> {
    let document = state.session.set_field(&req.path, req.value).await?;
    Ok(Json(document))
}

#[derive(Deserialize)]
pub struct FieldQuery {
    pub path: String,
}

/// GET /api/v1/resume/field?path=experience.0.bullets
pub async fn handle_get_field(
    State(state): State<AppState>,
    Query(query): Query<FieldQuery>,
) -> Result<Json<Value>, AppError> {
    let value = state.session.get_field(&query.path).await?;
    Ok(Json(value))
}

/// PATCH /api/v1/settings
pub async fn handle_edit_settings(
    State(state): State<AppState>,
    Json(req): Json<SettingsEdit>,
) -> Result<Json<AppSettings>, AppError> {
    let settings = state.session.update_settings(&req.field, req.value).await?;
    Ok(Json(settings))
}

/// POST /api/v1/resume/experience
pub async fn handle_add_experience(
    State(state): State<AppState>,
) -> (StatusCode, Json<ExperienceEntry>) {
    (StatusCode::CREATED, Json(state.session.add_experience().await))
}

/// DELETE /api/v1/resume/experience/:id
pub async fn handle_remove_experience(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.session.remove_experience(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resume/education
pub async fn handle_add_education(
    State(state): State<AppState>,
) -> (StatusCode, Json<EducationEntry>) {
    (StatusCode::CREATED, Json(state.session.add_education().await))
}

/// DELETE /api/v1/resume/education/:id
pub async fn handle_remove_education(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.session.remove_education(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resume/experience/:id/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GenerationOutcome>, AppError> {
    let outcome = state.session.generate(&id).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/resume/experience/:id/undo
pub async fn handle_undo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExperienceEntry>, AppError> {
    let entry = state.session.undo(&id).await?;
    Ok(Json(entry))
}

/// POST /api/v1/resume/generate-all
pub async fn handle_generate_all(
    State(state): State<AppState>,
) -> Result<Json<GenerateAllOutcome>, AppError> {
    let outcome = state.session.generate_all().await?;
    Ok(Json(outcome))
}

/// POST /api/v1/import
///
/// Takes the raw body so malformed JSON is reported as an import error rather
/// than an extractor rejection.
pub async fn handle_import(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportOutcome>, AppError> {
    let outcome = state.session.import(&body).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/export
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.session.export().await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(chrono::Utc::now())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// POST /api/v1/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.reset().await)
}

/// POST /api/v1/theme/toggle
pub async fn handle_toggle_theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    Json(ThemeResponse {
        theme: state.session.toggle_theme().await,
    })
}
