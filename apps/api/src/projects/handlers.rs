//! HTTP handlers for the project surface: the authenticated user/project
//! routes plus the anonymous published-site routes.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::project::{ProjectDetail, ProjectRow};
use crate::projects::{creation, revision, store};
use crate::state::AppState;

// ────────────────────────── request/response types ──────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub initial_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    #[serde(rename = "projectId")]
    pub project_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RevisionRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: ProjectDetail,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectRow>,
}

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub credits: i32,
}

#[derive(Debug, Serialize)]
pub struct PublishedCodeResponse {
    pub code: String,
}

// ────────────────────────────── user routes ──────────────────────────────

/// GET /api/user/credits
pub async fn handle_get_credits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CreditsResponse>, AppError> {
    let user = store::fetch_user(&state.db, &auth.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(CreditsResponse {
        credits: user.credits,
    }))
}

/// POST /api/user/project
/// Responds with the project id as soon as the debit lands; generation
/// continues in the background.
pub async fn handle_create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<CreateProjectResponse>, AppError> {
    let project_id = creation::create_project(&state, &auth.user_id, &req.initial_prompt).await?;
    Ok(Json(CreateProjectResponse { project_id }))
}

/// GET /api/user/project
pub async fn handle_list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects = store::list_projects(&state.db, &auth.user_id).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// GET /api/user/project/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = store::find_owned_project(&state.db, project_id, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    let detail = store::load_project_detail(&state.db, project).await?;
    Ok(Json(ProjectResponse { project: detail }))
}

/// GET /api/user/publish-toggle/:id
pub async fn handle_publish_toggle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let project = store::find_owned_project(&state.db, project_id, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    store::set_published(&state.db, project_id, !project.is_published).await?;

    let message = if project.is_published {
        "Project Unpublished".to_string()
    } else {
        "Project Published Successfully".to_string()
    };
    Ok(Json(MessageResponse { message }))
}

// ───────────────────────────── project routes ─────────────────────────────

/// POST /api/project/revision/:id
pub async fn handle_revision(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Json(req): Json<RevisionRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let detail = revision::revise_project(
        &state.db,
        state.llm.as_ref(),
        project_id,
        &auth.user_id,
        &req.message,
    )
    .await?;
    Ok(Json(ProjectResponse { project: detail }))
}

/// PUT /api/project/save/:id
/// Manual save from the editor: overwrites the current code and detaches the
/// version pointer (empty string). Creates no Version and costs nothing.
pub async fn handle_save(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Json(req): Json<SaveCodeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if req.code.is_empty() {
        return Err(AppError::Validation("Code is required".to_string()));
    }

    store::find_owned_project(&state.db, project_id, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    store::set_current_version(&state.db, project_id, &req.code, "").await?;

    Ok(Json(MessageResponse {
        message: "Project saved successfully".to_string(),
    }))
}

/// GET /api/project/rollback/:id/:version_id
/// Moves the pointer to an older Version. Appends a chat entry, creates no
/// Version, charges nothing.
pub async fn handle_rollback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, version_id)): Path<(Uuid, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    store::find_owned_project(&state.db, project_id, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let versions = store::list_versions(&state.db, project_id).await?;
    let target_id = Uuid::parse_str(&version_id).ok();
    let version = target_id
        .and_then(|vid| versions.into_iter().find(|v| v.id == vid))
        .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;

    store::set_current_version(&state.db, project_id, &version.code, &version.id.to_string())
        .await?;
    store::append_conversation(
        &state.db,
        project_id,
        "assistant",
        "I've rolled back your website to the selected version. You can now preview it",
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "Version rolled back successfully".to_string(),
    }))
}

/// DELETE /api/project/:id
/// Deleting is idempotent from the client's point of view: removing an
/// already-gone project still reports success.
pub async fn handle_delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let project = store::find_owned_project(&state.db, project_id, &auth.user_id).await?;
    if project.is_some() {
        store::delete_project(&state.db, project_id).await?;
    }
    Ok(Json(MessageResponse {
        message: "Project deleted successfully".to_string(),
    }))
}

// ──────────────────────────── published routes ────────────────────────────

/// GET /api/project/published
pub async fn handle_list_published(
    State(state): State<AppState>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects = store::list_published_projects(&state.db).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// GET /api/project/published/:id
/// Anonymous. A project is only served while it is published and has code;
/// anything else is indistinguishable from a missing project.
pub async fn handle_get_published(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<PublishedCodeResponse>, AppError> {
    let project = store::find_project(&state.db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    if !project.is_published {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    let code = project
        .current_code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(PublishedCodeResponse { code }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_response_uses_camel_case_id() {
        let response = CreateProjectResponse {
            project_id: Uuid::nil(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(
            value.get("projectId").is_some(),
            "unexpected wire shape for {response:?}"
        );
        assert!(value.get("project_id").is_none());
    }

    #[test]
    fn test_revision_request_deserializes_message() {
        let request: RevisionRequest =
            serde_json::from_str(r#"{"message":"Make the header blue"}"#).unwrap();
        assert_eq!(request.message, "Make the header blue");
        assert!(format!("{request:?}").contains("Make the header blue"));
    }
}
