//! HTTP handlers for the fullscreen preview: project data for the preview
//! chrome, and the assembled HTML document for the iframe.

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::project::{ProjectRow, VersionRow};
use crate::preview::fixup::fix_generated_html;
use crate::preview::script::inject_bridge_script;
use crate::projects::store;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub project: ProjectWithVersions,
}

/// The aggregate plus version history, without the chat log the fullscreen
/// preview has no use for.
#[derive(Debug, Serialize)]
pub struct ProjectWithVersions {
    #[serde(flatten)]
    pub project: ProjectRow,
    pub versions: Vec<VersionRow>,
}

/// GET /api/project/preview/:id
pub async fn handle_preview(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<PreviewResponse>, AppError> {
    let project = store::find_owned_project(&state.db, project_id, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    let versions = store::list_versions(&state.db, project_id).await?;

    Ok(Json(PreviewResponse {
        project: ProjectWithVersions { project, versions },
    }))
}

/// GET /api/project/preview/:id/html
/// Serves the current code as a renderable document: fix-up rules applied,
/// bridge script injected. The stored Version is not modified.
pub async fn handle_preview_html(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let project = store::find_owned_project(&state.db, project_id, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let code = project
        .current_code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::NotFound("Project has no generated code yet".to_string()))?;

    Ok(Html(inject_bridge_script(&fix_generated_html(code))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_preview_payload_carries_versions_but_no_chat_log() {
        let project = ProjectRow {
            id: Uuid::nil(),
            user_id: "user_1".to_string(),
            name: "Shop".to_string(),
            initial_prompt: "Build a shop".to_string(),
            current_code: Some("<html></html>".to_string()),
            current_version_index: "abc".to_string(),
            is_published: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let payload = PreviewResponse {
            project: ProjectWithVersions {
                project,
                versions: vec![],
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value["project"]["name"],
            serde_json::json!("Shop"),
            "aggregate fields not flattened in {payload:?}"
        );
        assert!(value["project"].get("versions").is_some());
        assert!(value["project"].get("conversation").is_none());
    }
}
