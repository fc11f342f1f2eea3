use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A website project aggregate.
///
/// `current_version_index` is TEXT, not a foreign key: the empty string marks
/// the "detached" state after a manual save, which is distinct from the NULL
/// `current_code` of a project whose first generation is still pending.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub initial_prompt: String,
    pub current_code: Option<String>,
    pub current_version_index: String,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry in a project's chat log. Append-only, ordered by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationRow {
    pub id: Uuid,
    pub project_id: Uuid,
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One immutable snapshot of generated code. Append-only: rollback moves the
/// project pointer, it never rewrites or forks this history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VersionRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub code: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Full project payload for the workspace view: the aggregate plus its chat
/// log and version history, both ascending.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectRow,
    pub conversation: Vec<ConversationRow>,
    pub versions: Vec<VersionRow>,
}
