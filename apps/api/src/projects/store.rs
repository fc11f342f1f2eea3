// Data access for projects, conversations, versions, and user credits.
//
// CRITICAL: `conversations` and `versions` are append-only. Never UPDATE or
// DELETE individual rows (project deletion removes whole histories). The
// project pointer (`current_code` + `current_version_index`) moves only
// through `set_current_version`, a single UPDATE, so readers never observe
// one field updated without the other.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::project::{ConversationRow, ProjectDetail, ProjectRow, VersionRow};
use crate::models::user::UserRow;

pub async fn fetch_user(pool: &PgPool, user_id: &str) -> sqlx::Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>("SELECT id, credits, total_creation FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn debit_credits(pool: &PgPool, user_id: &str, amount: i32) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET credits = credits - $2 WHERE id = $1")
        .bind(user_id)
        .bind(amount)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn refund_credits(pool: &PgPool, user_id: &str, amount: i32) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET credits = credits + $2 WHERE id = $1")
        .bind(user_id)
        .bind(amount)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn increment_total_creation(pool: &PgPool, user_id: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET total_creation = total_creation + 1 WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Inserts a new project in the "pending" state: no code, empty pointer.
pub async fn insert_project(
    pool: &PgPool,
    user_id: &str,
    name: &str,
    initial_prompt: &str,
) -> sqlx::Result<ProjectRow> {
    sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects
            (id, user_id, name, initial_prompt, current_code, current_version_index,
             is_published, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NULL, '', FALSE, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .bind(initial_prompt)
    .fetch_one(pool)
    .await
}

/// Fetches a project only if it belongs to the given user.
pub async fn find_owned_project(
    pool: &PgPool,
    project_id: Uuid,
    user_id: &str,
) -> sqlx::Result<Option<ProjectRow>> {
    sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1 AND user_id = $2")
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Fetches a project regardless of owner. Used by the public published view.
pub async fn find_project(pool: &PgPool, project_id: Uuid) -> sqlx::Result<Option<ProjectRow>> {
    sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await
}

/// All projects of a user, most recently touched first.
pub async fn list_projects(pool: &PgPool, user_id: &str) -> sqlx::Result<Vec<ProjectRow>> {
    sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list_published_projects(pool: &PgPool) -> sqlx::Result<Vec<ProjectRow>> {
    sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE is_published = TRUE ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_conversation(
    pool: &PgPool,
    project_id: Uuid,
) -> sqlx::Result<Vec<ConversationRow>> {
    sqlx::query_as::<_, ConversationRow>(
        "SELECT * FROM conversations WHERE project_id = $1 ORDER BY timestamp ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn list_versions(pool: &PgPool, project_id: Uuid) -> sqlx::Result<Vec<VersionRow>> {
    sqlx::query_as::<_, VersionRow>(
        "SELECT * FROM versions WHERE project_id = $1 ORDER BY timestamp ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Appends one entry to a project's chat log.
pub async fn append_conversation(
    pool: &PgPool,
    project_id: Uuid,
    role: &str,
    content: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO conversations (id, project_id, role, content, timestamp)
        VALUES ($1, $2, $3, $4, now())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(role)
    .bind(content)
    .execute(pool)
    .await?;
    Ok(())
}

/// Appends one immutable code snapshot to a project's version history.
pub async fn append_version(
    pool: &PgPool,
    project_id: Uuid,
    code: &str,
    description: &str,
) -> sqlx::Result<VersionRow> {
    sqlx::query_as::<_, VersionRow>(
        r#"
        INSERT INTO versions (id, project_id, code, description, timestamp)
        VALUES ($1, $2, $3, $4, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(code)
    .bind(description)
    .fetch_one(pool)
    .await
}

/// Moves the project pointer. Both fields change in one UPDATE; a manual
/// save passes `""` as the version index (detached state).
pub async fn set_current_version(
    pool: &PgPool,
    project_id: Uuid,
    code: &str,
    version_index: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE projects
        SET current_code = $2, current_version_index = $3, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(project_id)
    .bind(code)
    .bind(version_index)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_published(pool: &PgPool, project_id: Uuid, published: bool) -> sqlx::Result<()> {
    sqlx::query("UPDATE projects SET is_published = $2, updated_at = now() WHERE id = $1")
        .bind(project_id)
        .bind(published)
        .execute(pool)
        .await?;
    Ok(())
}

/// Removes a project and its histories. Child rows go first; there is no
/// ON DELETE CASCADE on these tables.
pub async fn delete_project(pool: &PgPool, project_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM conversations WHERE project_id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM versions WHERE project_id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Assembles the full workspace payload: aggregate + chat log + versions.
pub async fn load_project_detail(pool: &PgPool, project: ProjectRow) -> sqlx::Result<ProjectDetail> {
    let conversation = list_conversation(pool, project.id).await?;
    let versions = list_versions(pool, project.id).await?;
    Ok(ProjectDetail {
        project,
        conversation,
        versions,
    })
}
