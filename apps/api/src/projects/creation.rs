//! Project creation: respond with the new project id immediately, then
//! generate the first version in a detached task.
//!
//! Flow before the response: project row, total-creation counter, user
//! conversation entry, credit debit. Everything after (enhancement, code
//! generation, first Version, pointer update) happens in the spawned task,
//! whose failure path refunds the debit and logs. Clients observe the
//! pending phase as empty `current_code` and poll until it fills in.

use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::projects::sanitize::trim_generated_code;
use crate::projects::store;
use crate::projects::GENERATION_COST;
use crate::state::AppState;

/// Projects are named after their prompt, cut to 50 characters for list views.
const NAME_LIMIT_CHARS: usize = 50;
const NAME_HEAD_CHARS: usize = 47;

pub fn derive_project_name(initial_prompt: &str) -> String {
    if initial_prompt.chars().count() > NAME_LIMIT_CHARS {
        let head: String = initial_prompt.chars().take(NAME_HEAD_CHARS).collect();
        format!("{head}...")
    } else {
        initial_prompt.to_string()
    }
}

/// Creates the project row and schedules generation. Returns the project id
/// as soon as the debit lands; the caller must not wait for generation.
pub async fn create_project(
    state: &AppState,
    user_id: &str,
    initial_prompt: &str,
) -> Result<Uuid, AppError> {
    let user = store::fetch_user(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.credits < GENERATION_COST {
        return Err(AppError::Forbidden(
            "Add credits to create more projects".to_string(),
        ));
    }

    let name = derive_project_name(initial_prompt);
    let project = store::insert_project(&state.db, user_id, &name, initial_prompt).await?;
    store::increment_total_creation(&state.db, user_id).await?;
    store::append_conversation(&state.db, project.id, "user", initial_prompt).await?;

    // Pessimistic charge: the debit lands before any LLM work starts.
    store::debit_credits(&state.db, user_id, GENERATION_COST).await?;

    let task_state = state.clone();
    let task_user = user_id.to_string();
    let prompt = initial_prompt.to_string();
    let project_id = project.id;

    tokio::spawn(async move {
        if let Err(e) = generate_initial_site(&task_state, project_id, &prompt).await {
            error!("Initial generation failed for project {project_id}: {e}");
            if let Err(refund_err) =
                store::refund_credits(&task_state.db, &task_user, GENERATION_COST).await
            {
                error!("Credit refund failed for user {task_user}: {refund_err}");
            }
        }
    });

    Ok(project_id)
}

/// The background half of creation. Partial history written before a failure
/// stays visible; only the credits are compensated.
async fn generate_initial_site(
    state: &AppState,
    project_id: Uuid,
    initial_prompt: &str,
) -> Result<(), AppError> {
    let expanded = state
        .llm
        .expand_initial_prompt(initial_prompt)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    store::append_conversation(
        &state.db,
        project_id,
        "assistant",
        &format!(r#"I've enhanced your prompt: "{expanded}""#),
    )
    .await?;
    store::append_conversation(
        &state.db,
        project_id,
        "assistant",
        "Your web project is in progress…",
    )
    .await?;

    let raw = state
        .llm
        .generate_site(&expanded)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    let code = trim_generated_code(&raw);

    let version = store::append_version(&state.db, project_id, &code, "Initial version").await?;
    store::set_current_version(&state.db, project_id, &code, &version.id.to_string()).await?;
    store::append_conversation(&state.db, project_id, "assistant", "I've created your website.")
        .await?;

    info!(
        "Initial site generated for project {project_id} ({} chars)",
        code.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_prompt_used_verbatim() {
        assert_eq!(derive_project_name("A bakery site"), "A bakery site");
    }

    #[test]
    fn test_exactly_fifty_chars_not_truncated() {
        let prompt = "x".repeat(50);
        assert_eq!(derive_project_name(&prompt), prompt);
    }

    #[test]
    fn test_long_prompt_truncated_with_ellipsis() {
        let prompt = "x".repeat(60);
        let name = derive_project_name(&prompt);
        assert_eq!(name, format!("{}...", "x".repeat(47)));
        assert_eq!(name.chars().count(), 50);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        // 60 two-byte characters; byte-based slicing would panic or split
        // a code point.
        let prompt = "é".repeat(60);
        let name = derive_project_name(&prompt);
        assert_eq!(name.chars().count(), 50);
        assert!(name.ends_with("..."));
    }
}
