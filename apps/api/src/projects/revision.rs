//! Chat-driven revision of an existing project.
//!
//! Ordered durable side effects:
//! 1. user conversation entry (raw message)
//! 2. credit debit (before any external call)
//! 3. prompt enhancement call
//! 4. two assistant entries (enhancement echo + building status)
//! 5. code generation call against the current code
//! 6. sanitize
//! 7. new Version
//! 8. assistant completion entry
//! 9. pointer update (single UPDATE, both fields)
//!
//! Any failure between the debit and the end of step 9 refunds the debit and
//! surfaces the raw error; entries and versions written before the failure
//! point stay. Once the pointer update commits, the charge is final: a failed
//! reload of the response payload is a 500 without a refund. History is
//! worth more than strict atomicity here.

use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::GenerativeBackend;
use crate::models::project::{ProjectDetail, ProjectRow};
use crate::projects::sanitize::sanitize_generated_code;
use crate::projects::store;
use crate::projects::GENERATION_COST;

pub async fn revise_project(
    pool: &PgPool,
    llm: &dyn GenerativeBackend,
    project_id: Uuid,
    user_id: &str,
    message: &str,
) -> Result<ProjectDetail, AppError> {
    let user = store::fetch_user(pool, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.credits < GENERATION_COST {
        return Err(AppError::Forbidden(
            "Add more credits to make changes".to_string(),
        ));
    }

    if message.trim().is_empty() {
        return Err(AppError::Validation("Please enter a valid prompt".to_string()));
    }

    let project = store::find_owned_project(pool, project_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    store::append_conversation(pool, project_id, "user", message).await?;

    // Pessimistic charge before the LLM is touched.
    store::debit_credits(pool, user_id, GENERATION_COST).await?;

    match run_pipeline(pool, llm, &project, message).await {
        Ok(()) => {
            // Committed and billed from here on; a failed reload is not refunded.
            let updated = store::find_owned_project(pool, project_id, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
            let detail = store::load_project_detail(pool, updated).await?;
            info!("Revision applied to project {project_id}");
            Ok(detail)
        }
        Err(e) => {
            error!("Revision failed for project {project_id}: {e}");
            if let Err(refund_err) = store::refund_credits(pool, user_id, GENERATION_COST).await {
                error!("Credit refund failed for user {user_id}: {refund_err}");
            }
            Err(e)
        }
    }
}

/// Steps 3-9. Split out so the caller can pair any failure with a refund.
async fn run_pipeline(
    pool: &PgPool,
    llm: &dyn GenerativeBackend,
    project: &ProjectRow,
    message: &str,
) -> Result<(), AppError> {
    let enhanced = llm
        .enhance_revision(message)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    store::append_conversation(
        pool,
        project.id,
        "assistant",
        &format!(r#"I've enhanced your prompt: "{enhanced}""#),
    )
    .await?;
    store::append_conversation(
        pool,
        project.id,
        "assistant",
        "I am currently building a website.",
    )
    .await?;

    let current_code = project.current_code.as_deref().unwrap_or_default();
    let raw = llm
        .revise_site(current_code, &enhanced)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    let code = sanitize_generated_code(&raw);

    let version = store::append_version(pool, project.id, &code, "Requested changes").await?;
    store::append_conversation(pool, project.id, "assistant", "I've updated your website.")
        .await?;
    store::set_current_version(pool, project.id, &code, &version.id.to_string()).await?;

    Ok(())
}
