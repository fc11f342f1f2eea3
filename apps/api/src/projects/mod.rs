// Project workflows: creation, revision, rollback, save, publish, delete.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod creation;
pub mod handlers;
pub mod revision;
pub mod sanitize;
pub mod store;

/// Credits charged for every generation (creation or revision).
/// Debited before the LLM is called; refunded if anything fails afterwards.
pub const GENERATION_COST: i32 = 5;
