#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the auth service's `users` table.
/// `id` is a string, not a UUID — the auth library generates its own ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: String,
    pub credits: i32,
    pub total_creation: i32,
}

/// A row from the auth service's `sessions` table, reduced to the columns
/// the session extractor needs.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}
