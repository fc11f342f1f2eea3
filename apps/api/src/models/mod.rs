// Row types mapped 1:1 to the PostgreSQL schema.
// The `users` and `sessions` tables are owned by the auth service; this
// service only reads them (plus the credits column it debits/refunds).

pub mod project;
pub mod user;
