//! Employee repositories.
//!
//! # Responsibility
//! - Define the uniform repository contract (`employee_repo`).
//! - Provide the file-snapshot, SQLite store and SQLite adapter backends.
//! - Offer one tagged handle (`backend`) for configuration-driven callers.
//!
//! # Invariants
//! - Every backend validates input before any persistence happens.
//! - Accessors return owned copies; no backend hands out internal state.

pub mod backend;
pub mod db_adapter;
pub mod employee_repo;
pub mod snapshot;
pub mod sqlite_store;
