//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row. Insert and replace payloads come from `liftlog_core`.

pub mod exercise;
