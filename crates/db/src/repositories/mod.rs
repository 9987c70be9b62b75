//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod exercise_repo;

pub use exercise_repo::ExerciseRepo;
