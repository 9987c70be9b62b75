use std::sync::Arc;

use liftlog_core::image_store::ImageStore;
use liftlog_db::store::ExerciseStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Exercise persistence (PostgreSQL in production).
    pub exercises: Arc<dyn ExerciseStore>,
    /// Uploaded image storage (local filesystem in production).
    pub images: Arc<dyn ImageStore>,
}
