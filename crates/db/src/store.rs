//! Object-safe exercise storage capability.
//!
//! [`ExerciseRepo`] is the PostgreSQL implementation detail; callers that
//! need to swap storage (the HTTP layer and its tests) go through
//! [`ExerciseStore`] instead.

use async_trait::async_trait;
use liftlog_core::types::DbId;
use sqlx::PgPool;

use crate::filter::ExerciseFilter;
use crate::models::exercise::{Exercise, ExerciseDraft};
use crate::repositories::ExerciseRepo;

/// Unique constraint guarding exercise names.
pub const NAME_CONSTRAINT: &str = "uq_exercises_name";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("exercise with id {0} not found")]
    NotFound(DbId),

    /// The write lost a race with another request using the same name.
    #[error("exercise with name '{0}' already exists")]
    DuplicateName(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ExerciseStore: Send + Sync {
    /// Every exercise, ordered by id.
    async fn list(&self) -> Result<Vec<Exercise>, StoreError>;

    /// Exercises passing `filter`, ordered by id.
    async fn filter(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, StoreError>;

    async fn get(&self, id: DbId) -> Result<Exercise, StoreError>;

    /// Insert a new record; id and timestamps are assigned here.
    async fn create(&self, draft: &ExerciseDraft) -> Result<Exercise, StoreError>;

    /// Replace every mutable field of record `id`.
    async fn update(&self, id: DbId, draft: &ExerciseDraft) -> Result<Exercise, StoreError>;

    async fn delete(&self, id: DbId) -> Result<(), StoreError>;

    /// Exact, case-sensitive name matches, ignoring `exclude_id` if given.
    async fn count_by_name(&self, name: &str, exclude_id: Option<DbId>) -> Result<i64, StoreError>;

    /// Cheap round trip proving the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// [`ExerciseStore`] backed by the connection pool.
#[derive(Debug, Clone)]
pub struct PgExerciseStore {
    pool: PgPool,
}

impl PgExerciseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a name uniqueness violation to [`StoreError::DuplicateName`].
fn classify_write_error(err: sqlx::Error, name: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(NAME_CONSTRAINT) {
            return StoreError::DuplicateName(name.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ExerciseStore for PgExerciseStore {
    async fn list(&self) -> Result<Vec<Exercise>, StoreError> {
        Ok(ExerciseRepo::list(&self.pool).await?)
    }

    async fn filter(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, StoreError> {
        Ok(ExerciseRepo::filter(&self.pool, filter).await?)
    }

    async fn get(&self, id: DbId) -> Result<Exercise, StoreError> {
        ExerciseRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, draft: &ExerciseDraft) -> Result<Exercise, StoreError> {
        ExerciseRepo::create(&self.pool, draft)
            .await
            .map_err(|e| classify_write_error(e, &draft.name))
    }

    async fn update(&self, id: DbId, draft: &ExerciseDraft) -> Result<Exercise, StoreError> {
        ExerciseRepo::update(&self.pool, id, draft)
            .await
            .map_err(|e| classify_write_error(e, &draft.name))?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: DbId) -> Result<(), StoreError> {
        if ExerciseRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    async fn count_by_name(&self, name: &str, exclude_id: Option<DbId>) -> Result<i64, StoreError> {
        Ok(ExerciseRepo::count_by_name(&self.pool, name, exclude_id).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
