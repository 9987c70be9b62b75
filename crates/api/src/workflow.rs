//! Create/update workflow for a single exercise form submission.
//!
//! ```text
//! Bound ──▶ Validated ──▶ Persisted
//!   │           │
//!   └───────────┴──────▶ Rejected
//! ```
//!
//! Steps run strictly in order and each one waits for the previous storage
//! or file call to finish. Every failure ends the request in
//! [`Outcome::Rejected`]; nothing propagates past [`ExerciseWorkflow::submit`].
//!
//! Known limitation: if saving the n-th uploaded image fails, images saved
//! before it stay in the image store without a record referencing them.

use liftlog_core::image_store::{remove_images, save_images, ImageStore, ImageStoreError, UploadedImage};
use liftlog_core::types::DbId;
use liftlog_db::models::exercise::{Exercise, ExerciseDraft};
use liftlog_db::store::{ExerciseStore, StoreError};

use crate::form::ExerciseForm;

/// Which path a submission takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update(DbId),
}

impl FormMode {
    /// Label of the form's submit button.
    pub fn button(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update(_) => "Update",
        }
    }

    /// Endpoint the form posts to for live validation and submission.
    pub fn validation_link(self) -> String {
        match self {
            Self::Create => "/exercise/validate".to_string(),
            Self::Update(id) => format!("/exercise/{id}/validate"),
        }
    }

    fn id(self) -> Option<DbId> {
        match self {
            Self::Create => None,
            Self::Update(id) => Some(id),
        }
    }
}

/// One form submission as received from the client.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub form: ExerciseForm,
    pub files: Vec<UploadedImage>,
    /// Dry run for live form feedback; never writes anything.
    pub validation_only: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Binding(String),

    #[error("exercise with name '{0}' already exists")]
    DuplicateName(String),

    #[error("exercise with id {0} not found")]
    NotFound(DbId),

    #[error(transparent)]
    Upload(#[from] ImageStoreError),

    #[error("storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::DuplicateName(name) => Self::DuplicateName(name),
            other @ StoreError::Database(_) => Self::Storage(other),
        }
    }
}

/// A submission that did not persist, with everything needed to redisplay it.
#[derive(Debug)]
pub struct Rejection {
    pub form: ExerciseForm,
    pub mode: FormMode,
    /// `None` for a validation-only request whose form is well formed.
    pub error: Option<WorkflowError>,
}

#[derive(Debug)]
pub enum Outcome {
    Persisted(Exercise),
    Rejected(Rejection),
}

/// Orchestrates binding, the duplicate check, image handling and the write.
pub struct ExerciseWorkflow<'a> {
    store: &'a dyn ExerciseStore,
    images: &'a dyn ImageStore,
}

impl<'a> ExerciseWorkflow<'a> {
    pub fn new(store: &'a dyn ExerciseStore, images: &'a dyn ImageStore) -> Self {
        Self { store, images }
    }

    pub async fn submit(&self, mode: FormMode, submission: Submission) -> Outcome {
        let Submission {
            mut form,
            files,
            validation_only,
        } = submission;

        let draft = match form.bind() {
            Ok(draft) => draft,
            Err(msg) => {
                tracing::debug!(error = %msg, "Exercise form failed to bind");
                return Outcome::Rejected(Rejection {
                    form,
                    mode,
                    error: Some(WorkflowError::Binding(msg)),
                });
            }
        };

        if validation_only {
            return Outcome::Rejected(Rejection {
                form,
                mode,
                error: None,
            });
        }

        let result = match mode {
            FormMode::Create => self.create(draft, &files).await,
            FormMode::Update(id) => self.update(id, draft, &files).await,
        };

        match result {
            Ok(exercise) => {
                tracing::info!(exercise_id = exercise.id, name = %exercise.name, "Exercise saved");
                Outcome::Persisted(exercise)
            }
            Err(err) => {
                if let WorkflowError::Upload(ImageStoreError::Save { saved, .. }) = &err {
                    form.images = saved.clone();
                }
                tracing::warn!(exercise_id = ?mode.id(), error = %err, "Exercise submission rejected");
                Outcome::Rejected(Rejection {
                    form,
                    mode,
                    error: Some(err),
                })
            }
        }
    }

    async fn create(
        &self,
        mut draft: ExerciseDraft,
        files: &[UploadedImage],
    ) -> Result<Exercise, WorkflowError> {
        self.ensure_unique(&draft.name, None).await?;
        draft.images = save_images(self.images, &draft.name, files).await?;
        Ok(self.store.create(&draft).await?)
    }

    async fn update(
        &self,
        id: DbId,
        mut draft: ExerciseDraft,
        files: &[UploadedImage],
    ) -> Result<Exercise, WorkflowError> {
        let existing = self.store.get(id).await?;
        self.ensure_unique(&draft.name, Some(id)).await?;

        draft.images = if files.is_empty() {
            existing.images
        } else {
            // Old keys may collide with the new ones, so remove first.
            remove_images(self.images, &existing.images).await;
            save_images(self.images, &draft.name, files).await?
        };

        Ok(self.store.update(id, &draft).await?)
    }

    async fn ensure_unique(&self, name: &str, exclude_id: Option<DbId>) -> Result<(), WorkflowError> {
        let count = self.store.count_by_name(name, exclude_id).await?;
        if count > 0 {
            return Err(WorkflowError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_labels_and_links() {
        assert_eq!(FormMode::Create.button(), "Create");
        assert_eq!(FormMode::Create.validation_link(), "/exercise/validate");
        assert_eq!(FormMode::Update(4).button(), "Update");
        assert_eq!(FormMode::Update(4).validation_link(), "/exercise/4/validate");
    }

    #[test]
    fn store_errors_keep_their_meaning() {
        assert!(matches!(
            WorkflowError::from(StoreError::NotFound(2)),
            WorkflowError::NotFound(2)
        ));
        let dup = WorkflowError::from(StoreError::DuplicateName("bla".into()));
        assert_eq!(dup.to_string(), "exercise with name 'bla' already exists");
        assert!(matches!(
            WorkflowError::from(StoreError::Database(sqlx::Error::PoolClosed)),
            WorkflowError::Storage(_)
        ));
    }
}
