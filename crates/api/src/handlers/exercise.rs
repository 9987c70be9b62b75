//! Handlers for the `/exercise` pages.
//!
//! Every page returns the state the front end needs to render it inside a
//! `{ "data": ... }` envelope. Form submissions always answer 200 with the
//! form state unless the record was persisted, in which case the response
//! carries an `HX-Location` header pointing back at the list.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use liftlog_core::attribute::{possible_values, PossibleValues};
use liftlog_core::image_store::remove_images;
use liftlog_core::types::DbId;
use liftlog_db::models::exercise::Exercise;
use serde::Serialize;

use crate::error::AppResult;
use crate::form::{bind_filter, read_multipart, ExerciseForm};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow::{ExerciseWorkflow, FormMode, Outcome, Submission};

/// Request header selecting a dry run of the workflow.
pub const VALIDATION_ONLY: HeaderName = HeaderName::from_static("x-validation-only");

/// Client-side redirect issued after a successful save.
pub const HX_LOCATION: HeaderName = HeaderName::from_static("hx-location");

const LIST_LOCATION: &str = r##"{"path":"/exercise/list", "target":"#content"}"##;

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// State of the exercise listing.
#[derive(Debug, Serialize)]
pub struct ExerciseList {
    pub exercises: Vec<Exercise>,
    /// Set when the listing could not be loaded; `exercises` is then empty.
    pub error: Option<String>,
}

/// State of the create/edit form.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub input: ExerciseForm,
    pub error: Option<String>,
    pub button: &'static str,
    pub validation_link: String,
    pub possible_values: &'static PossibleValues,
}

impl FormView {
    fn new(input: ExerciseForm, mode: FormMode, error: Option<String>) -> Self {
        Self {
            input,
            error,
            button: mode.button(),
            validation_link: mode.validation_link(),
            possible_values: possible_values(),
        }
    }
}

fn listing(result: Result<Vec<Exercise>, String>) -> Json<DataResponse<ExerciseList>> {
    let data = match result {
        Ok(exercises) => ExerciseList {
            exercises,
            error: None,
        },
        Err(error) => ExerciseList {
            exercises: Vec::new(),
            error: Some(error),
        },
    };
    Json(DataResponse { data })
}

async fn load_all(state: &AppState) -> Result<Vec<Exercise>, String> {
    state.exercises.list().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list exercises");
        e.to_string()
    })
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /exercise/list
pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    listing(load_all(&state).await)
}

/// POST /exercise/list
///
/// Filter the listing with the submitted filter form. Unselected fields do
/// not constrain the result.
pub async fn filter(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let data = read_multipart(multipart).await?;

    let result = match bind_filter(&data) {
        Ok(filter) => state.exercises.filter(&filter).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to filter exercises");
            e.to_string()
        }),
        Err(e) => {
            tracing::debug!(error = %e, "Filter form failed to bind");
            Err(e.to_string())
        }
    };

    Ok(listing(result))
}

// ---------------------------------------------------------------------------
// Form pages
// ---------------------------------------------------------------------------

/// GET /exercise
pub async fn new_form() -> impl IntoResponse {
    Json(DataResponse {
        data: FormView::new(ExerciseForm::default(), FormMode::Create, None),
    })
}

/// GET /exercise/attributes
pub async fn attributes() -> impl IntoResponse {
    Json(DataResponse {
        data: possible_values(),
    })
}

/// GET /exercise/{id}
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let exercise = state.exercises.get(id).await?;
    Ok(Json(DataResponse {
        data: FormView::new(
            ExerciseForm::from_exercise(&exercise),
            FormMode::Update(id),
            None,
        ),
    }))
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// POST /exercise/validate
pub async fn validate_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Response> {
    submit(&state, FormMode::Create, &headers, multipart).await
}

/// POST /exercise/{id}/validate
pub async fn validate_update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Response> {
    submit(&state, FormMode::Update(id), &headers, multipart).await
}

async fn submit(
    state: &AppState,
    mode: FormMode,
    headers: &HeaderMap,
    multipart: Multipart,
) -> AppResult<Response> {
    let data = read_multipart(multipart).await?;
    let submission = Submission {
        form: ExerciseForm::from_form_data(&data),
        files: data.files,
        validation_only: is_validation_only(headers),
    };

    let workflow = ExerciseWorkflow::new(state.exercises.as_ref(), state.images.as_ref());
    let response = match workflow.submit(mode, submission).await {
        Outcome::Persisted(exercise) => (
            [(HX_LOCATION, HeaderValue::from_static(LIST_LOCATION))],
            Json(DataResponse { data: exercise }),
        )
            .into_response(),
        Outcome::Rejected(rejection) => Json(DataResponse {
            data: FormView::new(
                rejection.form,
                rejection.mode,
                rejection.error.map(|e| e.to_string()),
            ),
        })
        .into_response(),
    };
    Ok(response)
}

fn is_validation_only(headers: &HeaderMap) -> bool {
    headers
        .get(VALIDATION_ONLY)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /exercise/{id}
///
/// Removes the record, then its images. Failures are logged and the
/// listing is re-rendered from whatever the store currently holds.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> impl IntoResponse {
    match state.exercises.get(id).await {
        Ok(exercise) => match state.exercises.delete(id).await {
            Ok(()) => {
                let failed = remove_images(state.images.as_ref(), &exercise.images).await;
                tracing::info!(
                    exercise_id = id,
                    images_left = failed.len(),
                    "Exercise deleted"
                );
            }
            Err(e) => tracing::error!(exercise_id = id, error = %e, "Failed to delete exercise"),
        },
        Err(e) => tracing::warn!(exercise_id = id, error = %e, "Cannot delete exercise"),
    }

    listing(load_all(&state).await)
}
