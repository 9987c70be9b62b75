//! Route definitions for the exercise catalog.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::exercise;
use crate::state::AppState;

/// Exercise routes, mounted at the root.
///
/// ```text
/// GET    /exercise/list            -> list
/// POST   /exercise/list            -> filter
/// GET    /exercise                 -> new_form
/// GET    /exercise/attributes      -> attributes
/// POST   /exercise/validate        -> validate_create
/// GET    /exercise/{id}            -> edit_form
/// DELETE /exercise/{id}            -> delete
/// POST   /exercise/{id}/validate   -> validate_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/exercise/list", get(exercise::list).post(exercise::filter))
        .route("/exercise", get(exercise::new_form))
        .route("/exercise/attributes", get(exercise::attributes))
        .route("/exercise/validate", post(exercise::validate_create))
        .route(
            "/exercise/{id}",
            get(exercise::edit_form).delete(exercise::delete),
        )
        .route("/exercise/{id}/validate", post(exercise::validate_update))
}
