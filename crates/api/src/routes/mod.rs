pub mod exercise;
pub mod health;

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the page route tree.
///
/// ```text
/// /                                 redirect to /exercise/list
/// /exercise/...                     exercise catalog (see routes::exercise)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/exercise/list") }))
        .merge(exercise::router())
}
