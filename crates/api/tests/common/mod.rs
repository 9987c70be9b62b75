#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use liftlog_api::config::ServerConfig;
use liftlog_api::router::build_app_router;
use liftlog_api::state::AppState;
use liftlog_core::attribute::{Category, Equipment, Force, Level, Mechanic, Muscle};
use liftlog_core::image_store::ImageStore;
use liftlog_core::types::DbId;
use liftlog_db::filter::ExerciseFilter;
use liftlog_db::models::exercise::{Exercise, ExerciseDraft};
use liftlog_db::store::{ExerciseStore, StoreError};

// ---------------------------------------------------------------------------
// In-memory exercise store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreInner {
    rows: Vec<Exercise>,
    next_id: DbId,
    calls: Vec<String>,
    fail_list: bool,
    fail_delete: bool,
    fail_health: bool,
}

/// [`ExerciseStore`] over a `Vec`, recording every call it receives.
#[derive(Default)]
pub struct MemoryExerciseStore {
    inner: Mutex<StoreInner>,
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

impl MemoryExerciseStore {
    /// Store pre-populated with `drafts`, assigned ids 1, 2, ... in order.
    pub fn with(drafts: Vec<ExerciseDraft>) -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            for draft in drafts {
                insert(&mut inner, &draft);
            }
        }
        store
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn rows(&self) -> Vec<Exercise> {
        self.inner.lock().unwrap().rows.clone()
    }

    pub fn fail_list(&self) {
        self.inner.lock().unwrap().fail_list = true;
    }

    pub fn fail_delete(&self) {
        self.inner.lock().unwrap().fail_delete = true;
    }

    pub fn fail_health(&self) {
        self.inner.lock().unwrap().fail_health = true;
    }

    fn record(&self, call: String) -> std::sync::MutexGuard<'_, StoreInner> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        inner
    }
}

fn insert(inner: &mut StoreInner, draft: &ExerciseDraft) -> Exercise {
    inner.next_id += 1;
    let now = chrono::Utc::now();
    let exercise = Exercise {
        id: inner.next_id,
        created_at: now,
        updated_at: now,
        name: draft.name.clone(),
        force: draft.force,
        level: draft.level,
        mechanic: draft.mechanic,
        category: draft.category,
        primary_muscle: draft.primary_muscle,
        secondary_muscles: draft.secondary_muscles.clone(),
        equipment: draft.equipment.clone(),
        instructions: draft.instructions.clone(),
        images: draft.images.clone(),
    };
    inner.rows.push(exercise.clone());
    exercise
}

#[async_trait]
impl ExerciseStore for MemoryExerciseStore {
    async fn list(&self) -> Result<Vec<Exercise>, StoreError> {
        let inner = self.record("list".to_string());
        if inner.fail_list {
            return Err(unavailable());
        }
        Ok(inner.rows.clone())
    }

    async fn filter(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, StoreError> {
        let inner = self.record("filter".to_string());
        if inner.fail_list {
            return Err(unavailable());
        }
        Ok(inner.rows.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    async fn get(&self, id: DbId) -> Result<Exercise, StoreError> {
        let inner = self.record(format!("get:{id}"));
        inner
            .rows
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, draft: &ExerciseDraft) -> Result<Exercise, StoreError> {
        let mut inner = self.record(format!("create:{}", draft.name));
        if inner.rows.iter().any(|e| e.name == draft.name) {
            return Err(StoreError::DuplicateName(draft.name.clone()));
        }
        Ok(insert(&mut inner, draft))
    }

    async fn update(&self, id: DbId, draft: &ExerciseDraft) -> Result<Exercise, StoreError> {
        let mut inner = self.record(format!("update:{id}"));
        let row = inner
            .rows
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        row.name = draft.name.clone();
        row.force = draft.force;
        row.level = draft.level;
        row.mechanic = draft.mechanic;
        row.category = draft.category;
        row.primary_muscle = draft.primary_muscle;
        row.secondary_muscles = draft.secondary_muscles.clone();
        row.equipment = draft.equipment.clone();
        row.instructions = draft.instructions.clone();
        row.images = draft.images.clone();
        row.updated_at = chrono::Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: DbId) -> Result<(), StoreError> {
        let mut inner = self.record(format!("delete:{id}"));
        if inner.fail_delete {
            return Err(unavailable());
        }
        let before = inner.rows.len();
        inner.rows.retain(|e| e.id != id);
        if inner.rows.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn count_by_name(&self, name: &str, exclude_id: Option<DbId>) -> Result<i64, StoreError> {
        let inner = self.record(format!("count:{name}"));
        let count = inner
            .rows
            .iter()
            .filter(|e| e.name == name && Some(e.id) != exclude_id)
            .count();
        Ok(count as i64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.inner.lock().unwrap().fail_health {
            return Err(unavailable());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recording image store
// ---------------------------------------------------------------------------

/// [`ImageStore`] that only records `save:{key}` / `remove:{key}` events.
#[derive(Default)]
pub struct RecordingImageStore {
    events: Mutex<Vec<String>>,
    saves: Mutex<usize>,
    fail_save_at: Option<usize>,
}

impl RecordingImageStore {
    /// Fail the `n`-th (0-based) save call.
    pub fn failing_save_at(n: usize) -> Self {
        Self {
            fail_save_at: Some(n),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn save(&self, key: &str, _bytes: &[u8]) -> io::Result<()> {
        self.events.lock().unwrap().push(format!("save:{key}"));
        let mut saves = self.saves.lock().unwrap();
        let n = *saves;
        *saves += 1;
        if self.fail_save_at == Some(n) {
            return Err(io::Error::other("disk full"));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.events.lock().unwrap().push(format!("remove:{key}"));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn draft(name: &str) -> ExerciseDraft {
    ExerciseDraft {
        name: name.to_string(),
        force: Force::Push,
        level: Level::Easy,
        mechanic: Mechanic::Compound,
        category: Category::Strength,
        primary_muscle: Muscle::Chest,
        secondary_muscles: Default::default(),
        equipment: [Equipment::Barbell].into_iter().collect(),
        instructions: "Do it.".to_string(),
        images: Vec::new(),
    }
}

pub fn draft_with_images(name: &str, images: &[&str]) -> ExerciseDraft {
    let mut d = draft(name);
    d.images = images.iter().map(|k| k.to_string()).collect();
    d
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(image_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8080".to_string()],
        request_timeout_secs: 30,
        image_dir,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Build the full application router around the given doubles.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack.
pub fn build_test_app(store: Arc<MemoryExerciseStore>, images: Arc<RecordingImageStore>) -> Router {
    build_app_with(store, images, test_config(PathBuf::from("./does-not-exist")))
}

pub fn build_app_with(
    store: Arc<dyn ExerciseStore>,
    images: Arc<dyn ImageStore>,
    config: ServerConfig,
) -> Router {
    let state = AppState {
        exercises: store,
        images,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "liftlog-test-boundary";

/// Hand-assembled `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

/// A complete exercise form for `name`.
pub fn exercise_form(name: &str) -> MultipartBody {
    MultipartBody::new()
        .text("name", name)
        .text("force", "0")
        .text("level", "1")
        .text("mechanic", "0")
        .text("category", "1")
        .text("primary", "2")
        .text("equipment", "1")
        .text("instructions", "Do it.")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_form(app: Router, uri: &str, body: MultipartBody, validation_only: bool) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if validation_only {
        builder = builder.header("x-validation-only", "true");
    }
    let request = builder.body(Body::from(body.finish())).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
