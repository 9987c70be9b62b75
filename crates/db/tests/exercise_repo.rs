//! Integration tests for the exercise repository.
//!
//! Exercises the full repository layer against a real database:
//! - Create / read / update / delete
//! - Ordering of list and filter results
//! - Subset semantics of the JSONB set filters
//! - Unique name constraint and the store's duplicate mapping

use std::collections::BTreeSet;

use assert_matches::assert_matches;
use liftlog_core::attribute::{Category, Equipment, Force, Level, Mechanic, Muscle};
use liftlog_db::filter::ExerciseFilter;
use liftlog_db::models::exercise::ExerciseDraft;
use liftlog_db::repositories::ExerciseRepo;
use liftlog_db::store::{ExerciseStore, PgExerciseStore, StoreError};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_exercise(name: &str, secondary: &[Muscle], equipment: &[Equipment]) -> ExerciseDraft {
    ExerciseDraft {
        name: name.to_string(),
        force: Force::Push,
        level: Level::Easy,
        mechanic: Mechanic::Compound,
        category: Category::Strength,
        primary_muscle: Muscle::Chest,
        secondary_muscles: secondary.iter().copied().collect(),
        equipment: equipment.iter().copied().collect(),
        instructions: "Do it.".to_string(),
        images: Vec::new(),
    }
}

fn names(exercises: &[liftlog_db::models::exercise::Exercise]) -> Vec<&str> {
    exercises.iter().map(|e| e.name.as_str()).collect()
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_on_empty_table_is_empty(pool: PgPool) {
    let exercises = ExerciseRepo::list(&pool).await.unwrap();
    assert!(exercises.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_round_trips_every_column(pool: PgPool) {
    let mut input = new_exercise("Bench Press", &[Muscle::Triceps, Muscle::Shoulders], &[Equipment::Barbell]);
    input.images = vec!["Bench Press_0".to_string(), "Bench Press_1".to_string()];

    let created = ExerciseRepo::create(&pool, &input).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.to_draft(), input);

    let found = ExerciseRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(found, created);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_replaces_fields_and_bumps_updated_at(pool: PgPool) {
    let created = ExerciseRepo::create(&pool, &new_exercise("Row", &[], &[])).await.unwrap();

    let mut input = new_exercise("Bent-over Row", &[Muscle::Biceps], &[Equipment::Barbell]);
    input.force = Force::Pull;
    let updated = ExerciseRepo::update(&pool, created.id, &input)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.to_draft(), input);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_returns_none(pool: PgPool) {
    let result = ExerciseRepo::update(&pool, 999_999, &new_exercise("Ghost", &[], &[]))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_reports_whether_a_row_was_removed(pool: PgPool) {
    let created = ExerciseRepo::create(&pool, &new_exercise("Dip", &[], &[])).await.unwrap();
    assert!(ExerciseRepo::delete(&pool, created.id).await.unwrap());
    assert!(!ExerciseRepo::delete(&pool, created.id).await.unwrap());
    assert!(ExerciseRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn count_by_name_is_exact_and_can_exclude_self(pool: PgPool) {
    let created = ExerciseRepo::create(&pool, &new_exercise("bla", &[], &[])).await.unwrap();

    assert_eq!(ExerciseRepo::count_by_name(&pool, "bla", None).await.unwrap(), 1);
    assert_eq!(ExerciseRepo::count_by_name(&pool, "Bla", None).await.unwrap(), 0);
    assert_eq!(ExerciseRepo::count_by_name(&pool, "bl", None).await.unwrap(), 0);
    assert_eq!(
        ExerciseRepo::count_by_name(&pool, "bla", Some(created.id)).await.unwrap(),
        0
    );
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_filter_matches_list(pool: PgPool) {
    for name in ["c", "a", "b"] {
        ExerciseRepo::create(&pool, &new_exercise(name, &[], &[])).await.unwrap();
    }

    let listed = ExerciseRepo::list(&pool).await.unwrap();
    let filtered = ExerciseRepo::filter(&pool, &ExerciseFilter::default()).await.unwrap();
    assert_eq!(filtered, listed);
    assert_eq!(names(&listed), vec!["c", "a", "b"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn secondary_muscle_filter_uses_subset_semantics(pool: PgPool) {
    ExerciseRepo::create(&pool, &new_exercise("none", &[], &[])).await.unwrap();
    ExerciseRepo::create(&pool, &new_exercise("two-five", &[Muscle::Adductors, Muscle::Chest], &[]))
        .await
        .unwrap();

    let wide = ExerciseFilter {
        secondary_muscles: BTreeSet::from([Muscle::Adductors, Muscle::Chest, Muscle::Hamstrings]),
        ..Default::default()
    };
    let narrow = ExerciseFilter {
        secondary_muscles: BTreeSet::from([Muscle::Adductors, Muscle::Hamstrings]),
        ..Default::default()
    };

    let found = ExerciseRepo::filter(&pool, &wide).await.unwrap();
    assert_eq!(names(&found), vec!["none", "two-five"]);

    let found = ExerciseRepo::filter(&pool, &narrow).await.unwrap();
    assert_eq!(names(&found), vec!["none"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn combined_filter_ands_every_predicate(pool: PgPool) {
    let mut squat = new_exercise("Back Squat", &[Muscle::Glutes], &[Equipment::Barbell]);
    squat.primary_muscle = Muscle::Quadriceps;
    ExerciseRepo::create(&pool, &squat).await.unwrap();
    let mut front = new_exercise("Front Squat", &[Muscle::Glutes], &[Equipment::Barbell]);
    front.primary_muscle = Muscle::Quadriceps;
    front.level = Level::Hard;
    ExerciseRepo::create(&pool, &front).await.unwrap();
    ExerciseRepo::create(&pool, &new_exercise("Push-up", &[], &[Equipment::Body]))
        .await
        .unwrap();

    let filter = ExerciseFilter {
        name: Some("Squat".to_string()),
        level: BTreeSet::from([Level::Easy, Level::Middle]),
        primary_muscle: BTreeSet::from([Muscle::Quadriceps]),
        equipment: BTreeSet::from([Equipment::Barbell, Equipment::Bench]),
        ..Default::default()
    };
    let found = ExerciseRepo::filter(&pool, &filter).await.unwrap();
    assert_eq!(names(&found), vec!["Back Squat"]);

    // Filtering in SQL and in process agree.
    let all = ExerciseRepo::list(&pool).await.unwrap();
    let in_process: Vec<_> = all.into_iter().filter(|e| filter.matches(e)).collect();
    assert_eq!(in_process, found);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn name_filter_treats_like_wildcards_literally(pool: PgPool) {
    ExerciseRepo::create(&pool, &new_exercise("100% effort", &[], &[])).await.unwrap();
    ExerciseRepo::create(&pool, &new_exercise("100 reps", &[], &[])).await.unwrap();

    let filter = ExerciseFilter {
        name: Some("0%".to_string()),
        ..Default::default()
    };
    let found = ExerciseRepo::filter(&pool, &filter).await.unwrap();
    assert_eq!(names(&found), vec!["100% effort"]);
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn store_maps_unique_violation_to_duplicate_name(pool: PgPool) {
    let store = PgExerciseStore::new(pool);
    store.create(&new_exercise("bla", &[], &[])).await.unwrap();

    let err = store.create(&new_exercise("bla", &[], &[])).await.unwrap_err();
    assert_matches!(err, StoreError::DuplicateName(name) if name == "bla");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn store_reports_missing_ids(pool: PgPool) {
    let store = PgExerciseStore::new(pool);
    assert_matches!(store.get(42).await, Err(StoreError::NotFound(42)));
    assert_matches!(store.delete(42).await, Err(StoreError::NotFound(42)));
    assert_matches!(
        store.update(42, &new_exercise("x", &[], &[])).await,
        Err(StoreError::NotFound(42))
    );
}
