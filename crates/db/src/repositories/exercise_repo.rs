//! Repository for the `exercises` table.

use liftlog_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};

use crate::filter::{build_where, BindValue, ExerciseFilter};
use crate::models::exercise::{Exercise, ExerciseDraft};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, updated_at, name, force, level, mechanic, category, \
                       primary_muscle, secondary_muscles, equipment, instructions, images";

/// Provides CRUD and filter operations for exercises.
pub struct ExerciseRepo;

impl ExerciseRepo {
    /// List every exercise ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Exercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercises ORDER BY id");
        sqlx::query_as::<_, Exercise>(&query).fetch_all(pool).await
    }

    /// Find an exercise by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercises WHERE id = $1");
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new exercise, returning the created row.
    pub async fn create(pool: &PgPool, input: &ExerciseDraft) -> Result<Exercise, sqlx::Error> {
        let query = format!(
            "INSERT INTO exercises \
                (name, force, level, mechanic, category, primary_muscle, \
                 secondary_muscles, equipment, instructions, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(&input.name)
            .bind(input.force.id())
            .bind(input.level.id())
            .bind(input.mechanic.id())
            .bind(input.category.id())
            .bind(input.primary_muscle.id())
            .bind(Json(&input.secondary_muscles))
            .bind(Json(&input.equipment))
            .bind(&input.instructions)
            .bind(Json(&input.images))
            .fetch_one(pool)
            .await
    }

    /// Replace every mutable field of an exercise and bump `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ExerciseDraft,
    ) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!(
            "UPDATE exercises SET \
                name = $2, \
                force = $3, \
                level = $4, \
                mechanic = $5, \
                category = $6, \
                primary_muscle = $7, \
                secondary_muscles = $8, \
                equipment = $9, \
                instructions = $10, \
                images = $11, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.force.id())
            .bind(input.level.id())
            .bind(input.mechanic.id())
            .bind(input.category.id())
            .bind(input.primary_muscle.id())
            .bind(Json(&input.secondary_muscles))
            .bind(Json(&input.equipment))
            .bind(&input.instructions)
            .bind(Json(&input.images))
            .fetch_optional(pool)
            .await
    }

    /// Delete an exercise by ID. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count exercises with exactly this name (case-sensitive), optionally
    /// ignoring one record so an update does not collide with itself.
    pub async fn count_by_name(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM exercises \
             WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List exercises passing every predicate of `filter`, ordered by id.
    pub async fn filter(pool: &PgPool, filter: &ExerciseFilter) -> Result<Vec<Exercise>, sqlx::Error> {
        let clause = build_where(&filter.predicates());
        let query = format!(
            "SELECT {COLUMNS} FROM exercises {where_clause} ORDER BY id",
            where_clause = clause.sql,
        );
        tracing::debug!(%query, binds = clause.binds.len(), "Filtering exercises");

        let q = sqlx::query_as::<_, Exercise>(&query);
        bind_filter_values(q, &clause.binds).fetch_all(pool).await
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_filter_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::SmallInt(v) => q = q.bind(*v),
            BindValue::SmallIntArray(v) => q = q.bind(v.as_slice()),
        }
    }
    q
}
