//! Typed exercise filter and its SQL rendering.
//!
//! Each filter field maps to exactly one predicate kind, fixed by the type
//! of the column it constrains:
//!
//! | Field                                               | Predicate                |
//! |-----------------------------------------------------|--------------------------|
//! | `name`                                              | case-sensitive substring |
//! | `force`, `level`, `mechanic`, `category`, `primary` | equality / membership    |
//! | `secondary_muscles`, `equipment`                    | stored set ⊆ allowed set |
//!
//! An empty selection leaves its field unconstrained. The same predicate
//! list drives both the SQL `WHERE` clause and the in-process
//! [`Predicate::matches`], so the two cannot disagree.

use std::collections::BTreeSet;

use liftlog_core::attribute::{AttributeId, Category, Equipment, Force, Level, Mechanic, Muscle};

use crate::models::exercise::Exercise;

/// Query parameters for filtering the exercise list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub name: Option<String>,
    pub force: BTreeSet<Force>,
    pub level: BTreeSet<Level>,
    pub mechanic: BTreeSet<Mechanic>,
    pub category: BTreeSet<Category>,
    pub primary_muscle: BTreeSet<Muscle>,
    pub secondary_muscles: BTreeSet<Muscle>,
    pub equipment: BTreeSet<Equipment>,
}

/// Single-valued SMALLINT columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarColumn {
    Force,
    Level,
    Mechanic,
    Category,
    PrimaryMuscle,
}

impl ScalarColumn {
    pub fn name(self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Level => "level",
            Self::Mechanic => "mechanic",
            Self::Category => "category",
            Self::PrimaryMuscle => "primary_muscle",
        }
    }

    fn value(self, exercise: &Exercise) -> AttributeId {
        match self {
            Self::Force => exercise.force.id(),
            Self::Level => exercise.level.id(),
            Self::Mechanic => exercise.mechanic.id(),
            Self::Category => exercise.category.id(),
            Self::PrimaryMuscle => exercise.primary_muscle.id(),
        }
    }
}

/// Set-valued JSONB array columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetColumn {
    SecondaryMuscles,
    Equipment,
}

impl SetColumn {
    pub fn name(self) -> &'static str {
        match self {
            Self::SecondaryMuscles => "secondary_muscles",
            Self::Equipment => "equipment",
        }
    }

    fn values(self, exercise: &Exercise) -> Vec<AttributeId> {
        match self {
            Self::SecondaryMuscles => exercise.secondary_muscles.iter().map(|m| m.id()).collect(),
            Self::Equipment => exercise.equipment.iter().map(|e| e.id()).collect(),
        }
    }
}

/// One condition of the filter conjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `name` contains the given text (case-sensitive).
    NameContains(String),
    /// The column's value is one of `values`. Never empty.
    Scalar {
        column: ScalarColumn,
        values: Vec<AttributeId>,
    },
    /// Every element stored in the column is one of `values`. An empty
    /// stored set always passes.
    SubsetOf {
        column: SetColumn,
        values: Vec<AttributeId>,
    },
}

impl Predicate {
    /// Evaluate the predicate against a loaded row.
    pub fn matches(&self, exercise: &Exercise) -> bool {
        match self {
            Self::NameContains(text) => exercise.name.contains(text.as_str()),
            Self::Scalar { column, values } => values.contains(&column.value(exercise)),
            Self::SubsetOf { column, values } => column
                .values(exercise)
                .iter()
                .all(|v| values.contains(v)),
        }
    }
}

fn ids<T: Copy + Into<AttributeId>>(set: &BTreeSet<T>) -> Vec<AttributeId> {
    set.iter().map(|v| (*v).into()).collect()
}

impl ExerciseFilter {
    /// Build the predicate list, skipping unconstrained fields.
    ///
    /// Order: name, then the scalar columns, then the set columns.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            predicates.push(Predicate::NameContains(name.to_string()));
        }

        let scalars = [
            (ScalarColumn::Force, ids(&self.force)),
            (ScalarColumn::Level, ids(&self.level)),
            (ScalarColumn::Mechanic, ids(&self.mechanic)),
            (ScalarColumn::Category, ids(&self.category)),
            (ScalarColumn::PrimaryMuscle, ids(&self.primary_muscle)),
        ];
        for (column, values) in scalars {
            if !values.is_empty() {
                predicates.push(Predicate::Scalar { column, values });
            }
        }

        let sets = [
            (SetColumn::SecondaryMuscles, ids(&self.secondary_muscles)),
            (SetColumn::Equipment, ids(&self.equipment)),
        ];
        for (column, values) in sets {
            if !values.is_empty() {
                predicates.push(Predicate::SubsetOf { column, values });
            }
        }

        predicates
    }

    /// Whether `exercise` passes every predicate of this filter.
    pub fn matches(&self, exercise: &Exercise) -> bool {
        self.predicates().iter().all(|p| p.matches(exercise))
    }
}

// ---------------------------------------------------------------------------
// SQL rendering
// ---------------------------------------------------------------------------

/// Typed bind value for the dynamically-built filter query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    SmallInt(AttributeId),
    SmallIntArray(Vec<AttributeId>),
}

/// A rendered `WHERE` clause plus its bind values in `$n` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    /// Empty when there are no predicates, otherwise starts with `WHERE `.
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Render predicates as a conjunction.
///
/// All scalar predicates are grouped into one parenthesised compound
/// predicate, emitted only when at least one of them is present.
pub fn build_where(predicates: &[Predicate]) -> WhereClause {
    let mut conditions: Vec<String> = Vec::new();
    let mut scalar_conditions: Vec<String> = Vec::new();
    let mut set_conditions: Vec<String> = Vec::new();
    let mut binds: Vec<BindValue> = Vec::new();

    for predicate in predicates {
        match predicate {
            Predicate::NameContains(text) => {
                binds.push(BindValue::Text(text.clone()));
                conditions.push(format!("strpos(name, ${}) > 0", binds.len()));
            }
            Predicate::Scalar { column, values } => {
                if let [single] = values.as_slice() {
                    binds.push(BindValue::SmallInt(*single));
                    scalar_conditions.push(format!("{} = ${}", column.name(), binds.len()));
                } else {
                    binds.push(BindValue::SmallIntArray(values.clone()));
                    scalar_conditions.push(format!("{} = ANY(${})", column.name(), binds.len()));
                }
            }
            Predicate::SubsetOf { column, values } => {
                binds.push(BindValue::SmallIntArray(values.clone()));
                set_conditions.push(format!(
                    "NOT EXISTS (SELECT 1 FROM jsonb_array_elements_text({}) AS elem \
                     WHERE elem::smallint <> ALL(${}))",
                    column.name(),
                    binds.len()
                ));
            }
        }
    }

    if !scalar_conditions.is_empty() {
        conditions.push(format!("({})", scalar_conditions.join(" AND ")));
    }
    conditions.extend(set_conditions);

    let sql = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    WhereClause { sql, binds }
}
