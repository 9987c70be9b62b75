//! Exercise entity model.
//!
//! Inserts and full replaces take a [`ExerciseDraft`] from `liftlog_core`;
//! this module only owns the row shape.

use std::collections::BTreeSet;

use liftlog_core::attribute::{Category, Equipment, Force, Level, Mechanic, Muscle};
use liftlog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub use liftlog_core::exercise::ExerciseDraft;

/// A row from the `exercises` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Exercise {
    pub id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub name: String,
    #[sqlx(try_from = "i16")]
    pub force: Force,
    #[sqlx(try_from = "i16")]
    pub level: Level,
    #[sqlx(try_from = "i16")]
    pub mechanic: Mechanic,
    #[sqlx(try_from = "i16")]
    pub category: Category,
    #[sqlx(try_from = "i16")]
    pub primary_muscle: Muscle,
    #[sqlx(json)]
    pub secondary_muscles: BTreeSet<Muscle>,
    #[sqlx(json)]
    pub equipment: BTreeSet<Equipment>,
    pub instructions: String,
    #[sqlx(json)]
    pub images: Vec<String>,
}

impl Exercise {
    /// The mutable fields of this record, e.g. to prefill an edit form.
    pub fn to_draft(&self) -> ExerciseDraft {
        ExerciseDraft {
            name: self.name.clone(),
            force: self.force,
            level: self.level,
            mechanic: self.mechanic,
            category: self.category,
            primary_muscle: self.primary_muscle,
            secondary_muscles: self.secondary_muscles.clone(),
            equipment: self.equipment.clone(),
            instructions: self.instructions.clone(),
            images: self.images.clone(),
        }
    }
}
