//! Field rules for exercise records.
//!
//! [`ExerciseDraft`] is the fully typed shape of an exercise before it has
//! an id. The workflow builds it from a submitted form, resolves `images`,
//! and hands it to the repository for insert or full replace.
//!
//! The free-text rules live on [`ExerciseText`] so a form can be checked
//! for them even when its enumerated fields fail to bind.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::attribute::{Category, Equipment, Force, Level, Mechanic, Muscle};
use crate::error::CoreError;

/// An exercise without identity or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDraft {
    pub name: String,
    pub force: Force,
    pub level: Level,
    pub mechanic: Mechanic,
    pub category: Category,
    pub primary_muscle: Muscle,
    pub secondary_muscles: BTreeSet<Muscle>,
    pub equipment: BTreeSet<Equipment>,
    pub instructions: String,
    /// Stored image keys, in upload order.
    #[serde(default)]
    pub images: Vec<String>,
}

/// The free-text fields of an exercise, the only ones with rules beyond
/// their type.
///
/// The name doubles as the stem of every image key, so it must also be
/// usable as a single file name.
#[derive(Debug, Validate)]
pub struct ExerciseText<'a> {
    #[validate(
        custom(function = "usable_name"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub name: &'a str,
    #[validate(custom(function = "not_blank"))]
    pub instructions: &'a str,
}

impl ExerciseText<'_> {
    /// Check the field rules, flattening every violation into one message.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|errors| CoreError::Validation(describe(&errors)))
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be empty")));
    }
    Ok(())
}

fn usable_name(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if value.starts_with('.') || value.contains(['/', '\\', '\0']) {
        return Err(ValidationError::new("file_name").with_message(Cow::Borrowed(
            "must not start with '.' or contain '/' or '\\'",
        )));
    }
    Ok(())
}

/// Render validation errors as `field: message` pairs, sorted.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            messages.push(format!("{field}: {message}"));
        }
    }
    messages.sort();
    messages.join("; ")
}
