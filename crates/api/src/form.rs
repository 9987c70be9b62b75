//! Multipart form binding for the exercise pages.
//!
//! Browsers submit the exercise and filter forms as `multipart/form-data`.
//! Multi-select controls repeat their field name once per selected option,
//! so fields are collected into an ordered multimap before binding.

use std::collections::BTreeSet;
use std::str::FromStr;

use axum::extract::Multipart;
use liftlog_core::attribute::{AttributeError, Category, Equipment, Force, Level, Mechanic, Muscle};
use liftlog_core::error::CoreError;
use liftlog_core::exercise::ExerciseText;
use liftlog_core::image_store::UploadedImage;
use liftlog_db::filter::ExerciseFilter;
use liftlog_db::models::exercise::{Exercise, ExerciseDraft};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Multipart field carrying uploaded image files.
pub const IMAGES_FIELD: &str = "images";

/// Text fields in submission order, plus any uploaded images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadedImage>,
}

impl FormData {
    /// First value of `name`, if present.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `name`, in submission order.
    pub fn all(&self, name: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// Drain a multipart body into [`FormData`].
///
/// Parts named [`IMAGES_FIELD`] become files; an empty file part (what a
/// browser sends when no file was chosen) is skipped.
pub async fn read_multipart(mut multipart: Multipart) -> AppResult<FormData> {
    let mut data = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == IMAGES_FIELD {
            let file_name = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            data.files.push(UploadedImage {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            data.fields.push((name, text));
        }
    }

    Ok(data)
}

// ---------------------------------------------------------------------------
// Exercise form
// ---------------------------------------------------------------------------

/// The exercise form exactly as the user filled it in.
///
/// Kept as raw strings so a rejected submission can be redisplayed without
/// losing what was typed, valid or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExerciseForm {
    pub name: String,
    pub force: Option<String>,
    pub level: Option<String>,
    pub mechanic: Option<String>,
    pub category: Option<String>,
    pub primary: Option<String>,
    pub secondary: Vec<String>,
    pub equipment: Vec<String>,
    pub instructions: String,
    /// Image keys associated with the form (existing or just saved).
    pub images: Vec<String>,
}

impl ExerciseForm {
    pub fn from_form_data(data: &FormData) -> Self {
        let text = |name: &str| data.first(name).map(str::to_string);
        Self {
            name: text("name").unwrap_or_default(),
            force: text("force"),
            level: text("level"),
            mechanic: text("mechanic"),
            category: text("category"),
            primary: text("primary"),
            secondary: data.all("secondary"),
            equipment: data.all("equipment"),
            instructions: text("instructions").unwrap_or_default(),
            images: Vec::new(),
        }
    }

    /// Prefill the form from a stored record.
    pub fn from_exercise(exercise: &Exercise) -> Self {
        let id = |v: i16| Some(v.to_string());
        Self {
            name: exercise.name.clone(),
            force: id(exercise.force.id()),
            level: id(exercise.level.id()),
            mechanic: id(exercise.mechanic.id()),
            category: id(exercise.category.id()),
            primary: id(exercise.primary_muscle.id()),
            secondary: exercise.secondary_muscles.iter().map(|m| m.id().to_string()).collect(),
            equipment: exercise.equipment.iter().map(|e| e.id().to_string()).collect(),
            instructions: exercise.instructions.clone(),
            images: exercise.images.clone(),
        }
    }

    /// Bind to a typed draft, reporting every field problem at once.
    ///
    /// `images` on the returned draft is empty; the workflow resolves it.
    pub fn bind(&self) -> Result<ExerciseDraft, String> {
        let mut errors: Vec<String> = Vec::new();

        let force = required::<Force>("force", self.force.as_deref(), &mut errors);
        let level = required::<Level>("level", self.level.as_deref(), &mut errors);
        let mechanic = required::<Mechanic>("mechanic", self.mechanic.as_deref(), &mut errors);
        let category = required::<Category>("category", self.category.as_deref(), &mut errors);
        let primary = required::<Muscle>("primary", self.primary.as_deref(), &mut errors);
        let secondary = collect_set::<Muscle>("secondary", &self.secondary, &mut errors);
        let equipment = collect_set::<Equipment>("equipment", &self.equipment, &mut errors);

        let name = self.name.trim();
        let text = ExerciseText {
            name,
            instructions: &self.instructions,
        };
        if let Err(CoreError::Validation(msg)) = text.check() {
            errors.push(msg);
        }

        let (Some(force), Some(level), Some(mechanic), Some(category), Some(primary_muscle)) =
            (force, level, mechanic, category, primary)
        else {
            return Err(errors.join("; "));
        };
        if !errors.is_empty() {
            return Err(errors.join("; "));
        }

        Ok(ExerciseDraft {
            name: name.to_string(),
            force,
            level,
            mechanic,
            category,
            primary_muscle,
            secondary_muscles: secondary,
            equipment,
            instructions: self.instructions.clone(),
            images: Vec::new(),
        })
    }
}

fn required<T>(field: &str, value: Option<&str>, errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr<Err = AttributeError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => {
            errors.push(format!("{field}: is required"));
            None
        }
        Some(raw) => match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                errors.push(format!("{field}: {e}"));
                None
            }
        },
    }
}

fn collect_set<T>(field: &str, values: &[String], errors: &mut Vec<String>) -> BTreeSet<T>
where
    T: FromStr<Err = AttributeError> + Ord,
{
    let mut set = BTreeSet::new();
    for raw in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match raw.parse::<T>() {
            Ok(v) => {
                set.insert(v);
            }
            Err(e) => errors.push(format!("{field}: {e}")),
        }
    }
    set
}

// ---------------------------------------------------------------------------
// Filter form
// ---------------------------------------------------------------------------

/// Bind the filter form. Unselected fields stay unconstrained.
pub fn bind_filter(data: &FormData) -> Result<ExerciseFilter, CoreError> {
    let mut errors = Vec::new();
    let filter = ExerciseFilter {
        name: data.first("name").map(str::to_string),
        force: collect_set("force", &data.all("force"), &mut errors),
        level: collect_set("level", &data.all("level"), &mut errors),
        mechanic: collect_set("mechanic", &data.all("mechanic"), &mut errors),
        category: collect_set("category", &data.all("category"), &mut errors),
        primary_muscle: collect_set("primary", &data.all("primary"), &mut errors),
        secondary_muscles: collect_set("secondary", &data.all("secondary"), &mut errors),
        equipment: collect_set("equipment", &data.all("equipment"), &mut errors),
    };
    if errors.is_empty() {
        Ok(filter)
    } else {
        Err(CoreError::Validation(errors.join("; ")))
    }
}
