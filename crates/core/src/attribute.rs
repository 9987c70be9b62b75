//! Closed enumerations used to classify an exercise.
//!
//! Every enumeration is a contiguous run of small integers starting at zero.
//! The integer is the only external representation: database columns, JSON
//! payloads and form fields all carry the id, never the display name.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Attribute ID type matching SMALLINT in the database.
pub type AttributeId = i16;

/// Errors raised when turning external input into an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("{attribute} must be a number, got '{input}'")]
    NotANumber {
        attribute: &'static str,
        input: String,
    },

    #[error("{value} is not a valid {attribute} (expected 0..{count})")]
    OutOfRange {
        attribute: &'static str,
        value: i64,
        count: usize,
    },
}

macro_rules! define_attribute_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(try_from = "i16", into = "i16")]
        pub enum $name {
            $( $variant = $val ),+
        }

        impl $name {
            /// Every value in id order.
            pub const ALL: &'static [Self] = &[$( Self::$variant ),+];

            /// Number of values; valid ids are `0..COUNT`.
            pub const COUNT: usize = Self::ALL.len();

            /// Field label used in error messages.
            pub const LABEL: &'static str = $label;

            /// Return the stored integer id.
            pub fn id(self) -> AttributeId {
                self as AttributeId
            }

            /// Canonical display name.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant) ),+
                }
            }

            /// Selection-control options for every value, in id order.
            pub fn options() -> Vec<AttributeOption> {
                Self::ALL
                    .iter()
                    .map(|v| AttributeOption {
                        value: v.id(),
                        name: v.name(),
                    })
                    .collect()
            }
        }

        impl From<$name> for AttributeId {
            fn from(value: $name) -> Self {
                value as AttributeId
            }
        }

        impl TryFrom<AttributeId> for $name {
            type Error = AttributeError;

            fn try_from(value: AttributeId) -> Result<Self, Self::Error> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.id() == value)
                    .ok_or(AttributeError::OutOfRange {
                        attribute: Self::LABEL,
                        value: value.into(),
                        count: Self::COUNT,
                    })
            }
        }

        impl FromStr for $name {
            type Err = AttributeError;

            /// Parse a form field value (the integer id).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let value: i64 = trimmed.parse().map_err(|_| AttributeError::NotANumber {
                    attribute: Self::LABEL,
                    input: trimmed.to_string(),
                })?;
                let out_of_range = AttributeError::OutOfRange {
                    attribute: Self::LABEL,
                    value,
                    count: Self::COUNT,
                };
                let id = AttributeId::try_from(value).map_err(|_| out_of_range.clone())?;
                Self::try_from(id).map_err(|_| out_of_range)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

define_attribute_enum! {
    /// Direction of the main movement.
    Force ("force") {
        Pull = 0,
        Push = 1,
        Static = 2,
    }
}

define_attribute_enum! {
    /// Difficulty level.
    Level ("level") {
        Easy = 0,
        Middle = 1,
        Hard = 2,
    }
}

define_attribute_enum! {
    /// Number of joints involved.
    Mechanic ("mechanic") {
        Compound = 0,
        Isolation = 1,
    }
}

define_attribute_enum! {
    /// Training category.
    Category ("category") {
        Endurance = 0,
        Strength = 1,
        Stretching = 2,
    }
}

define_attribute_enum! {
    /// Equipment an exercise may require.
    Equipment ("equipment") {
        Bands = 0,
        Barbell = 1,
        Bench = 2,
        Body = 3,
        Cable = 4,
        Dumbbells = 5,
        Kettlebells = 6,
        Machine = 7,
        Other = 8,
    }
}

define_attribute_enum! {
    /// Muscle groups, used for both the primary and secondary muscles.
    Muscle ("muscle") {
        Abdominals = 0,
        Abductors = 1,
        Adductors = 2,
        Biceps = 3,
        Calves = 4,
        Chest = 5,
        Forearms = 6,
        Glutes = 7,
        Hamstrings = 8,
        Lats = 9,
        LowerBack = 10,
        Neck = 11,
        Quadriceps = 12,
        Shoulders = 13,
        Traps = 14,
        Triceps = 15,
    }
}

/// A single `<option>` worth of data: the stored id and its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeOption {
    pub value: AttributeId,
    pub name: &'static str,
}

/// Every selectable value of every enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct PossibleValues {
    pub forces: Vec<AttributeOption>,
    pub levels: Vec<AttributeOption>,
    pub mechanics: Vec<AttributeOption>,
    pub categories: Vec<AttributeOption>,
    pub muscles: Vec<AttributeOption>,
    pub equipment: Vec<AttributeOption>,
}

static POSSIBLE_VALUES: LazyLock<PossibleValues> = LazyLock::new(|| PossibleValues {
    forces: Force::options(),
    levels: Level::options(),
    mechanics: Mechanic::options(),
    categories: Category::options(),
    muscles: Muscle::options(),
    equipment: Equipment::options(),
});

/// The process-wide option table. Built on first access, never mutated.
pub fn possible_values() -> &'static PossibleValues {
    &POSSIBLE_VALUES
}
