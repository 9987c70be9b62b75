//! Scalar aliases shared by the row model and the HTTP layer.

/// Exercise ids, assigned by the `BIGSERIAL` primary key.
pub type DbId = i64;

/// Record timestamps, stored as `TIMESTAMPTZ` and handled in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
