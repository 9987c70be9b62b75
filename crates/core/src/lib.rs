//! Domain building blocks for the exercise catalog.
//!
//! Nothing in this crate touches the database; persistence lives in
//! `liftlog_db` and HTTP concerns in `liftlog_api`.

pub mod attribute;
pub mod error;
pub mod exercise;
pub mod image_store;
pub mod types;
