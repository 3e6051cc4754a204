//! Courses (shared, with members) and folders (private) grouping decks by id

pub mod models;

pub use models::*;
