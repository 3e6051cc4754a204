//! Entity store
//!
//! Holds the authoritative collections and applies structural edits while
//! keeping course and folder references pointing at existing decks.

pub mod collections;
mod entity_store;

pub use collections::{Collections, Identified};
pub use entity_store::EntityStore;
