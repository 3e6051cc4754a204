//! Flashcard decks
//!
//! This module provides:
//! - Deck and flashcard models
//! - Card drafts produced by the assistant
//! - Card status as written back by study sessions

pub mod models;

pub use models::*;
