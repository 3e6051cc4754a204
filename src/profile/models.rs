//! Data models for the signed-in user and their audit trail

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::flashcards::{new_id, Deck};

/// Derive a user id from a display name.
///
/// Surrounding whitespace is trimmed first, then "Anna Musterfrau" becomes
/// "anna_musterfrau". The same derivation is used for course member ids, so
/// a member added by name matches that user's login.
pub fn derive_user_id(display_name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(&display_name.trim().to_lowercase(), "_")
        .into_owned()
}

/// The active identity. Not verified; the id is derived from the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    /// Build a user from a display name, or None when the name is blank
    pub fn from_display_name(display_name: &str) -> Option<Self> {
        let name = display_name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id: derive_user_id(name),
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Imported,
}

/// Immutable audit record of a deck entering a user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: String,
    pub deck_id: String,
    pub deck_name: String,
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(user_id: String, deck: &Deck, action: HistoryAction) -> Self {
        Self {
            id: new_id(),
            user_id,
            deck_id: deck.id.clone(),
            deck_name: deck.name.clone(),
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_user_id() {
        assert_eq!(derive_user_id("Anna Musterfrau"), "anna_musterfrau");
        assert_eq!(derive_user_id("  Max \t von   Mustermann "), "max_von_mustermann");
        assert_eq!(derive_user_id("solo"), "solo");
        assert_eq!(derive_user_id(" Anna"), "anna");
    }

    #[test]
    fn test_user_from_blank_name() {
        assert!(User::from_display_name("   ").is_none());

        let user = User::from_display_name(" Anna Musterfrau ").unwrap();
        assert_eq!(user.id, "anna_musterfrau");
        assert_eq!(user.name, "Anna Musterfrau");
    }

    #[test]
    fn test_history_serialization() {
        let deck = Deck::new("Verbs".to_string(), "anna".to_string());
        let entry = HistoryEntry::new("anna".to_string(), &deck, HistoryAction::Imported);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "imported");
        assert_eq!(json["deckName"], "Verbs");
        assert_eq!(json["userId"], "anna");
    }
}
