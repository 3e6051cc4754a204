//! Data models for decks and their cards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh record id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// How well the learner knows a card, as of the last swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CardStatus {
    /// Never studied
    #[default]
    New,
    /// Swiped right
    Known,
    /// Swiped left
    Unknown,
    /// Swiped up
    HalfKnown,
}

/// A flashcard with a term (front) and definition (back)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub example_sentence: String,
    #[serde(default)]
    pub status: CardStatus,
    /// Carried through import/export, never read by the study session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

impl Flashcard {
    pub fn new(term: String, definition: String, example_sentence: String) -> Self {
        Self {
            id: new_id(),
            term,
            definition,
            example_sentence,
            status: CardStatus::New,
            next_review: None,
        }
    }
}

impl From<CardDraft> for Flashcard {
    fn from(draft: CardDraft) -> Self {
        Self::new(draft.term, draft.definition, draft.example_sentence)
    }
}

/// A card proposed by the assistant, before it belongs to a deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub example_sentence: String,
}

/// A named, ordered collection of flashcards owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub author_id: String,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: String, author_id: String) -> Self {
        Self {
            id: new_id(),
            author_id,
            name,
            cards: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn contains_card(&self, card_id: &str) -> bool {
        self.cards.iter().any(|c| c.id == card_id)
    }

    pub fn card(&self, card_id: &str) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == card_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&CardStatus::HalfKnown).unwrap();
        assert_eq!(json, "\"half-known\"");

        let status: CardStatus = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(status, CardStatus::Unknown);
    }

    #[test]
    fn test_card_defaults_when_fields_missing() {
        let card: Flashcard =
            serde_json::from_str(r#"{"id":"c1","term":"Hund","definition":"dog"}"#).unwrap();
        assert_eq!(card.status, CardStatus::New);
        assert!(card.example_sentence.is_empty());
        assert!(card.next_review.is_none());
    }

    #[test]
    fn test_deck_card_lookup() {
        let mut deck = Deck::new("German".to_string(), "anna".to_string());
        let card = Flashcard::new("Katze".to_string(), "cat".to_string(), String::new());
        let card_id = card.id.clone();
        deck.cards.push(card);

        assert!(deck.contains_card(&card_id));
        assert_eq!(deck.card(&card_id).map(|c| c.term.as_str()), Some("Katze"));
        assert!(!deck.contains_card("missing"));
    }
}
