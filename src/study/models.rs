//! Session-scoped study models

use serde::{Deserialize, Serialize};

use crate::flashcards::{CardStatus, Flashcard};

use super::transcript::SessionTranscript;

/// A flashcard inside an active study queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyCard {
    #[serde(flatten)]
    pub card: Flashcard,
    /// Re-inserted after a left or up swipe
    #[serde(default)]
    pub is_retry: bool,
}

impl StudyCard {
    pub fn id(&self) -> &str {
        &self.card.id
    }
}

impl From<Flashcard> for StudyCard {
    fn from(card: Flashcard) -> Self {
        Self {
            card,
            is_retry: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Don't know
    Left,
    /// Known
    Right,
    /// Half known
    Up,
}

impl SwipeDirection {
    /// Status written back to the deck for this swipe
    pub fn status(self) -> CardStatus {
        match self {
            Self::Left => CardStatus::Unknown,
            Self::Right => CardStatus::Known,
            Self::Up => CardStatus::HalfKnown,
        }
    }
}

/// Where missed cards resurface, counted from the front of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Smallest offset for a left swipe
    pub near_retry_min: usize,
    /// A left swipe adds a uniform `0..near_retry_spread` on top of the minimum
    pub near_retry_spread: usize,
    /// Offset for an up swipe
    pub far_retry_offset: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            near_retry_min: 5,
            near_retry_spread: 10,
            far_retry_offset: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyOptions {
    pub shuffle: bool,
    /// Show the definition as the prompt
    pub swap_sides: bool,
}

/// Result of one swipe, for writing the status back to the deck
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeOutcome {
    pub card: Flashcard,
    pub direction: SwipeDirection,
    pub status: CardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<usize>,
}

/// The two faces of the current card, oriented by the swap-sides flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFaces {
    pub prompt: String,
    pub answer: String,
    pub example_sentence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub correct: usize,
    pub remaining: usize,
    pub answered: usize,
    pub total: usize,
}

/// Persisted state of a session, keyed by deck id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub deck_id: String,
    /// Cards the session started with. Older saves leave this empty.
    #[serde(default)]
    pub card_ids: Vec<String>,
    pub queue: Vec<StudyCard>,
    #[serde(default)]
    pub transcript: SessionTranscript,
    #[serde(default)]
    pub correct_count: usize,
    pub total_cards: usize,
}
