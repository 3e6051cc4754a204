//! Append-only log of the swipes taken during a session
//!
//! Each entry holds the card as it was before the swipe and the position of
//! any re-inserted copy, which is exactly what undo needs to invert it.

use serde::{Deserialize, Serialize};

use crate::flashcards::Flashcard;

use super::models::{StudyCard, SwipeDirection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub card: StudyCard,
    pub action: SwipeDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<usize>,
}

/// Swipe counts per direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeTally {
    pub known: usize,
    pub unknown: usize,
    pub half_known: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionTranscript {
    entries: Vec<TranscriptEntry>,
}

impl SessionTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Take back the most recent entry
    pub fn pop(&mut self) -> Option<TranscriptEntry> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Carry an edit into every recorded copy of the card, keeping the
    /// status each entry had when it was swiped
    pub fn update_card(&mut self, edited: &Flashcard) {
        for entry in self.entries.iter_mut().filter(|e| e.card.id() == edited.id) {
            entry.card.card.term = edited.term.clone();
            entry.card.card.definition = edited.definition.clone();
            entry.card.card.example_sentence = edited.example_sentence.clone();
        }
    }

    pub fn tally(&self) -> SwipeTally {
        self.entries
            .iter()
            .fold(SwipeTally::default(), |mut tally, entry| {
                match entry.action {
                    SwipeDirection::Right => tally.known += 1,
                    SwipeDirection::Left => tally.unknown += 1,
                    SwipeDirection::Up => tally.half_known += 1,
                }
                tally
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::CardStatus;

    fn entry(action: SwipeDirection, inserted_at: Option<usize>) -> TranscriptEntry {
        let card = Flashcard::new("Haus".to_string(), "house".to_string(), String::new());
        TranscriptEntry {
            card: card.into(),
            action,
            inserted_at,
        }
    }

    #[test]
    fn test_pop_is_last_in_first_out() {
        let mut transcript = SessionTranscript::new();
        transcript.record(entry(SwipeDirection::Right, None));
        transcript.record(entry(SwipeDirection::Up, Some(20)));

        assert_eq!(transcript.pop().unwrap().action, SwipeDirection::Up);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.pop().unwrap().action, SwipeDirection::Right);
        assert!(transcript.pop().is_none());
    }

    #[test]
    fn test_tally() {
        let mut transcript = SessionTranscript::new();
        transcript.record(entry(SwipeDirection::Right, None));
        transcript.record(entry(SwipeDirection::Left, Some(5)));
        transcript.record(entry(SwipeDirection::Left, Some(7)));

        let tally = transcript.tally();
        assert_eq!(tally.known, 1);
        assert_eq!(tally.unknown, 2);
        assert_eq!(tally.half_known, 0);
    }

    #[test]
    fn test_update_card_keeps_recorded_status() {
        let mut transcript = SessionTranscript::new();
        let mut first = entry(SwipeDirection::Left, Some(5));
        first.card.card.status = CardStatus::Unknown;
        transcript.record(first);
        transcript.record(entry(SwipeDirection::Right, None));

        let mut edited = transcript.entries()[0].card.card.clone();
        edited.term = "das Haus".to_string();
        edited.status = CardStatus::Known;
        transcript.update_card(&edited);

        let entries = transcript.entries();
        assert_eq!(entries[0].card.card.term, "das Haus");
        assert_eq!(entries[0].card.card.status, CardStatus::Unknown);
        assert_eq!(entries[1].card.card.term, "Haus");
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut transcript = SessionTranscript::new();
        transcript.record(entry(SwipeDirection::Right, None));

        let value = serde_json::to_value(&transcript).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["action"], "right");
        assert!(value[0].get("insertedAt").is_none());
        assert_eq!(value[0]["card"]["isRetry"], false);
        assert_eq!(value[0]["card"]["term"], "Haus");
    }
}
