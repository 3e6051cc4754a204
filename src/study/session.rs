//! A study queue bound to persistent storage
//!
//! The session state is written under `study_session_<deckId>` after every
//! change so an interrupted session resumes where it stopped.

use std::sync::Arc;

use crate::flashcards::{Deck, Flashcard};
use crate::storage::{load_json, persist, KeyValueStore, StorageKey};

use super::models::{
    RetryPolicy, SessionSnapshot, StudyCard, StudyOptions, SwipeDirection, SwipeOutcome,
};
use super::queue::StudyQueue;
use super::random::RandomSource;

pub struct StudySession {
    queue: StudyQueue,
    kv: Arc<dyn KeyValueStore>,
}

impl StudySession {
    /// Start a session, resuming the saved one for this deck if there is one
    pub fn start(
        kv: Arc<dyn KeyValueStore>,
        deck: &Deck,
        card_ids: Option<&[String]>,
        options: StudyOptions,
        policy: RetryPolicy,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let key = StorageKey::StudySession(deck.id.clone());
        let saved: Option<SessionSnapshot> = load_json(kv.as_ref(), &key);
        let queue = StudyQueue::start(deck, card_ids, options, policy, saved, rng);
        let session = Self { queue, kv };
        session.save();
        log::info!(
            "Started study session on deck {} ({} cards)",
            deck.id,
            session.queue.len()
        );
        session
    }

    pub fn queue(&self) -> &StudyQueue {
        &self.queue
    }

    pub fn deck_id(&self) -> &str {
        self.queue.deck_id()
    }

    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<SwipeOutcome> {
        let outcome = self.queue.swipe(direction)?;
        self.save();
        Some(outcome)
    }

    pub fn undo(&mut self) -> Option<StudyCard> {
        let card = self.queue.undo()?;
        self.save();
        Some(card)
    }

    pub fn restart(&mut self) {
        self.queue.restart();
        self.save();
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        let shuffled = self.queue.toggle_shuffle();
        self.save();
        shuffled
    }

    pub fn toggle_swap_sides(&mut self) -> bool {
        self.queue.toggle_swap_sides()
    }

    pub fn edit_current(
        &mut self,
        term: String,
        definition: String,
        example_sentence: String,
    ) -> Option<Flashcard> {
        let edited = self.queue.edit_current(term, definition, example_sentence)?;
        self.save();
        Some(edited)
    }

    /// End the session and forget its saved state
    pub fn exit(self) {
        clear_saved(self.kv.as_ref(), self.queue.deck_id());
        log::info!("Exited study session on deck {}", self.queue.deck_id());
    }

    fn save(&self) {
        let key = StorageKey::StudySession(self.queue.deck_id().to_string());
        persist(self.kv.as_ref(), &key, &self.queue.snapshot());
    }
}

/// Drop the saved session of a deck, if any
pub fn clear_saved(kv: &dyn KeyValueStore, deck_id: &str) {
    let key = StorageKey::StudySession(deck_id.to_string());
    if let Err(e) = kv.remove(&key.as_key()) {
        log::error!("Failed to clear saved session for deck {}: {}", deck_id, e);
    }
}
