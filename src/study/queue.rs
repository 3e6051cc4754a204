//! Card sequencing for a single study pass
//!
//! Position 0 of the queue is the card on screen. A right swipe drops the
//! card; a left swipe re-inserts a retry copy a few cards later, an up swipe
//! further back. Every swipe is recorded in the transcript so it can be
//! undone exactly.

use crate::flashcards::{Deck, Flashcard};

use super::models::{
    CardFaces, Progress, RetryPolicy, SessionSnapshot, StudyCard, StudyOptions, SwipeDirection,
    SwipeOutcome,
};
use super::random::RandomSource;
use super::transcript::{SessionTranscript, TranscriptEntry};

pub struct StudyQueue {
    deck_id: String,
    /// Cards the session was started with, in deck order
    source_cards: Vec<Flashcard>,
    queue: Vec<StudyCard>,
    transcript: SessionTranscript,
    correct_count: usize,
    /// Fixed when the session is first built
    total_cards: usize,
    shuffle: bool,
    swap_sides: bool,
    policy: RetryPolicy,
    rng: Box<dyn RandomSource>,
}

impl StudyQueue {
    /// Start a session on a deck, optionally limited to some card ids.
    ///
    /// A saved session for the same deck with cards left is resumed as is.
    /// An empty `card_ids` list studies the whole deck.
    pub fn start(
        deck: &Deck,
        card_ids: Option<&[String]>,
        options: StudyOptions,
        policy: RetryPolicy,
        saved: Option<SessionSnapshot>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let source_cards = select_cards(deck, card_ids);

        let mut study = Self {
            deck_id: deck.id.clone(),
            total_cards: source_cards.len(),
            source_cards,
            queue: Vec::new(),
            transcript: SessionTranscript::new(),
            correct_count: 0,
            shuffle: options.shuffle,
            swap_sides: options.swap_sides,
            policy,
            rng,
        };

        match saved {
            Some(saved) if saved.deck_id == deck.id && !saved.queue.is_empty() => {
                log::debug!(
                    "Resuming session on deck {} with {} cards left",
                    deck.id,
                    saved.queue.len()
                );
                // Restart rebuilds from the cards the session began with
                if !saved.card_ids.is_empty() {
                    study.source_cards = select_cards(deck, Some(saved.card_ids.as_slice()));
                }
                study.queue = saved.queue;
                study.transcript = saved.transcript;
                study.correct_count = saved.correct_count;
                study.total_cards = saved.total_cards;
            }
            _ => study.queue = study.build_queue(),
        }

        study
    }

    fn build_queue(&mut self) -> Vec<StudyCard> {
        let mut queue: Vec<StudyCard> = self
            .source_cards
            .iter()
            .cloned()
            .map(StudyCard::from)
            .collect();
        if self.shuffle {
            self.rng.shuffle(&mut queue);
        }
        queue
    }

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    /// Ids of the cards the session was started with
    pub fn card_ids(&self) -> Vec<String> {
        self.source_cards.iter().map(|c| c.id.clone()).collect()
    }

    pub fn current(&self) -> Option<&StudyCard> {
        self.queue.first()
    }

    pub fn cards(&self) -> &[StudyCard] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total_cards(&self) -> usize {
        self.total_cards
    }

    pub fn transcript(&self) -> &SessionTranscript {
        &self.transcript
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    pub fn is_swapped(&self) -> bool {
        self.swap_sides
    }

    /// The queue ran out after at least one card was known.
    ///
    /// An empty queue with nothing known is not reported as finished.
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty() && self.correct_count > 0
    }

    pub fn progress(&self) -> Progress {
        Progress {
            correct: self.correct_count,
            remaining: self.queue.len(),
            answered: self.transcript.len(),
            total: self.total_cards,
        }
    }

    pub fn current_faces(&self) -> Option<CardFaces> {
        let card = &self.current()?.card;
        let (prompt, answer) = if self.swap_sides {
            (&card.definition, &card.term)
        } else {
            (&card.term, &card.definition)
        };
        Some(CardFaces {
            prompt: prompt.clone(),
            answer: answer.clone(),
            example_sentence: card.example_sentence.clone(),
        })
    }

    /// Answer the current card. Returns None when the queue is empty.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<SwipeOutcome> {
        if self.queue.is_empty() {
            return None;
        }
        let card = self.queue.remove(0);

        let inserted_at = match direction {
            SwipeDirection::Right => {
                self.correct_count += 1;
                None
            }
            SwipeDirection::Left => {
                let offset =
                    self.policy.near_retry_min + self.rng.below(self.policy.near_retry_spread);
                Some(self.reinsert(&card, offset, direction))
            }
            SwipeDirection::Up => {
                Some(self.reinsert(&card, self.policy.far_retry_offset, direction))
            }
        };

        log::debug!(
            "Swiped {:?} on card {}, {} left",
            direction,
            card.id(),
            self.queue.len()
        );

        let outcome = SwipeOutcome {
            card: card.card.clone(),
            direction,
            status: direction.status(),
            inserted_at,
        };
        self.transcript.record(TranscriptEntry {
            card,
            action: direction,
            inserted_at,
        });
        Some(outcome)
    }

    /// Insert a retry copy carrying the new status, clamped to the end of the queue
    fn reinsert(&mut self, card: &StudyCard, offset: usize, direction: SwipeDirection) -> usize {
        let position = offset.min(self.queue.len());
        let mut retry = card.clone();
        retry.is_retry = true;
        retry.card.status = direction.status();
        self.queue.insert(position, retry);
        position
    }

    /// Revert the last swipe. Returns the card as it was before that swipe.
    pub fn undo(&mut self) -> Option<StudyCard> {
        let entry = self.transcript.pop()?;

        if entry.action == SwipeDirection::Right {
            self.correct_count = self.correct_count.saturating_sub(1);
        }

        if let Some(position) = entry.inserted_at {
            let card_id = entry.card.id();
            // Shuffle toggles may have moved the copy since it was inserted
            let index = match self.queue.get(position) {
                Some(c) if c.id() == card_id => Some(position),
                _ => self.queue.iter().position(|c| c.id() == card_id),
            };
            if let Some(index) = index {
                self.queue.remove(index);
            }
        }

        self.queue.insert(0, entry.card.clone());
        Some(entry.card)
    }

    /// Start over with the original cards. The total stays as first built.
    pub fn restart(&mut self) {
        self.queue = self.build_queue();
        self.transcript.clear();
        self.correct_count = 0;
    }

    /// Flip shuffling and reorder every card after the current one
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        if self.queue.len() > 1 {
            let upcoming = &mut self.queue[1..];
            if self.shuffle {
                self.rng.shuffle(upcoming);
            } else {
                upcoming.sort_by(|a, b| a.card.term.cmp(&b.card.term));
            }
        }
        self.shuffle
    }

    pub fn toggle_swap_sides(&mut self) -> bool {
        self.swap_sides = !self.swap_sides;
        self.swap_sides
    }

    /// Edit the current card in place. Returns the edited flashcard so the
    /// caller can write it to the owning deck as well.
    pub fn edit_current(
        &mut self,
        term: String,
        definition: String,
        example_sentence: String,
    ) -> Option<Flashcard> {
        let current = self.queue.first_mut()?;
        current.card.term = term;
        current.card.definition = definition;
        current.card.example_sentence = example_sentence;
        let edited = current.card.clone();

        // Other copies of the card, including those undo can bring back
        for card in self.queue.iter_mut().skip(1).map(|c| &mut c.card) {
            if card.id == edited.id {
                copy_text(&edited, card);
            }
        }
        self.transcript.update_card(&edited);
        if let Some(source) = self.source_cards.iter_mut().find(|c| c.id == edited.id) {
            copy_text(&edited, source);
        }
        Some(edited)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            deck_id: self.deck_id.clone(),
            card_ids: self.card_ids(),
            queue: self.queue.clone(),
            transcript: self.transcript.clone(),
            correct_count: self.correct_count,
            total_cards: self.total_cards,
        }
    }
}

/// The deck's cards limited to `card_ids`, in deck order. No ids, or an
/// empty list, means the whole deck.
fn select_cards(deck: &Deck, card_ids: Option<&[String]>) -> Vec<Flashcard> {
    match card_ids {
        Some(ids) if !ids.is_empty() => deck
            .cards
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect(),
        _ => deck.cards.clone(),
    }
}

fn copy_text(from: &Flashcard, to: &mut Flashcard) {
    to.term = from.term.clone();
    to.definition = from.definition.clone();
    to.example_sentence = from.example_sentence.clone();
}
