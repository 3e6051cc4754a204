//! Swipe study sessions
//!
//! Commands that touch both the session and the store lock the session first.

use serde::Serialize;

use crate::study::{CardFaces, Progress, StudyCard, StudySession, SwipeDirection, SwipeTally};
use crate::AppState;

use super::{lock, require_text, CommandError, CommandErrorKind, CommandResult};

/// What the study screen shows after each action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyView {
    pub deck_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<StudyCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<CardFaces>,
    pub progress: Progress,
    pub tally: SwipeTally,
    pub finished: bool,
    pub shuffled: bool,
    pub swapped: bool,
    pub can_undo: bool,
}

impl StudyView {
    fn of(session: &StudySession) -> Self {
        let queue = session.queue();
        Self {
            deck_id: queue.deck_id().to_string(),
            current: queue.current().cloned(),
            faces: queue.current_faces(),
            progress: queue.progress(),
            tally: queue.transcript().tally(),
            finished: queue.is_finished(),
            shuffled: queue.is_shuffled(),
            swapped: queue.is_swapped(),
            can_undo: !queue.transcript().is_empty(),
        }
    }
}

fn no_session() -> CommandError {
    CommandError::new(CommandErrorKind::NotFound, "No study session is active")
}

/// Start studying a deck, or a subset of its cards.
///
/// A saved session for the deck resumes where it stopped.
pub fn start_study(
    state: &AppState,
    deck_id: String,
    card_ids: Option<Vec<String>>,
) -> CommandResult<StudyView> {
    let mut study = lock(&state.study, "study")?;
    let deck = {
        let store = lock(&state.store, "store")?;
        store
            .deck(&deck_id)
            .cloned()
            .ok_or_else(|| CommandError::not_found("Deck", &deck_id))?
    };

    let session = StudySession::start(
        state.kv.clone(),
        &deck,
        card_ids.as_deref(),
        state.config.study.default_options(),
        state.config.study.retry_policy(),
        (state.random)(),
    );
    let view = StudyView::of(&session);
    *study = Some(session);
    Ok(view)
}

pub fn study_view(state: &AppState) -> CommandResult<Option<StudyView>> {
    let study = lock(&state.study, "study")?;
    Ok(study.as_ref().map(StudyView::of))
}

/// Answer the current card and record the new status in its deck
pub fn swipe_card(state: &AppState, direction: SwipeDirection) -> CommandResult<StudyView> {
    let mut study = lock(&state.study, "study")?;
    let session = study.as_mut().ok_or_else(no_session)?;

    if let Some(outcome) = session.swipe(direction) {
        let mut store = lock(&state.store, "store")?;
        store.set_card_status(&outcome.card.id, outcome.status);
    }
    Ok(StudyView::of(session))
}

/// Revert the last swipe, including the status it wrote
pub fn undo_swipe(state: &AppState) -> CommandResult<StudyView> {
    let mut study = lock(&state.study, "study")?;
    let session = study.as_mut().ok_or_else(no_session)?;

    if let Some(restored) = session.undo() {
        let mut store = lock(&state.store, "store")?;
        store.set_card_status(restored.id(), restored.card.status);
    }
    Ok(StudyView::of(session))
}

pub fn restart_study(state: &AppState) -> CommandResult<StudyView> {
    let mut study = lock(&state.study, "study")?;
    let session = study.as_mut().ok_or_else(no_session)?;
    session.restart();
    Ok(StudyView::of(session))
}

pub fn toggle_shuffle(state: &AppState) -> CommandResult<StudyView> {
    let mut study = lock(&state.study, "study")?;
    let session = study.as_mut().ok_or_else(no_session)?;
    session.toggle_shuffle();
    Ok(StudyView::of(session))
}

pub fn toggle_swap_sides(state: &AppState) -> CommandResult<StudyView> {
    let mut study = lock(&state.study, "study")?;
    let session = study.as_mut().ok_or_else(no_session)?;
    session.toggle_swap_sides();
    Ok(StudyView::of(session))
}

/// Edit the card on screen in the session and in its deck
pub fn edit_current_card(
    state: &AppState,
    term: String,
    definition: String,
    example_sentence: Option<String>,
) -> CommandResult<StudyView> {
    let term = require_text(&term, "Term")?;
    let definition = require_text(&definition, "Definition")?;
    let example = example_sentence.unwrap_or_default().trim().to_string();

    let mut study = lock(&state.study, "study")?;
    let session = study.as_mut().ok_or_else(no_session)?;
    let edited = session
        .edit_current(term, definition, example)
        .ok_or_else(|| CommandError::validation("No card to edit"))?;

    let mut store = lock(&state.store, "store")?;
    let stored = store
        .owning_deck(&edited.id)
        .and_then(|d| d.card(&edited.id))
        .cloned();
    match stored {
        Some(mut card) => {
            card.term = edited.term;
            card.definition = edited.definition;
            card.example_sentence = edited.example_sentence;
            store.update_card(&card);
        }
        None => log::warn!("Edited card {} no longer belongs to a deck", edited.id),
    }
    Ok(StudyView::of(session))
}

/// Leave the session and forget its saved progress
pub fn exit_study(state: &AppState) -> CommandResult<()> {
    let mut study = lock(&state.study, "study")?;
    if let Some(session) = study.take() {
        session.exit();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state_with_deck;
    use crate::flashcards::CardStatus;
    use crate::storage::{KeyValueStore, StorageKey};

    fn status_of(state: &AppState, term: &str) -> CardStatus {
        let store = state.store.lock().unwrap();
        let decks = store.decks();
        decks[0]
            .cards
            .iter()
            .find(|c| c.term == term)
            .map(|c| c.status)
            .unwrap()
    }

    fn current_term(view: &StudyView) -> String {
        view.current.as_ref().unwrap().card.term.clone()
    }

    #[test]
    fn test_swipes_write_status_and_undo_restores_it() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen", "sehen"]);
        let view = start_study(&state, deck_id, None).unwrap();
        assert_eq!(view.progress.total, 3);
        let first = current_term(&view);

        let view = swipe_card(&state, SwipeDirection::Left).unwrap();
        assert_eq!(status_of(&state, &first), CardStatus::Unknown);
        assert!(view.can_undo);
        assert_eq!(view.tally.unknown, 1);

        let view = undo_swipe(&state).unwrap();
        assert_eq!(current_term(&view), first);
        assert_eq!(status_of(&state, &first), CardStatus::New);
        assert!(!view.can_undo);
    }

    #[test]
    fn test_undo_restores_status_from_earlier_swipe() {
        let (state, deck_id) = state_with_deck(&["gehen"]);
        start_study(&state, deck_id, None).unwrap();

        // The only card comes straight back as a retry
        let view = swipe_card(&state, SwipeDirection::Up).unwrap();
        assert_eq!(current_term(&view), "gehen");
        swipe_card(&state, SwipeDirection::Right).unwrap();
        assert_eq!(status_of(&state, "gehen"), CardStatus::Known);

        undo_swipe(&state).unwrap();
        assert_eq!(status_of(&state, "gehen"), CardStatus::HalfKnown);
    }

    #[test]
    fn test_session_finishes_after_known_cards() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen"]);
        start_study(&state, deck_id, None).unwrap();

        swipe_card(&state, SwipeDirection::Right).unwrap();
        let view = swipe_card(&state, SwipeDirection::Right).unwrap();

        assert!(view.finished);
        assert!(view.current.is_none());
        assert_eq!(view.progress.correct, 2);

        let view = restart_study(&state).unwrap();
        assert!(!view.finished);
        assert_eq!(view.progress.remaining, 2);
        assert_eq!(view.progress.total, 2);
    }

    #[test]
    fn test_subset_study() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen", "sehen"]);
        let card_id = {
            let store = state.store.lock().unwrap();
            store.deck(&deck_id).unwrap().cards[2].id.clone()
        };

        let view = start_study(&state, deck_id, Some(vec![card_id])).unwrap();
        assert_eq!(view.progress.total, 1);
        assert_eq!(current_term(&view), "sehen");
    }

    #[test]
    fn test_resumed_subset_restarts_with_subset() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen", "sehen"]);
        let card_ids: Vec<String> = {
            let store = state.store.lock().unwrap();
            let cards = &store.deck(&deck_id).unwrap().cards;
            vec![cards[1].id.clone(), cards[2].id.clone()]
        };
        start_study(&state, deck_id.clone(), Some(card_ids)).unwrap();
        swipe_card(&state, SwipeDirection::Right).unwrap();

        let view = start_study(&state, deck_id, None).unwrap();
        assert_eq!(view.progress.remaining, 1);

        let view = restart_study(&state).unwrap();
        assert_eq!(view.progress.remaining, 2);
        assert_eq!(view.progress.total, 2);
    }

    #[test]
    fn test_undo_after_edit_shows_edited_card() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen"]);
        let view = start_study(&state, deck_id, None).unwrap();
        let first = current_term(&view);

        swipe_card(&state, SwipeDirection::Left).unwrap();
        swipe_card(&state, SwipeDirection::Right).unwrap();
        let view = study_view(&state).unwrap().unwrap();
        assert_eq!(current_term(&view), first);
        edit_current_card(&state, first.clone(), "edited".to_string(), None).unwrap();

        undo_swipe(&state).unwrap();
        let view = undo_swipe(&state).unwrap();
        assert_eq!(current_term(&view), first);
        assert_eq!(view.faces.unwrap().answer, "edited");
    }

    #[test]
    fn test_edit_current_card_updates_deck() {
        let (state, deck_id) = state_with_deck(&["gehen"]);
        start_study(&state, deck_id.clone(), None).unwrap();
        swipe_card(&state, SwipeDirection::Up).unwrap();

        let view = edit_current_card(
            &state,
            "gehen".to_string(),
            "to walk".to_string(),
            Some("Wir gehen nach Hause.".to_string()),
        )
        .unwrap();
        assert_eq!(view.faces.unwrap().answer, "to walk");

        let store = state.store.lock().unwrap();
        let card = &store.deck(&deck_id).unwrap().cards[0];
        assert_eq!(card.definition, "to walk");
        assert_eq!(card.example_sentence, "Wir gehen nach Hause.");
        assert_eq!(card.status, CardStatus::HalfKnown);
    }

    #[test]
    fn test_toggles() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen"]);
        let view = start_study(&state, deck_id, None).unwrap();
        let first = current_term(&view);
        assert!(!view.shuffled);

        let view = toggle_shuffle(&state).unwrap();
        assert!(view.shuffled);
        assert_eq!(current_term(&view), first);

        let view = toggle_swap_sides(&state).unwrap();
        assert!(view.swapped);
        assert_eq!(view.faces.unwrap().answer, first);
    }

    #[test]
    fn test_exit_clears_session() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen"]);
        start_study(&state, deck_id.clone(), None).unwrap();
        swipe_card(&state, SwipeDirection::Right).unwrap();

        exit_study(&state).unwrap();

        assert!(study_view(&state).unwrap().is_none());
        let key = StorageKey::StudySession(deck_id).as_key();
        assert!(state.kv.load(&key).unwrap().is_none());
        assert_eq!(
            swipe_card(&state, SwipeDirection::Right).unwrap_err().kind,
            CommandErrorKind::NotFound
        );
    }

    #[test]
    fn test_start_resumes_saved_session() {
        let (state, deck_id) = state_with_deck(&["gehen", "kommen", "sehen"]);
        start_study(&state, deck_id.clone(), None).unwrap();
        swipe_card(&state, SwipeDirection::Right).unwrap();

        let view = start_study(&state, deck_id, None).unwrap();
        assert_eq!(view.progress.remaining, 2);
        assert_eq!(view.progress.correct, 1);
    }
}
