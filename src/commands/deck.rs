use crate::flashcards::{Deck, Flashcard};
use crate::profile::HistoryAction;
use crate::study::clear_saved;
use crate::AppState;

use super::{lock, require_text, require_user, CommandError, CommandResult};

/// Decks authored by the signed-in user
pub fn list_decks(state: &AppState) -> CommandResult<Vec<Deck>> {
    let store = lock(&state.store, "store")?;
    Ok(store
        .current_user()
        .map(|u| store.decks_for(&u.id))
        .unwrap_or_default())
}

pub fn get_deck(state: &AppState, deck_id: String) -> CommandResult<Deck> {
    let store = lock(&state.store, "store")?;
    store
        .deck(&deck_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Deck", &deck_id))
}

/// Create an empty deck and note it in the history
pub fn create_deck(state: &AppState, name: String) -> CommandResult<Deck> {
    let name = require_text(&name, "Deck name")?;
    let user = require_user(state)?;

    let mut store = lock(&state.store, "store")?;
    let deck = store.create_deck(name, user.id.clone());
    store.record_history(user.id, &deck, HistoryAction::Created);
    Ok(deck)
}

/// Rename a deck. A blank name leaves it unchanged.
pub fn rename_deck(state: &AppState, deck_id: String, name: String) -> CommandResult<Deck> {
    let mut store = lock(&state.store, "store")?;
    store.rename_deck(&deck_id, &name);
    store
        .deck(&deck_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Deck", &deck_id))
}

/// Delete a deck, its saved study session and any running session on it
pub fn delete_deck(state: &AppState, deck_id: String) -> CommandResult<()> {
    let mut study = lock(&state.study, "study")?;
    let mut store = lock(&state.store, "store")?;

    if !store.delete_deck(&deck_id) {
        return Err(CommandError::not_found("Deck", &deck_id));
    }

    if study.as_ref().is_some_and(|s| s.deck_id() == deck_id) {
        *study = None;
    }
    clear_saved(state.kv.as_ref(), &deck_id);
    Ok(())
}

pub fn add_card(
    state: &AppState,
    deck_id: String,
    term: String,
    definition: String,
    example_sentence: Option<String>,
) -> CommandResult<Flashcard> {
    let term = require_text(&term, "Term")?;
    let definition = require_text(&definition, "Definition")?;
    let example = example_sentence.unwrap_or_default().trim().to_string();

    let mut store = lock(&state.store, "store")?;
    store
        .add_card(&deck_id, term, definition, example)
        .ok_or_else(|| CommandError::not_found("Deck", &deck_id))
}

pub fn update_card(state: &AppState, card: Flashcard) -> CommandResult<Flashcard> {
    require_text(&card.term, "Term")?;
    require_text(&card.definition, "Definition")?;

    let mut store = lock(&state.store, "store")?;
    if !store.update_card(&card) {
        return Err(CommandError::not_found("Card", &card.id));
    }
    Ok(card)
}

pub fn delete_card(state: &AppState, card_id: String) -> CommandResult<()> {
    let mut store = lock(&state.store, "store")?;
    if !store.delete_card(&card_id) {
        return Err(CommandError::not_found("Card", &card_id));
    }
    Ok(())
}
