use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::assistant::{chat_or_apology, ChatTurn, SourceFile};
use crate::flashcards::Deck;
use crate::profile::HistoryAction;
use crate::AppState;

use super::{lock, require_text, require_user, CommandError, CommandErrorKind, CommandResult};

/// Generate a deck from text and files.
///
/// Nothing is stored unless the assistant succeeds. Only one generation may
/// run at a time.
pub async fn generate_deck(
    state: &AppState,
    name: String,
    text: String,
    files: Vec<SourceFile>,
) -> CommandResult<Deck> {
    let name = require_text(&name, "Deck name")?;
    if text.trim().is_empty() && files.is_empty() {
        return Err(CommandError::validation(
            "Add some text or a file to generate cards from",
        ));
    }
    let user = require_user(state)?;

    let _generating = state.generation.try_lock().map_err(|_| {
        CommandError::new(CommandErrorKind::Busy, "A deck is already being generated")
    })?;

    let drafts = state.assistant.generate_cards(&text, &files).await?;
    if drafts.is_empty() {
        return Err(CommandError::new(
            CommandErrorKind::ExternalService,
            "The assistant did not suggest any cards",
        ));
    }

    let mut store = lock(&state.store, "store")?;
    let deck = store.create_deck(name, user.id.clone());
    let added = store.add_cards(&deck.id, drafts);
    store.record_history(user.id, &deck, HistoryAction::Created);
    log::info!("Generated deck {} with {} cards", deck.id, added.len());

    store
        .deck(&deck.id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Deck", &deck.id))
}

pub async fn transcribe_audio(
    state: &AppState,
    audio: Vec<u8>,
    mime_type: String,
) -> CommandResult<String> {
    if audio.is_empty() {
        return Err(CommandError::validation("Recording is empty"));
    }
    Ok(state.assistant.transcribe(&audio, &mime_type).await?)
}

/// Read text aloud. Returns base64 audio, or None when no audio came back.
pub async fn speak_text(state: &AppState, text: String) -> CommandResult<Option<String>> {
    let text = require_text(&text, "Text")?;
    let audio = state.assistant.synthesize_speech(&text).await?;
    Ok(audio.map(|bytes| BASE64.encode(bytes)))
}

/// Ask the tutor. Failures come back as an apology, never as an error.
pub async fn chat_with_tutor(state: &AppState, message: String, history: Vec<ChatTurn>) -> String {
    chat_or_apology(state.assistant.as_ref(), &message, &history).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;
    use crate::assistant::CHAT_APOLOGY;
    use crate::commands::test_support::{state_with, FakeAssistant};
    use crate::commands::{list_decks, list_history, login};

    fn signed_in(assistant: FakeAssistant) -> AppState {
        let (state, _) = state_with(assistant);
        login(&state, "Anna".to_string()).unwrap();
        state
    }

    #[tokio::test]
    async fn test_generate_deck_stores_cards_and_history() {
        let state = signed_in(FakeAssistant::with_cards(&["der Hund", "die Katze"]));

        let deck = generate_deck(&state, "Tiere".to_string(), "Hund, Katze".to_string(), vec![])
            .await
            .unwrap();

        assert_eq!(deck.name, "Tiere");
        assert_eq!(deck.cards.len(), 2);
        assert_eq!(list_decks(&state).unwrap().len(), 1);
        let history = list_history(&state).unwrap();
        assert_eq!(history[0].action, HistoryAction::Created);
    }

    #[tokio::test]
    async fn test_generate_deck_validates_input() {
        let state = signed_in(FakeAssistant::with_cards(&["der Hund"]));

        let err = generate_deck(&state, " ".to_string(), "Hund".to_string(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.kind, CommandErrorKind::Validation);

        let err = generate_deck(&state, "Tiere".to_string(), "  ".to_string(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.kind, CommandErrorKind::Validation);

        // A file alone is enough
        let file = SourceFile::from_bytes("image/png", b"png");
        generate_deck(&state, "Tiere".to_string(), String::new(), vec![file])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_generation_stores_nothing() {
        let state = signed_in(FakeAssistant {
            fail: true,
            ..Default::default()
        });

        let err = generate_deck(&state, "Tiere".to_string(), "Hund".to_string(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.kind, CommandErrorKind::ExternalService);
        assert!(list_decks(&state).unwrap().is_empty());
        assert!(list_history(&state).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_generation_is_busy() {
        let gate = Arc::new(Notify::new());
        let mut assistant = FakeAssistant::with_cards(&["der Hund"]);
        assistant.gate = Some(gate.clone());
        let state = signed_in(assistant);

        let first = generate_deck(&state, "Eins".to_string(), "Hund".to_string(), vec![]);
        let second = generate_deck(&state, "Zwei".to_string(), "Hund".to_string(), vec![]);
        let (first, second, _) = tokio::join!(first, second, async { gate.notify_one() });

        assert_eq!(first.unwrap().name, "Eins");
        assert_eq!(second.unwrap_err().kind, CommandErrorKind::Busy);
        assert_eq!(list_decks(&state).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_degrades_to_apology() {
        let state = signed_in(FakeAssistant::default());
        assert_eq!(
            chat_with_tutor(&state, "Hallo".to_string(), vec![]).await,
            "Echo: Hallo"
        );

        let failing = signed_in(FakeAssistant {
            fail: true,
            ..Default::default()
        });
        assert_eq!(
            chat_with_tutor(&failing, "Hallo".to_string(), vec![]).await,
            CHAT_APOLOGY
        );
    }

    #[tokio::test]
    async fn test_transcribe_and_speak_pass_through() {
        let state = signed_in(FakeAssistant::default());

        assert_eq!(
            transcribe_audio(&state, vec![1, 2, 3], "audio/webm".to_string())
                .await
                .unwrap(),
            "3 bytes"
        );
        assert_eq!(
            transcribe_audio(&state, vec![], "audio/webm".to_string())
                .await
                .unwrap_err()
                .kind,
            CommandErrorKind::Validation
        );

        let audio = speak_text(&state, "Hallo".to_string()).await.unwrap().unwrap();
        assert_eq!(BASE64.decode(audio).unwrap(), b"Hallo");
    }
}
