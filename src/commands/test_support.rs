use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::assistant::{self, AssistantError, ChatTurn, SourceFile, StudyAssistant};
use crate::config::AppConfig;
use crate::flashcards::CardDraft;
use crate::storage::{KeyValueStore, MemoryKeyValueStore};
use crate::study::RngSource;
use crate::AppState;

/// Assistant that answers from canned data
#[derive(Default)]
pub struct FakeAssistant {
    pub cards: Vec<CardDraft>,
    pub fail: bool,
    /// When set, generation waits for a notification before answering
    pub gate: Option<Arc<Notify>>,
}

impl FakeAssistant {
    pub fn with_cards(terms: &[&str]) -> Self {
        Self {
            cards: terms
                .iter()
                .map(|t| CardDraft {
                    term: t.to_string(),
                    definition: format!("{} def", t),
                    example_sentence: String::new(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn check(&self) -> assistant::Result<()> {
        if self.fail {
            return Err(AssistantError::Server {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StudyAssistant for FakeAssistant {
    async fn generate_cards(&self, _: &str, _: &[SourceFile]) -> assistant::Result<Vec<CardDraft>> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.check()?;
        Ok(self.cards.clone())
    }

    async fn transcribe(&self, audio: &[u8], _: &str) -> assistant::Result<String> {
        self.check()?;
        Ok(format!("{} bytes", audio.len()))
    }

    async fn chat(&self, message: &str, _: &[ChatTurn]) -> assistant::Result<String> {
        self.check()?;
        Ok(format!("Echo: {}", message))
    }

    async fn synthesize_speech(&self, text: &str) -> assistant::Result<Option<Vec<u8>>> {
        self.check()?;
        Ok(Some(text.as_bytes().to_vec()))
    }
}

pub fn state_with(assistant: FakeAssistant) -> (AppState, Arc<MemoryKeyValueStore>) {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let shared: Arc<dyn KeyValueStore> = kv.clone();
    let mut state = AppState::new(AppConfig::default(), shared, Arc::new(assistant));
    state.random = Box::new(|| Box::new(RngSource::seeded(7)));
    (state, kv)
}

pub fn state() -> AppState {
    state_with(FakeAssistant::default()).0
}

/// A signed-in state with one deck of the given terms
pub fn state_with_deck(terms: &[&str]) -> (AppState, String) {
    let state = state();
    let deck_id = {
        let mut store = state.store.lock().unwrap();
        let user = store.login("Anna").unwrap();
        let deck = store.create_deck("Verbs".to_string(), user.id);
        for term in terms {
            store.add_card(&deck.id, term.to_string(), format!("{} def", term), String::new());
        }
        deck.id
    };
    (state, deck_id)
}
