//! Generative assistant used for card generation, transcription, chat and speech
//!
//! The rest of the crate only sees the [`StudyAssistant`] trait; `GeminiClient`
//! is the HTTP implementation used by the application.

mod gemini;
mod models;

use async_trait::async_trait;
use thiserror::Error;

use crate::flashcards::CardDraft;

pub use gemini::GeminiClient;
pub use models::{ChatRole, ChatTurn, SourceFile};

/// Reply shown when a chat request fails
pub const CHAT_APOLOGY: &str =
    "Sorry, I couldn't answer that right now. Please try again in a moment.";

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("No API key configured for the assistant")]
    MissingApiKey,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid audio payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, AssistantError>;

#[async_trait]
pub trait StudyAssistant: Send + Sync {
    /// Propose flashcards from free text and uploaded files
    async fn generate_cards(&self, text: &str, files: &[SourceFile]) -> Result<Vec<CardDraft>>;

    /// Turn recorded speech into text
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String>;

    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String>;

    /// Read text aloud. None when the service returned no audio.
    async fn synthesize_speech(&self, text: &str) -> Result<Option<Vec<u8>>>;
}

/// Chat that never fails: errors become a canned apology
pub async fn chat_or_apology(
    assistant: &dyn StudyAssistant,
    message: &str,
    history: &[ChatTurn],
) -> String {
    match assistant.chat(message, history).await {
        Ok(reply) => reply,
        Err(e) => {
            log::warn!("Chat request failed: {}", e);
            CHAT_APOLOGY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoAssistant {
        fail: bool,
    }

    #[async_trait]
    impl StudyAssistant for EchoAssistant {
        async fn generate_cards(&self, _: &str, _: &[SourceFile]) -> Result<Vec<CardDraft>> {
            Ok(Vec::new())
        }

        async fn transcribe(&self, _: &[u8], _: &str) -> Result<String> {
            Ok(String::new())
        }

        async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
            if self.fail {
                return Err(AssistantError::Server {
                    status: 503,
                    message: "overloaded".to_string(),
                });
            }
            Ok(format!("{} ({} earlier)", message, history.len()))
        }

        async fn synthesize_speech(&self, _: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_chat_or_apology_passes_replies_through() {
        let assistant = EchoAssistant { fail: false };
        let history = vec![ChatTurn::user("Hallo"), ChatTurn::model("Hallo!")];

        let reply = chat_or_apology(&assistant, "Wie geht's?", &history).await;
        assert_eq!(reply, "Wie geht's? (2 earlier)");
    }

    #[tokio::test]
    async fn test_chat_or_apology_degrades_on_error() {
        let assistant = EchoAssistant { fail: true };

        let reply = chat_or_apology(&assistant, "Wie geht's?", &[]).await;
        assert_eq!(reply, CHAT_APOLOGY);
    }
}
