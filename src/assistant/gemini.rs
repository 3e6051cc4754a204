use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::AssistantConfig;
use crate::flashcards::CardDraft;

use super::models::{ChatRole, ChatTurn, SourceFile};
use super::{AssistantError, Result, StudyAssistant};

const CARD_PROMPT: &str = "Create vocabulary flashcards from the following material. \
For every important word or phrase return its term, a short definition and one example \
sentence that uses the term. Answer with a JSON array only.";

const TRANSCRIBE_PROMPT: &str =
    "Transcribe this recording word for word. Answer with the transcript only.";

const TUTOR_INSTRUCTION: &str = "You are a friendly language tutor. Keep answers short, \
correct mistakes gently and give one example when it helps.";

/// Client for the Gemini `generateContent` REST endpoint
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    speech_model: String,
    voice: String,
}

impl GeminiClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AssistantError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        let api_key = config.resolved_api_key();
        if api_key.is_none() {
            log::warn!("No assistant API key configured; assistant calls will fail");
        }

        Ok(Self {
            client,
            base_url,
            api_key,
            model: config.model.clone(),
            speech_model: config.speech_model.clone(),
            voice: config.voice.clone(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let api_key = self.api_key.as_deref().ok_or(AssistantError::MissingApiKey)?;

        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_api_error(&body, status.as_u16());
            log::error!("Assistant request failed: {} - {}", status.as_u16(), message);
            return Err(AssistantError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl StudyAssistant for GeminiClient {
    async fn generate_cards(&self, text: &str, files: &[SourceFile]) -> Result<Vec<CardDraft>> {
        let request = card_request(text, files);
        let response = self.generate(&self.model, &request).await?;
        let drafts = parse_card_drafts(&response.text())?;
        log::info!("Assistant proposed {} cards", drafts.len());
        Ok(drafts)
    }

    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::text(TRANSCRIBE_PROMPT),
                Part::inline(mime_type, BASE64.encode(audio)),
            ])],
            ..Default::default()
        };
        let response = self.generate(&self.model, &request).await?;
        Ok(response.text().trim().to_string())
    }

    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let request = chat_request(message, history);
        let response = self.generate(&self.model, &request).await?;
        let reply = response.text();
        if reply.trim().is_empty() {
            return Err(AssistantError::InvalidResponse("empty chat reply".to_string()));
        }
        Ok(reply)
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Option<Vec<u8>>> {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![Part::text(text)])],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(json!({
                    "voiceConfig": {"prebuiltVoiceConfig": {"voiceName": self.voice}}
                })),
                ..Default::default()
            }),
            ..Default::default()
        };
        let response = self.generate(&self.speech_model, &request).await?;
        match response.inline_data() {
            Some(data) => Ok(Some(BASE64.decode(&data.data)?)),
            None => Ok(None),
        }
    }
}

fn card_request(text: &str, files: &[SourceFile]) -> GenerateRequest {
    let mut parts = vec![Part::text(CARD_PROMPT)];
    if !text.trim().is_empty() {
        parts.push(Part::text(text));
    }
    parts.extend(
        files
            .iter()
            .map(|f| Part::inline(&f.mime_type, f.data.clone())),
    );

    GenerateRequest {
        contents: vec![Content::user(parts)],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "term": {"type": "STRING"},
                        "definition": {"type": "STRING"},
                        "exampleSentence": {"type": "STRING"}
                    },
                    "required": ["term", "definition", "exampleSentence"]
                }
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn chat_request(message: &str, history: &[ChatTurn]) -> GenerateRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content {
            role: Some(
                match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                }
                .to_string(),
            ),
            parts: vec![Part::text(&turn.text)],
        })
        .collect();
    contents.push(Content::user(vec![Part::text(message)]));

    GenerateRequest {
        contents,
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part::text(TUTOR_INSTRUCTION)],
        }),
        generation_config: None,
    }
}

/// Decode the JSON card list, dropping cards without a term or definition
fn parse_card_drafts(text: &str) -> Result<Vec<CardDraft>> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(AssistantError::InvalidResponse("no cards returned".to_string()));
    }

    let drafts: Vec<CardDraft> = serde_json::from_str(body)?;
    Ok(drafts
        .into_iter()
        .map(|d| CardDraft {
            term: d.term.trim().to_string(),
            definition: d.definition.trim().to_string(),
            example_sentence: d.example_sentence.trim().to_string(),
        })
        .filter(|d| !d.term.is_empty() && !d.definition.is_empty())
        .collect())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

fn parse_api_error(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

// ==================== Wire types ====================

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// All text parts of the first candidate, concatenated
    fn text(&self) -> String {
        self.parts().filter_map(|p| p.text.as_deref()).collect()
    }

    fn inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}
