//! Species oracle client
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. One client,
//! two call sites: structured species identification (JSON schema prompt,
//! moderate temperature) and the free-form field-guide chat (persona
//! system prompt, higher temperature, no structured-output expectation).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::OracleConfig;

const REQUEST_TIMEOUT_SECS: u64 = 60;

const IDENTIFY_MAX_TOKENS: u32 = 1500;
const IDENTIFY_TEMPERATURE: f32 = 0.7;

const CHAT_MAX_TOKENS: u32 = 800;
const CHAT_TEMPERATURE: f32 = 0.8;

const IDENTIFY_PROMPT: &str = r#"You are an expert biologist and naturalist. Analyze this image and identify the plant or animal species.
Provide a detailed response in the following JSON format:

{
  "name": "Common name of the species",
  "scientificName": "Scientific name (Genus species)",
  "type": "plant" or "animal",
  "description": "Detailed description (2-3 sentences)",
  "habitat": "Natural habitat description",
  "region": "Geographic region where commonly found",
  "stats": {
    "size": "Size range (e.g., '10-15 cm' or '2-3 meters')",
    "weight": "Weight range (if applicable)",
    "lifespan": "Typical lifespan",
    "diet": "Diet type (for animals) or growth requirements (for plants)"
  },
  "abilities": [
    {
      "name": "Special ability or characteristic",
      "description": "Description of the ability"
    }
  ],
  "funFacts": [
    "Interesting fact 1",
    "Interesting fact 2",
    "Interesting fact 3"
  ],
  "conservationStatus": "least_concern|near_threatened|vulnerable|endangered|critically_endangered",
  "commonality": "very common|common|uncommon|rare|very rare",
  "confidence": "High|Medium|Low"
}

Make the description engaging and Pokemon-style without being too childish. Focus on the species' unique characteristics, behaviors, and ecological importance. If you cannot identify the species with confidence, indicate this in the confidence field and provide your best guess with appropriate caveats."#;

const CHAT_PERSONA: &str = "You are Dr. Maya Chen, a friendly and enthusiastic field ecologist \
with over 15 years of experience studying biodiversity around the world. You are passionate \
about nature education and love helping people learn about plants, animals, and ecosystems. \
Be warm, encouraging and patient; explain complex concepts in simple, accessible terms; \
always encourage curiosity, conservation and environmental awareness. When users share an \
image, analyze it and describe what you see. Keep responses conversational but informative \
(2-4 paragraphs typically).";

/// Oracle client errors. All variants describe transport/auth/quota-class
/// failures and are retryable by the caller after backoff.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Oracle API error {0}: {1}")]
    Api(u16, String),

    #[error("Oracle returned an empty completion")]
    EmptyCompletion,
}

/// Client for the external multimodal classification service
pub struct SpeciesOracleClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl SpeciesOracleClient {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
        })
    }

    /// Ask the oracle to identify the species in a normalized image.
    /// Returns the raw reply text; parsing is the caller's concern.
    pub async fn identify_species(&self, image_base64: &str) -> Result<String, OracleError> {
        let messages = vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::text(IDENTIFY_PROMPT),
                ContentPart::inline_jpeg(image_base64),
            ]),
        }];

        self.complete(messages, IDENTIFY_MAX_TOKENS, IDENTIFY_TEMPERATURE)
            .await
    }

    /// Free-form conversational turn with the field-guide persona.
    /// Callers guarantee at least one of message/image is present.
    pub async fn chat(
        &self,
        message: Option<&str>,
        image_base64: Option<&str>,
    ) -> Result<String, OracleError> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: MessageContent::Text(CHAT_PERSONA.to_string()),
        }];

        let content = match image_base64 {
            Some(image) => MessageContent::Parts(vec![
                ContentPart::text(
                    message.unwrap_or("What can you tell me about this image?"),
                ),
                ContentPart::inline_jpeg(image),
            ]),
            None => MessageContent::Text(message.unwrap_or_default().to_string()),
        };
        messages.push(ChatMessage {
            role: "user",
            content,
        });

        self.complete(messages, CHAT_MAX_TOKENS, CHAT_TEMPERATURE).await
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Oracle request failed with {}: {}", status, body);
            return Err(OracleError::Api(status.as_u16(), truncate(&body, 500)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(OracleError::EmptyCompletion)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

// Chat-completions wire format

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

/// Plain string for text-only turns, content-part array for multimodal
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    fn text(text: &str) -> Self {
        ContentPart::Text {
            text: text.to_string(),
        }
    }

    fn inline_jpeg(base64: &str) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/jpeg;base64,{base64}"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
