use crate::{
    error::GameError,
    game_types::Message,
    interpreter::{JsonObject, action_type, extract_json},
};
use async_openai::{Client, config::OpenAIConfig, error::OpenAIError};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl SamplingParams {
    /// Used for the game move itself.
    pub const PRIMARY: Self = Self {
        max_tokens: 300,
        temperature: 0.7,
        top_p: 0.9,
        top_k: 50,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
    };

    /// Used for the reformat-to-JSON repair call.
    pub const REPAIR: Self = Self {
        max_tokens: 300,
        temperature: 0.0,
        top_p: 1.0,
        top_k: 1,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
    };
}

/// A single chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub sampling: SamplingParams,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    /// The provider payload: `{model, max_tokens, temperature, top_p, top_k, ..., messages}`.
    pub fn to_payload(&self) -> serde_json::Value {
        json!({
            "model": self.model,
            "max_tokens": self.sampling.max_tokens,
            "temperature": self.sampling.temperature,
            "top_p": self.sampling.top_p,
            "top_k": self.sampling.top_k,
            "presence_penalty": self.sampling.presence_penalty,
            "frequency_penalty": self.sampling.frequency_penalty,
            "messages": self.messages,
        })
    }
}

/// Anything that can turn a message list into assistant text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the text content of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String, GameError>;
}

#[derive(Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// A [`CompletionBackend`] for any OpenAI-compatible chat completion API.
pub struct OpenAICompatibleBackend {
    client: Option<Client<OpenAIConfig>>,
}

impl OpenAICompatibleBackend {
    /// Creates a backend for `api_base`.
    ///
    /// Without an API key the backend still constructs, but every request fails
    /// with [`GameError::Configuration`]. Upstream failures are returned on the
    /// first attempt; async-openai's own retry on 429/5xx is disabled.
    pub fn new(api_key: Option<&str>, api_base: &str) -> Self {
        let client = api_key.map(|key| {
            Client::with_config(
                OpenAIConfig::new()
                    .with_api_key(key)
                    .with_api_base(api_base),
            )
            .with_backoff(
                ExponentialBackoffBuilder::new()
                    .with_max_elapsed_time(Some(Duration::ZERO))
                    .build(),
            )
        });
        Self { client }
    }
}

#[async_trait]
impl CompletionBackend for OpenAICompatibleBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GameError> {
        let client = self.client.as_ref().ok_or_else(|| {
            GameError::Configuration("INFERENCE_API_KEY is not configured".to_string())
        })?;

        let body: CompletionBody = client
            .chat()
            .create_byot(request.to_payload())
            .await
            .map_err(upstream_error)?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

fn upstream_error(err: OpenAIError) -> GameError {
    match err {
        OpenAIError::ApiError(api) => GameError::UpstreamTransport(api.message),
        other => GameError::UpstreamTransport(other.to_string()),
    }
}

/// Everything needed to reach the completion API, resolved once at startup.
#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub chat_model: String,
    pub repair_model: String,
}

/// Calls the primary model and, when its output is unusable, asks a smaller
/// model to reformat it once.
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn CompletionBackend>,
    chat_model: String,
    repair_model: String,
}

impl InferenceClient {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        chat_model: impl Into<String>,
        repair_model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            chat_model: chat_model.into(),
            repair_model: repair_model.into(),
        }
    }

    /// Builds a client backed by [`OpenAICompatibleBackend`].
    pub fn from_settings(settings: &InferenceSettings) -> Self {
        let backend =
            OpenAICompatibleBackend::new(settings.api_key.as_deref(), &settings.api_base);
        Self::new(
            Arc::new(backend),
            settings.chat_model.clone(),
            settings.repair_model.clone(),
        )
    }

    /// Returns the model's action object with a string `type` field.
    ///
    /// Field validation is left to the caller.
    pub async fn call_inference(&self, messages: &[Message]) -> Result<JsonObject, GameError> {
        let raw = self
            .backend
            .complete(CompletionRequest {
                model: self.chat_model.clone(),
                sampling: SamplingParams::PRIMARY,
                messages: messages.to_vec(),
            })
            .await?;

        if let Some(object) = typed_object(&raw) {
            return Ok(object);
        }

        info!(model = %self.repair_model, "Primary output was not a typed JSON object; requesting repair");
        let repaired = match self.backend.complete(self.repair_request(&raw)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, raw = %raw, "Repair call failed");
                return Err(GameError::Parse);
            }
        };

        typed_object(&repaired).ok_or_else(|| {
            warn!(raw = %raw, repaired = %repaired, "Model output unusable after repair");
            GameError::Parse
        })
    }

    fn repair_request(&self, raw: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.repair_model.clone(),
            sampling: SamplingParams::REPAIR,
            messages: vec![
                Message::system("Return only valid JSON. No prose, no markdown."),
                Message::user(format!(
                    "Reformat the following text into exactly one JSON object of the form \
                     {{\"type\":\"ask\",\"question\":\"...\"}} or \
                     {{\"type\":\"guess\"|\"final\",\"guess\":\"...\",\"confidence\":0.0}}.\n\n{}",
                    raw
                )),
            ],
        }
    }
}

fn typed_object(text: &str) -> Option<JsonObject> {
    extract_json(text).filter(|object| action_type(object).is_some())
}
