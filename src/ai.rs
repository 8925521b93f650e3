use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

use crate::ai_response::TurnResult;
use crate::error::AIError;
use crate::prompt::{GenerationRequest, RESPONSE_SCHEMA_NAME};
use crate::settings::{ApiKeyStatus, Settings};

/// Anything that can turn a generation request into an opponent reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TurnGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<TurnResult, AIError>;
}

/// Chat-completions backed generator.
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<Self, AIError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(AIError::MissingApiKey)?;
        let openai_config = OpenAIConfig::new().with_api_key(api_key);

        Ok(Self {
            client: Client::with_config(openai_config),
            model: model.into(),
            temperature,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AIError> {
        Self::new(
            settings.api_key(),
            settings.model.clone(),
            settings.temperature,
        )
    }
}

#[async_trait]
impl TurnGenerator for OpenAIGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<TurnResult, AIError> {
        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: RESPONSE_SCHEMA_NAME.into(),
                schema: Some(request.response_schema.clone()),
                strict: Some(false),
            },
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .response_format(response_format)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.prompt())
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(chat_request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AIError::EmptyResponse)?;

        log::debug!("Raw turn result: {content}");
        TurnResult::from_json(&content)
    }
}

/// The session's handle on the generation service.
///
/// Never fails: errors, timeouts and malformed replies become the neutral
/// fallback, and a missing credential turns every reply into the
/// unconfigured fallback.
#[derive(Clone)]
pub struct GameAI {
    generator: Option<Arc<dyn TurnGenerator>>,
    timeout: Duration,
}

impl GameAI {
    pub fn new(generator: Arc<dyn TurnGenerator>, timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            timeout,
        }
    }

    pub fn unconfigured(timeout: Duration) -> Self {
        Self {
            generator: None,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let request_timeout = Duration::from_secs(settings.request_timeout_secs);
        match OpenAIGenerator::from_settings(settings) {
            Ok(generator) => Self::new(Arc::new(generator), request_timeout),
            Err(e) => {
                log::warn!("AI client not configured: {e}");
                Self::unconfigured(request_timeout)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Runs a credential check under the request timeout.
    ///
    /// A rejected key drops the generator, so every reply becomes the
    /// unconfigured fallback. A check that does not answer in time counts as
    /// unreachable and keeps the generator.
    pub async fn verify_key<F>(self, check: F) -> (Self, ApiKeyStatus)
    where
        F: Future<Output = ApiKeyStatus>,
    {
        if !self.is_configured() {
            return (self, ApiKeyStatus::Rejected);
        }

        let status = timeout(self.timeout, check)
            .await
            .unwrap_or_else(|_| {
                log::warn!("API key check timed out after {:?}", self.timeout);
                ApiKeyStatus::Unreachable
            });
        match status {
            ApiKeyStatus::Rejected => {
                log::warn!("API key rejected, running without a generator");
                (Self::unconfigured(self.timeout), status)
            }
            ApiKeyStatus::Valid | ApiKeyStatus::Unreachable => (self, status),
        }
    }

    pub async fn generate_turn(&self, request: &GenerationRequest) -> TurnResult {
        let Some(generator) = &self.generator else {
            return TurnResult::unconfigured();
        };

        match timeout(self.timeout, generator.generate(request)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                log::warn!("Generation failed, using fallback: {e}");
                TurnResult::fallback()
            }
            Err(_) => {
                log::warn!(
                    "Generation failed, using fallback: {} after {:?}",
                    AIError::Timeout,
                    self.timeout
                );
                TurnResult::fallback()
            }
        }
    }
}

impl std::fmt::Debug for GameAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameAI")
            .field("configured", &self.is_configured())
            .field("timeout", &self.timeout)
            .finish()
    }
}
