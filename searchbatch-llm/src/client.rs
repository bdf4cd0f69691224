use std::fmt;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use searchbatch_core::{LlmRequest, LlmResponse, SearchbatchError, ToolCallingLlm};

use crate::openai_compatible::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatTool, OpenAiError,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat-completions client for OpenAI and compatible servers.
#[derive(Clone)]
pub struct OpenAiClient {
    endpoint: Url,
    api_key: SecretString,
    model: String,
    temperature: Option<f32>,
    http: Client,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

pub struct OpenAiClientBuilder {
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn builder() -> OpenAiClientBuilder {
        OpenAiClientBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

impl OpenAiClientBuilder {
    /// Server root, without the `/v1/...` suffix.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sampling temperature in `0.0..=2.0`; 0 is (near) deterministic.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenAiClient, SearchbatchError> {
        let api_key = self
            .api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| SearchbatchError::InvalidConfig("missing api key".to_string()))?;
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(SearchbatchError::InvalidConfig(format!(
                    "temperature {temperature} outside 0.0..=2.0"
                )));
            }
        }
        if self.model.trim().is_empty() {
            return Err(SearchbatchError::InvalidConfig("empty model name".to_string()));
        }
        let base = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|err| SearchbatchError::InvalidConfig(format!("base url: {err}")))?;
        let endpoint = Url::parse(&format!(
            "{}/v1/chat/completions",
            base.as_str().trim_end_matches('/')
        ))
        .map_err(|err| SearchbatchError::InvalidConfig(format!("base url: {err}")))?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| SearchbatchError::LlmProvider(err.to_string()))?;
        Ok(OpenAiClient {
            endpoint,
            api_key,
            model: self.model,
            temperature: self.temperature,
            http,
        })
    }
}

#[async_trait::async_trait]
impl ToolCallingLlm for OpenAiClient {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, SearchbatchError> {
        let LlmRequest {
            model,
            messages,
            tools,
        } = request;
        let model = if model.is_empty() {
            self.model.clone()
        } else {
            model
        };
        let messages = messages
            .into_iter()
            .map(ChatMessage::from_message)
            .collect::<Result<Vec<_>, _>>()?;
        let tools = if tools.is_empty() {
            None
        } else {
            Some(tools.into_iter().map(ChatTool::from).collect::<Vec<_>>())
        };
        tracing::debug!(
            model = %model,
            messages = messages.len(),
            tools = tools.as_ref().map_or(0, Vec::len),
            "sending chat completion request"
        );
        let body = ChatCompletionRequest {
            model,
            messages,
            tools,
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|err| SearchbatchError::LlmProvider(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&text)
                .map(|err| err.error.message)
                .unwrap_or(text);
            return Err(SearchbatchError::LlmProvider(format!("{status}: {message}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| SearchbatchError::LlmProvider(err.to_string()))?;
        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SearchbatchError::LlmProvider("no choices returned".to_string()))?;
        let content = choice.message.content.unwrap_or_default();
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| call.into_tool_call())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}
