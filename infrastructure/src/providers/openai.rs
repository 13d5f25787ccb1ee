//! OpenAI-compatible chat completions gateway
//!
//! Talks to any endpoint implementing `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style proxies, Ollama, vLLM, ...). Each session keeps its
//! own turn history and resends it with every request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskweave_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use taskweave_domain::{ChatTurn, Model};
use tracing::debug;

/// Default API base
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Endpoint configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Read the API key from the environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self, GatewayError> {
        let api_key = std::env::var(var)
            .map_err(|_| GatewayError::ConnectionError(format!("{var} not set")))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Mask API key for safe display
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Keep credentials and oversized bodies out of error messages
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Check the configured API key.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "Rate limit exceeded. Please wait.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "Server error. Please try again later.".to_string();
    }

    if error.len() < 200 && !error.contains("sk-") && !lower.contains("key") {
        return error.to_string();
    }

    "An API error occurred. Please try again.".to_string()
}

fn map_reqwest_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(sanitize_api_error(&error.to_string()))
    } else {
        GatewayError::RequestFailed(sanitize_api_error(&error.to_string()))
    }
}

// OpenAI-compatible request/response types
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

fn parse_response(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("No choices in response".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}

/// Gateway for OpenAI-compatible endpoints
pub struct OpenAiGateway {
    client: Client,
    config: Arc<OpenAiConfig>,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    fn session(&self, model: &Model, history: Vec<ChatTurn>) -> OpenAiSession {
        OpenAiSession {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            model: model.clone(),
            history: Mutex::new(history),
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(self.session(model, Vec::new())))
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(
            self.session(model, vec![ChatTurn::system(system_prompt)]),
        ))
    }
}

/// One conversation with the endpoint
pub struct OpenAiSession {
    client: Client,
    config: Arc<OpenAiConfig>,
    model: Model,
    history: Mutex<Vec<ChatTurn>>,
}

impl OpenAiSession {
    fn history_with(&self, turn: ChatTurn) -> Result<Vec<ChatTurn>, GatewayError> {
        let history = self
            .history
            .lock()
            .map_err(|e| GatewayError::SessionError(e.to_string()))?;
        let mut turns = history.clone();
        turns.push(turn);
        Ok(turns)
    }
}

#[async_trait]
impl LlmSession for OpenAiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let turns = self.history_with(ChatTurn::user(content))?;
        let request = ChatRequest {
            model: self.model.as_str(),
            messages: &turns,
            temperature: self.config.temperature,
        };

        debug!(model = %self.model, turns = turns.len(), "Sending chat completion request");
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                sanitize_api_error(&body)
            )));
        }

        let text = parse_response(&body)?;

        // Commit the exchange only once it succeeded
        let mut history = self
            .history
            .lock()
            .map_err(|e| GatewayError::SessionError(e.to_string()))?;
        history.push(ChatTurn::user(content));
        history.push(ChatTurn::assistant(text.clone()));
        Ok(text)
    }
}
