//! Google Gemini LLM client implementation.
//!
//! Implements the LlmClient trait for the Gemini `generateContent` API with
//! function calling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::llm::tools::ToolDefinition;
use crate::llm::types::{LlmResponse, Message, Role, ToolCall, ToolRound};
use crate::llm::LlmClient;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini API base URL.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Maximum number of retry attempts for transient errors.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Creates a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Gemini LLM client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Creates a new Gemini client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            GEMINI_API_URL, self.config.model
        )
    }

    /// Splits messages into a system instruction and Gemini contents.
    fn convert_messages(messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let system_text = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = if system_text.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(system_text)],
            })
        };

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        Role::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart::text(m.content.clone())],
            })
            .collect();

        (system, contents)
    }

    /// Appends each tool round as a model function-call turn followed by a
    /// user function-response turn.
    fn append_tool_rounds(contents: &mut Vec<GeminiContent>, rounds: &[ToolRound]) {
        for round in rounds {
            contents.push(GeminiContent {
                role: Some("model".to_string()),
                parts: round
                    .calls
                    .iter()
                    .map(|call| GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: call.name.clone(),
                            args: serde_json::from_str(&call.arguments)
                                .unwrap_or_else(|_| serde_json::json!({})),
                        }),
                        ..GeminiPart::default()
                    })
                    .collect(),
            });

            contents.push(GeminiContent {
                role: Some("user".to_string()),
                parts: round
                    .calls
                    .iter()
                    .map(|call| {
                        let content = round
                            .result_for(&call.id)
                            .map(|r| r.content.as_str())
                            .unwrap_or("{\"error\": \"no result\"}");
                        let result = serde_json::from_str(content)
                            .unwrap_or_else(|_| serde_json::Value::String(content.to_string()));
                        GeminiPart {
                            function_response: Some(GeminiFunctionResponse {
                                name: call.name.clone(),
                                response: serde_json::json!({ "result": result }),
                            }),
                            ..GeminiPart::default()
                        }
                    })
                    .collect(),
            });
        }
    }

    fn convert_tools(tools: &[ToolDefinition]) -> Vec<GeminiTool> {
        if tools.is_empty() {
            return Vec::new();
        }
        vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }]
    }

    /// Converts the first candidate into text plus tool calls.
    fn parse_response(response: GeminiResponse) -> Result<LlmResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::llm("No response from Gemini"))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    id: format!("call_{}", tool_calls.len()),
                    name: call.name,
                    arguments: call.args.to_string(),
                });
            }
        }

        if text.is_empty() && tool_calls.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(AgentError::llm(format!(
                "Gemini returned an empty response (finish reason: {})",
                reason
            )));
        }

        Ok(LlmResponse::with_tool_calls(text, tool_calls))
    }

    /// Parses an API error response and returns (error, is_retryable).
    fn parse_error(status: reqwest::StatusCode, body: &str) -> (AgentError, bool) {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return (
                AgentError::llm("Authentication failed. Check your GEMINI_API_KEY."),
                false,
            );
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return (
                AgentError::llm("Rate limited. Please wait and try again."),
                true,
            );
        }

        let is_retryable = status.is_server_error();

        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            return (
                AgentError::llm(format!(
                    "Gemini API error: {}",
                    error_response.error.message
                )),
                is_retryable,
            );
        }

        (
            AgentError::llm(format!("Gemini API error ({}): {}", status, body)),
            is_retryable,
        )
    }

    /// Determines if a request error is retryable.
    fn is_retryable_request_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    async fn generate(&self, request: &GeminiRequest) -> Result<LlmResponse> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!(
                "Gemini API request attempt {} of {}",
                attempt, MAX_RETRY_ATTEMPTS
            );

            let result = self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.config.api_key)
                .json(request)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .map_err(|e| AgentError::llm(format!("Failed to read response: {}", e)))?;

                    if status.is_success() {
                        let response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
                            AgentError::llm(format!("Failed to parse response: {}", e))
                        })?;
                        return Self::parse_response(response);
                    }

                    let (error, is_retryable) = Self::parse_error(status, &body);
                    last_error = Some(error);

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!(
                        "Gemini API request failed (attempt {}), retrying in {:?}: {}",
                        attempt, delay, status
                    );
                }
                Err(e) => {
                    let is_retryable = Self::is_retryable_request_error(&e);
                    let error = if e.is_timeout() {
                        AgentError::llm("Request timed out. Try again.")
                    } else if e.is_connect() {
                        AgentError::llm("Failed to connect to Gemini API. Check your network.")
                    } else {
                        AgentError::llm(format!("Request failed: {}", e))
                    };
                    last_error = Some(error);

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!(
                        "Gemini API request failed (attempt {}), retrying in {:?}",
                        attempt, delay
                    );
                }
            }

            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        Err(last_error.unwrap_or_else(|| AgentError::llm("Gemini request was not attempted")))
    }

    fn build_request(
        messages: &[Message],
        rounds: &[ToolRound],
        tools: &[ToolDefinition],
    ) -> GeminiRequest {
        let (system_instruction, mut contents) = Self::convert_messages(messages);
        Self::append_tool_rounds(&mut contents, rounds);
        GeminiRequest {
            system_instruction,
            contents,
            tools: Self::convert_tools(tools),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let request = Self::build_request(messages, &[], tools);
        self.generate(&request).await
    }

    async fn continue_with_tool_results(
        &self,
        messages: &[Message],
        rounds: &[ToolRound],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let request = Self::build_request(messages, rounds, tools);
        self.generate(&request).await
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
