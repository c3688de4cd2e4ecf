//! Message types for LLM communication.
//!
//! Defines the core types used for building conversations with LLM providers.

use serde::{Deserialize, Serialize};

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call (used to match results).
    pub id: String,
    /// Name of the tool to call.
    pub name: String,
    /// JSON arguments for the tool.
    pub arguments: String,
}

/// Result of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result is for.
    pub tool_call_id: String,
    /// The result content (JSON).
    pub content: String,
}

/// One model turn of tool calls paired with their results.
#[derive(Debug, Clone, Default)]
pub struct ToolRound {
    pub calls: Vec<ToolCall>,
    pub results: Vec<ToolResult>,
}

impl ToolRound {
    /// Finds the result for `call_id`.
    pub fn result_for(&self, call_id: &str) -> Option<&ToolResult> {
        self.results.iter().find(|r| r.tool_call_id == call_id)
    }
}

/// Response from an LLM that may include tool calls.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Text content from the LLM (may be empty if only tool calls).
    pub content: String,
    /// Tool calls requested by the LLM.
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Creates a response with only text content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a response with tool calls.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    /// Returns true if this response contains tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing context and instructions.
    System,
    /// User message (human input).
    User,
    /// Assistant message (LLM response).
    Assistant,
}

impl Role {
    /// Returns the role as a string for API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: Role,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Default number of user/assistant exchanges kept in history.
const DEFAULT_MAX_EXCHANGES: usize = 10;

/// A conversation consisting of multiple messages.
///
/// Maintains conversation history for context in LLM requests.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Maximum number of exchanges to keep (each exchange = user + assistant).
    max_exchanges: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Creates a new empty conversation.
    pub fn new() -> Self {
        Self::with_max_exchanges(DEFAULT_MAX_EXCHANGES)
    }

    /// Creates a conversation with a custom max exchanges limit.
    pub fn with_max_exchanges(max_exchanges: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_exchanges,
        }
    }

    /// Adds a message to the conversation.
    pub fn add(&mut self, message: Message) {
        self.messages.push(message);
        self.trim_to_limit();
    }

    /// Adds a user message to the conversation.
    pub fn add_user(&mut self, content: impl Into<String>) {
        self.add(Message::user(content));
    }

    /// Adds an assistant message to the conversation.
    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.add(Message::assistant(content));
    }

    /// Returns all messages in the conversation.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Clears all messages from the conversation.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the number of messages in the conversation.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the conversation has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops the oldest user/assistant pairs beyond `max_exchanges`.
    fn trim_to_limit(&mut self) {
        loop {
            let exchanges = self
                .messages
                .windows(2)
                .filter(|pair| pair[0].role == Role::User && pair[1].role == Role::Assistant)
                .count();
            if exchanges <= self.max_exchanges {
                return;
            }

            let Some(oldest) = self
                .messages
                .windows(2)
                .position(|pair| pair[0].role == Role::User && pair[1].role == Role::Assistant)
            else {
                return;
            };
            self.messages.drain(oldest..oldest + 2);
        }
    }
}
