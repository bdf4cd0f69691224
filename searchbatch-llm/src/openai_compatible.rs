//! Request/response bodies of the `/v1/chat/completions` endpoint.
//!
//! Works for any provider speaking OpenAI's format (OpenAI, Azure-style proxies,
//! local servers).

use serde::{Deserialize, Serialize};
use searchbatch_core::{Message, Role, SearchbatchError, ToolCall, ToolSpec, Value};

/// Request body for chat completions endpoint
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

/// `arguments` is JSON encoded as a string, as the API sends it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ChatTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

#[derive(Serialize, Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Non-streaming response from chat completions
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// OpenAI-style error response
#[derive(Deserialize, Debug, Clone)]
pub struct OpenAiError {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ChatMessage {
    pub fn from_message(message: Message) -> Result<Self, SearchbatchError> {
        let tool_calls = if message.tool_calls.is_empty() {
            None
        } else {
            Some(
                message
                    .tool_calls
                    .into_iter()
                    .map(ChatToolCall::from_tool_call)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };
        // Assistant turns that only carry tool calls go out with a null content.
        let content = if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content)
        };
        if message.role == Role::Tool && message.tool_call_id.is_none() {
            return Err(SearchbatchError::InvalidInput(
                "tool message missing tool_call_id".to_string(),
            ));
        }
        Ok(Self {
            role: message.role,
            content,
            tool_calls,
            tool_call_id: message.tool_call_id,
        })
    }
}

impl ChatToolCall {
    pub fn from_tool_call(call: ToolCall) -> Result<Self, SearchbatchError> {
        Ok(Self {
            id: call.id,
            kind: function_kind(),
            function: FunctionCall {
                name: call.name,
                arguments: serde_json::to_string(&call.args)?,
            },
        })
    }

    pub fn into_tool_call(self) -> Result<ToolCall, SearchbatchError> {
        let args = if self.function.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&self.function.arguments)?
        };
        Ok(ToolCall {
            id: self.id,
            name: self.function.name,
            args,
        })
    }
}

impl From<ToolSpec> for ChatTool {
    fn from(spec: ToolSpec) -> Self {
        Self {
            kind: function_kind(),
            function: FunctionDefinition {
                name: spec.name,
                description: spec.description,
                parameters: spec.parameters,
            },
        }
    }
}
