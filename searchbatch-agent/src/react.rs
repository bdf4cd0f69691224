use std::collections::HashMap;
use std::sync::Arc;

use searchbatch_core::{
    ConversationStore, InMemoryConversationStore, LlmRequest, LlmResponse, Message, Responder,
    SearchbatchError, Tool, ToolCall, ToolCallingLlm, ToolSpec, Value,
};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use tools when helpful. If a tool is used, wait for the tool result before answering.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolFailurePolicy {
    #[default]
    FailFast,
    AppendErrorAndContinue,
}

/// Tool-using agent: alternates model calls and tool calls until the model
/// answers without requesting a tool.
///
/// Histories live in the injected [`ConversationStore`] under the caller's
/// thread id. The system prompt is sent with every request but never stored.
pub struct ReActAgent {
    llm: Arc<dyn ToolCallingLlm>,
    tools: HashMap<String, Arc<dyn Tool>>,
    tool_specs: Vec<ToolSpec>,
    store: Arc<dyn ConversationStore>,
    system_prompt: String,
    max_iterations: usize,
    tool_failure_policy: ToolFailurePolicy,
}

impl std::fmt::Debug for ReActAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReActAgent")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("max_iterations", &self.max_iterations)
            .field("tool_failure_policy", &self.tool_failure_policy)
            .finish_non_exhaustive()
    }
}

pub struct ReActAgentBuilder {
    llm: Option<Arc<dyn ToolCallingLlm>>,
    tools: Vec<Arc<dyn Tool>>,
    store: Option<Arc<dyn ConversationStore>>,
    system_prompt: String,
    max_iterations: usize,
    tool_failure_policy: ToolFailurePolicy,
}

impl ReActAgent {
    pub fn builder() -> ReActAgentBuilder {
        ReActAgentBuilder {
            llm: None,
            tools: Vec::new(),
            store: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: 25,
            tool_failure_policy: ToolFailurePolicy::FailFast,
        }
    }

    pub fn tool_specs(&self) -> &[ToolSpec] {
        &self.tool_specs
    }

    fn request(&self, history: &[Message]) -> LlmRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !self.system_prompt.is_empty() {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.extend(history.iter().cloned());
        LlmRequest {
            model: String::new(),
            messages,
            tools: self.tool_specs.clone(),
        }
    }

    /// Runs one tool call and renders its output as tool-message content.
    async fn call_tool(&self, call: &ToolCall) -> Result<String, SearchbatchError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| SearchbatchError::ToolCallFailed {
                tool_name: call.name.clone(),
                reason: "unknown tool".to_string(),
            })?;
        tracing::debug!(tool = %call.name, call_id = %call.id, "invoking tool");

        match tool.invoke(call.args.clone()).await {
            Ok(Value::String(text)) => Ok(text),
            Ok(value) => Ok(value.to_string()),
            Err(err) => match self.tool_failure_policy {
                ToolFailurePolicy::FailFast => Err(SearchbatchError::ToolCallFailed {
                    tool_name: call.name.clone(),
                    reason: err.to_string(),
                }),
                ToolFailurePolicy::AppendErrorAndContinue => {
                    tracing::warn!(tool = %call.name, error = %err, "tool failed, reporting to model");
                    Ok(format!("[TOOL ERROR] {}: {}", call.name, err))
                }
            },
        }
    }
}

impl ReActAgentBuilder {
    pub fn llm(mut self, llm: Arc<dyn ToolCallingLlm>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Defaults to a fresh [`InMemoryConversationStore`].
    pub fn store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// An empty prompt sends no system message at all.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Upper bound on model calls per `respond`.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tool_failure_policy(mut self, tool_failure_policy: ToolFailurePolicy) -> Self {
        self.tool_failure_policy = tool_failure_policy;
        self
    }

    pub fn build(self) -> Result<ReActAgent, SearchbatchError> {
        let llm = self
            .llm
            .ok_or_else(|| SearchbatchError::InvalidConfig("missing llm".to_string()))?;
        if self.max_iterations == 0 {
            return Err(SearchbatchError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        let mut tools = HashMap::new();
        for tool in self.tools {
            let name = tool.name().to_string();
            if tools.contains_key(&name) {
                return Err(SearchbatchError::InvalidConfig(format!(
                    "duplicate tool name: {name}"
                )));
            }
            tools.insert(name, tool);
        }
        let mut tool_specs: Vec<ToolSpec> = tools
            .iter()
            .map(|(name, tool)| ToolSpec {
                name: name.clone(),
                description: tool.description().to_string(),
                parameters: tool.schema(),
            })
            .collect();
        tool_specs.sort_by(|a, b| a.name.cmp(&b.name));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryConversationStore::new()));
        Ok(ReActAgent {
            llm,
            tools,
            tool_specs,
            store,
            system_prompt: self.system_prompt,
            max_iterations: self.max_iterations,
            tool_failure_policy: self.tool_failure_policy,
        })
    }
}

#[async_trait::async_trait]
impl Responder for ReActAgent {
    async fn respond(&self, thread_id: &str, message: &str) -> Result<String, SearchbatchError> {
        if message.trim().is_empty() {
            return Err(SearchbatchError::InvalidInput("empty message".to_string()));
        }

        // Work on a copy; the store only sees completed turns.
        let mut history = self.store.load(thread_id).await?.unwrap_or_default();
        history.push(Message::user(message));

        for iteration in 1..=self.max_iterations {
            let LlmResponse {
                content,
                tool_calls,
            } = self.llm.invoke(self.request(&history)).await?;
            history.push(Message::assistant(content.clone(), tool_calls.clone()));

            if tool_calls.is_empty() {
                self.store.save(thread_id, &history).await?;
                tracing::debug!(thread_id, iteration, history = history.len(), "agent finished");
                return Ok(content);
            }

            for call in tool_calls {
                let output = self.call_tool(&call).await?;
                history.push(Message::tool(call.id, output));
            }
        }

        Err(SearchbatchError::MaxIterationsExceeded {
            max: self.max_iterations,
        })
    }
}
