use std::sync::Arc;

use searchbatch_agent::{FileConversationStore, ReActAgent};
use searchbatch_core::{ConversationStore, InMemoryConversationStore, SearchbatchError};
use searchbatch_llm::OpenAiClient;
use searchbatch_tools::DuckDuckGoSearch;

use crate::Cli;

/// Wires the model client, the search tool and the conversation store into one agent.
pub fn build_agent(cli: &Cli) -> Result<ReActAgent, SearchbatchError> {
    let llm = OpenAiClient::builder()
        .base_url(cli.base_url.clone())
        .api_key(cli.api_key.clone())
        .model(cli.model.clone())
        .temperature(cli.temperature)
        .build()?;

    let search = DuckDuckGoSearch::new(cli.search_options()).map_err(|err| {
        SearchbatchError::InvalidConfig(format!("search tool: {err}"))
    })?;

    let store: Arc<dyn ConversationStore> = match &cli.history_dir {
        Some(dir) => Arc::new(FileConversationStore::new(dir)),
        None => Arc::new(InMemoryConversationStore::new()),
    };

    tracing::debug!(
        model = %llm.model(),
        temperature = cli.temperature,
        persistent_history = cli.history_dir.is_some(),
        "building agent"
    );

    ReActAgent::builder()
        .llm(Arc::new(llm))
        .tool(Arc::new(search))
        .store(store)
        .max_iterations(cli.max_iterations)
        .build()
}
