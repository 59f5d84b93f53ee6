//! Agent loop: one user turn against a provider, with tool rounds.
//!
//! A turn:
//! 1. append the user message to the live conversation and trim it
//! 2. snapshot the conversation and run every round against the snapshot
//! 3. on a terminal reply, replay the rounds' messages onto the live
//!    conversation, then append the reply
//!
//! The live store is only touched at the start and end, so concurrent turns
//! for other chats never observe half-finished tool rounds.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use parley_core::config::Config;
use parley_core::session::ConversationStore;
use parley_core::types::{ImageAttachment, Message, ToolInvocation, ToolResult};
use parley_providers::{create_adapter, ChatRequest, ProviderAdapter, ProviderReply};

use crate::error::AgentError;
use crate::memory::PromptComposer;
use crate::tools::host::{ToolCallStatus, ToolContext, ToolHost};

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Serves turns for any number of chats.
///
/// Cheap to share behind an `Arc`; every collaborator is itself shared.
pub struct Agent {
    store: Arc<ConversationStore>,
    tools: Arc<dyn ToolHost>,
    composer: Arc<dyn PromptComposer>,
    client: reqwest::Client,
}

impl Agent {
    pub fn new(tools: Arc<dyn ToolHost>, composer: Arc<dyn PromptComposer>) -> Self {
        Self {
            store: Arc::new(ConversationStore::new()),
            tools,
            composer,
            client: reqwest::Client::new(),
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Answer `user_message` in `chat_id`, running tools as the model requests.
    ///
    /// The provider is resolved from `config` on every call, so configuration
    /// changes take effect on the next turn.
    pub async fn get_ai_response(
        &self,
        config: &Config,
        chat_id: &str,
        user_message: &str,
        image: Option<ImageAttachment>,
    ) -> Result<String, AgentError> {
        let adapter = create_adapter(&config.ai, self.client.clone())?;
        self.run_turn(adapter.as_ref(), config, chat_id, user_message, image)
            .await
    }

    /// Run one turn against an already-built adapter.
    pub async fn run_turn(
        &self,
        adapter: &dyn ProviderAdapter,
        config: &Config,
        chat_id: &str,
        user_message: &str,
        image: Option<ImageAttachment>,
    ) -> Result<String, AgentError> {
        let message = match image {
            Some(image) => Message::user_parts(image.into_parts(user_message)),
            None => Message::user(user_message),
        };
        self.store.append(chat_id, message);
        self.store.trim(chat_id, config.ai.history_limit);

        let mut working = self.store.get_or_create(chat_id);
        let base_len = working.len();

        let system = self
            .composer
            .build_system_prompt_with_memory(&config.ai.system_prompt);
        let tools = config
            .tools_enabled()
            .then(|| self.tools.format_tools_for_ai(adapter.kind()));
        let is_known = |name: &str| self.tools.get_tool(name).is_some();
        let ctx = ToolContext::new(chat_id);
        let max_rounds = config.ai.max_tool_rounds;

        info!(
            provider = adapter.display_name(),
            chat_id,
            history = base_len,
            tools = tools.as_ref().map_or(0, Vec::len),
            "starting turn"
        );

        let mut rounds = 0;
        let reply = loop {
            let request = ChatRequest {
                system: &system,
                messages: &working,
                tools: tools.as_deref(),
            };

            match adapter.complete(&request, &is_known).await? {
                ProviderReply::Text(text) => break text,
                ProviderReply::ToolInvocations {
                    assistant,
                    invocations,
                } => {
                    if rounds == max_rounds {
                        warn!(chat_id, limit = max_rounds, "tool round limit reached");
                        return Err(AgentError::TooManyToolRounds(max_rounds));
                    }
                    rounds += 1;
                    debug!(chat_id, round = rounds, calls = invocations.len(), "tool round");

                    self.tools.set_current_chat_id(chat_id);
                    let mut results = Vec::with_capacity(invocations.len());
                    for invocation in &invocations {
                        results.push(self.execute_invocation(invocation, &ctx).await);
                    }

                    working.push(assistant);
                    working.extend(results.into_iter().map(ToolResult::into_message));
                }
            }
        };

        let delta = working.split_off(base_len);
        self.store.extend(chat_id, delta);
        self.store.append(chat_id, Message::assistant(reply.clone()));

        info!(chat_id, rounds, reply_len = reply.len(), "turn complete");
        Ok(reply)
    }

    async fn execute_invocation(&self, invocation: &ToolInvocation, ctx: &ToolContext) -> ToolResult {
        let name = invocation.name.as_str();
        let params = match invocation.params() {
            Ok(params) => params,
            Err(e) => {
                warn!(tool = name, error = %e, "malformed tool arguments");
                self.tools
                    .log_tool_call(name, ToolCallStatus::Error, &Default::default());
                return ToolResult::from_output(
                    &invocation.id,
                    &json!({ "error": format!("Invalid tool arguments: {e}") }),
                );
            }
        };

        self.tools.log_tool_call(name, ToolCallStatus::Running, &params);
        let output = self.tools.execute_tool(name, params.clone(), ctx).await;
        let result = ToolResult::from_output(&invocation.id, &output);

        let status = if result.is_error {
            ToolCallStatus::Error
        } else {
            ToolCallStatus::Success
        };
        self.tools.log_tool_call(name, status, &params);
        result
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
