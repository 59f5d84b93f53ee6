//! Provider adapter trait: the one seam between the agent loop and a backend.
//!
//! Both protocol families implement [`ProviderAdapter`]. The loop only ever
//! inspects the [`ProviderReply`] tag, never a provider-specific shape.

use async_trait::async_trait;
use serde_json::Value;

use parley_core::types::{Message, ToolInvocation};

use crate::error::ProviderError;
use crate::registry::ProviderKind;

/// Predicate telling an adapter which tool names are registered.
pub type IsKnownTool<'a> = &'a (dyn Fn(&str) -> bool + Sync);

/// Everything an adapter needs for one round.
#[derive(Clone, Copy, Debug)]
pub struct ChatRequest<'a> {
    /// Fully composed system prompt (memory already appended).
    pub system: &'a str,
    /// Working history in neutral form.
    pub messages: &'a [Message],
    /// Tool schemas already shaped for this provider. `None` when tools are disabled.
    pub tools: Option<&'a [Value]>,
}

/// Normalized outcome of one round.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderReply {
    /// The model is done; this is the reply for the user.
    Text(String),
    /// The model asked for tools. `assistant` is the message to append to the
    /// working history before the matching results.
    ToolInvocations {
        assistant: Message,
        invocations: Vec<ToolInvocation>,
    },
}

/// A model backend.
///
/// `send` performs exactly one HTTP POST and returns the raw 2xx body;
/// `normalize` turns that body into a [`ProviderReply`] without I/O.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Name used in logs and error messages.
    fn display_name(&self) -> &'static str {
        self.kind().display_name()
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<Value, ProviderError>;

    /// Map a response body to a reply. Calls naming unregistered tools are
    /// dropped; if none remain the reply is terminal text.
    fn normalize(&self, body: Value, is_known: IsKnownTool<'_>)
        -> Result<ProviderReply, ProviderError>;

    /// One full round: send, then normalize.
    async fn complete(
        &self,
        request: &ChatRequest<'_>,
        is_known: IsKnownTool<'_>,
    ) -> Result<ProviderReply, ProviderError> {
        let body = self.send(request).await?;
        self.normalize(body, is_known)
    }
}
