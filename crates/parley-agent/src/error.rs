//! Errors surfaced by [`Agent::get_ai_response`](crate::Agent::get_ai_response).

use thiserror::Error;

use parley_providers::ProviderError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model kept requesting tools past the configured round limit.
    #[error("Too many tool rounds (limit {0})")]
    TooManyToolRounds(usize),
}
