//! Base Agent trait and supporting types.

use crate::agents::message::{Message, MessageType, Response};
use crate::cancellation::{Cancelled, CancellationToken};
use async_trait::async_trait;
use thiserror::Error;

/// Failure raised by a message handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The handler observed its cancellation token and abandoned the work.
    #[error("Handler cancelled")]
    Cancelled,
    /// The handler failed.
    #[error("Handler failed: {0}")]
    Failed(String),
}

impl AgentError {
    /// Convenience constructor for [`AgentError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

impl From<Cancelled> for AgentError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// An addressable unit of computation driven by the runtime.
///
/// The runtime reads [`name`](Agent::name) and
/// [`subscriptions`](Agent::subscriptions) once, at registration, and takes
/// ownership of the agent. From then on [`on_message`](Agent::on_message) is
/// only ever called by the agent's own worker, one invocation at a time, and
/// only with messages whose type is in the subscription set.
///
/// A handler that observes `cancellation_token.is_cancelled()` must return
/// [`AgentError::Cancelled`] instead of a response. Long-running handlers
/// should check the token at each await point; the runtime's grace period
/// relies on it.
#[async_trait]
pub trait Agent: Send + 'static {
    /// Name of the agent, unique within a runtime.
    fn name(&self) -> &str;

    /// Types of messages this agent can receive.
    fn subscriptions(&self) -> Vec<MessageType>;

    /// Handle one message.
    async fn on_message(
        &mut self,
        message: Message,
        cancellation_token: CancellationToken,
    ) -> Result<Response, AgentError>;
}
