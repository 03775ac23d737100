//! Error types for registration and delivery.

use ak_protocol::runtime_models::DeliveryStatus;
use thiserror::Error;

/// Errors surfaced by the agent runtime.
///
/// Registration and routing failures (`DuplicateAgent`,
/// `InvalidSubscription`, `UnknownAgent`, `NotSubscribed`) are reported
/// immediately and never retried. `Handler` wraps a failure raised inside
/// `on_message`. `Cancelled` is a distinct terminal outcome meaning the
/// invocation was deliberately abandoned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// An agent with this name is already registered.
    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),

    /// The agent declared no message types.
    #[error("Agent '{0}' must subscribe to at least one message type")]
    InvalidSubscription(String),

    /// No agent with this name is registered.
    #[error("Agent '{0}' not found in registry")]
    UnknownAgent(String),

    /// The target agent does not accept this message type.
    #[error("Agent '{agent}' is not subscribed to {message_type}")]
    NotSubscribed { agent: String, message_type: String },

    /// The handler failed.
    #[error("Agent '{agent}' failed: {reason}")]
    Handler { agent: String, reason: String },

    /// The invocation was cancelled before or while it ran.
    #[error("Delivery to agent '{agent}' was cancelled")]
    Cancelled { agent: String },
}

impl RuntimeError {
    /// Whether this is the `Cancelled` outcome rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Delivery status for outcomes produced by a dispatched call.
    ///
    /// Routing and registration errors never reach a handler and have no
    /// delivery status.
    pub fn delivery_status(&self) -> Option<DeliveryStatus> {
        match self {
            Self::Handler { .. } => Some(DeliveryStatus::Failed),
            Self::Cancelled { .. } => Some(DeliveryStatus::Cancelled),
            _ => None,
        }
    }
}

/// Type alias for Result with RuntimeError.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
